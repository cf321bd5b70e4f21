use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonBlob;

pub const DEFAULT_ROUTING_KEY: &str = "apis-traffic";

/// One captured request/response cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: Uuid,
    pub key: String,
    pub path: String,
    pub url: String,
    pub method: String,
    pub user: JsonBlob,
    pub request: JsonBlob,
    pub response: JsonBlob,
    pub response_headers: JsonBlob,
    pub success: bool,
    #[serde(rename = "duration")]
    pub duration_ms: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestRecord {
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        self.response.status_code()
    }

    /// Route path, falling back to the full URL when the probe had no route.
    #[must_use]
    pub fn display_path(&self) -> &str {
        if self.path.is_empty() {
            &self.url
        } else {
            &self.path
        }
    }
}
