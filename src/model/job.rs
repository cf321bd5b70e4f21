use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::JsonBlob;

/// Execution record of a background or scheduled job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub id: Uuid,
    pub name: String,
    pub success: bool,
    pub metadata: JsonBlob,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobRecord {
    #[must_use]
    pub fn new(name: String, success: bool, metadata: JsonBlob, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            success,
            metadata,
            created_at: now,
            updated_at: now,
        }
    }
}
