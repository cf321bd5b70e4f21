//! Boundary between a host framework's request probe and the pipeline.
//!
//! A framework adapter measures the handler, serializes the envelopes and
//! hands a [`CapturedExchange`] to a [`RecordHook`]. Nothing in here knows
//! about a concrete request or response type.
mod config;
mod path;


use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use uuid::Uuid;

use crate::error::ValidationError;
use crate::model::{DEFAULT_ROUTING_KEY, JsonBlob, RequestRecord};

pub use config::{CaptureConfig, DEFAULT_MAX_BODY_SIZE, default_skip_paths};
pub use path::{full_url, normalize_path, path_of_url, strip_query};

/// Pipeline stage invoked once per captured exchange.
pub trait RecordHook: Send + Sync {
    fn on_record(&self, captured: CapturedExchange);
}

/// Fields extracted by the probe for one request/response cycle.
///
/// The JSON fields hold already-serialized text; they are validated when
/// the exchange is turned into a [`RequestRecord`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CapturedExchange {
    #[serde(alias = "key")]
    pub routing_key: String,
    pub path: String,
    pub url: String,
    pub method: String,
    #[serde(deserialize_with = "json_text")]
    pub user: String,
    #[serde(deserialize_with = "json_text")]
    pub request: String,
    #[serde(deserialize_with = "json_text")]
    pub response: String,
    #[serde(deserialize_with = "json_text")]
    pub response_headers: String,
    pub success: bool,
    #[serde(alias = "duration")]
    pub duration_ms: u64,
}

impl CapturedExchange {
    /// Build the persisted record, stamping it with `now`.
    ///
    /// An empty routing key becomes [`DEFAULT_ROUTING_KEY`]; an empty path
    /// is derived from the URL via [`normalize_path`]; an empty user
    /// snapshot is stored as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJson`] when any JSON field is not
    /// well formed.
    pub fn into_record(self, now: DateTime<Utc>) -> Result<RequestRecord, ValidationError> {
        let user = if self.user.trim().is_empty() {
            JsonBlob::null()
        } else {
            JsonBlob::parse("user", &self.user)?
        };
        let request = JsonBlob::parse("request", &self.request)?;
        let response = JsonBlob::parse("response", &self.response)?;
        let response_headers = JsonBlob::parse("responseHeaders", &self.response_headers)?;

        let key = if self.routing_key.is_empty() {
            DEFAULT_ROUTING_KEY.to_owned()
        } else {
            self.routing_key
        };
        let path = if self.path.is_empty() {
            normalize_path(path_of_url(&self.url))
        } else {
            self.path
        };

        Ok(RequestRecord {
            id: Uuid::new_v4(),
            key,
            path,
            url: self.url,
            method: self.method.to_ascii_uppercase(),
            user,
            request,
            response,
            response_headers,
            success: self.success,
            duration_ms: self.duration_ms,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Accept either pre-serialized JSON text or an inline JSON value.
fn json_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .map_or_else(|| value.to_string(), str::to_owned))
}
