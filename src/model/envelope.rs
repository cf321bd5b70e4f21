use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::error::ValidationError;

use super::JsonBlob;

/// Inbound half of a captured exchange, serialized into `request`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RequestEnvelope {
    pub ip: String,
    pub headers: BTreeMap<String, String>,
    pub params: BTreeMap<String, String>,
    pub queries: BTreeMap<String, String>,
    pub body: Option<Value>,
    pub datetime: DateTime<Utc>,
}

/// Outbound half of a captured exchange, serialized into `response`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exception: Option<String>,
    pub datetime: DateTime<Utc>,
}

impl RequestEnvelope {
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be serialized.
    pub fn to_blob(&self) -> Result<JsonBlob, ValidationError> {
        JsonBlob::from_serialize(self)
    }
}

impl ResponseEnvelope {
    /// # Errors
    ///
    /// Returns an error if the envelope cannot be serialized.
    pub fn to_blob(&self) -> Result<JsonBlob, ValidationError> {
        JsonBlob::from_serialize(self)
    }
}

/// Turn a captured body into a JSON value.
///
/// JSON bodies are kept structured; anything else is stored as a (lossy
/// UTF-8) string. Empty bodies become `None`.
#[must_use]
pub fn body_value(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(value) => Some(value),
        Err(_) => Some(Value::String(String::from_utf8_lossy(bytes).into_owned())),
    }
}
