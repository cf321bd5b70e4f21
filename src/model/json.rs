use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ValidationError;

/// A JSON payload that is known to be well formed.
///
/// Blobs are only built through [`JsonBlob::parse`] or
/// [`JsonBlob::from_serialize`], so anything holding one can hand it to a
/// store without re-validating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonBlob(Value);

impl JsonBlob {
    /// Validate already-serialized JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidJson`] naming `field` when `raw` is
    /// not syntactically valid JSON.
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(raw)
            .map(Self)
            .map_err(|source| ValidationError::InvalidJson { field, source })
    }

    /// Serialize an arbitrary value into a blob.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMetadata`] when the value cannot be
    /// represented as JSON (for example a map with non-string keys).
    pub fn from_serialize<T>(value: &T) -> Result<Self, ValidationError>
    where
        T: Serialize + ?Sized,
    {
        serde_json::to_value(value)
            .map(Self)
            .map_err(|source| ValidationError::InvalidMetadata { source })
    }

    #[must_use]
    pub const fn null() -> Self {
        Self(Value::Null)
    }

    #[must_use]
    pub const fn from_value(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.0.to_string()
    }

    /// `statusCode` of a response envelope, accepting numbers and numeric
    /// strings.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self.0.get("statusCode")? {
            Value::Number(number) => number.as_u64().and_then(|code| u16::try_from(code).ok()),
            Value::String(text) => text.trim().parse().ok(),
            Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl Default for JsonBlob {
    fn default() -> Self {
        Self::null()
    }
}
