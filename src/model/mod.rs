//! Persisted record shapes and their JSON payload types.
mod envelope;
mod job;
mod json;
mod request;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use envelope::{RequestEnvelope, ResponseEnvelope, body_value};
pub use job::JobRecord;
pub use json::JsonBlob;
pub use request::{DEFAULT_ROUTING_KEY, RequestRecord};

/// The two entity kinds kept by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Request,
    Job,
}

impl RecordKind {
    #[must_use]
    pub const fn table(self) -> &'static str {
        match self {
            Self::Request => "monitoring_request_logs",
            Self::Job => "monitoring_job_logs",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Job => f.write_str("job"),
        }
    }
}
