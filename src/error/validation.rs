use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Field '{field}' is not valid JSON: {source}")]
    InvalidJson {
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Job metadata is not JSON-serializable: {source}")]
    InvalidMetadata {
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid record id '{value}'.")]
    InvalidRecordId { value: String },
    #[error("Invalid timestamp '{value}'. Expected RFC3339.")]
    InvalidTimestamp { value: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
