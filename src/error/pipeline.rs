use thiserror::Error;

use super::StoreError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Ingest queue is full; record dropped.")]
    QueueFull,
    #[error("Ingest pipeline is closed; record dropped.")]
    Closed,
    #[error("Failed to flush batch of {records} record(s): {source}")]
    FlushFailed {
        records: usize,
        #[source]
        source: StoreError,
    },
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
