use thiserror::Error;

use crate::model::RecordKind;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} record '{id}' not found.")]
    NotFound { kind: RecordKind, id: String },
    #[error("{context}: {source}")]
    Sqlite {
        context: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Corrupt row during {context}: {detail}")]
    Corrupt {
        context: &'static str,
        detail: String,
    },
    #[error("Store state lock poisoned: {detail}")]
    Poisoned { detail: String },
    #[error("Sink rejected the write: {reason}")]
    Rejected { reason: String },
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

pub type StoreResult<T> = Result<T, StoreError>;
