use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::ValidationError;

pub(crate) fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(s.trim())
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| ValidationError::InvalidTimestamp {
            value: s.to_owned(),
        })
}

pub(crate) fn parse_record_id(s: &str) -> Result<Uuid, ValidationError> {
    Uuid::parse_str(s.trim()).map_err(|_| ValidationError::InvalidRecordId {
        value: s.to_owned(),
    })
}
