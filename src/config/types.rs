use std::time::Duration;

use serde::Deserialize;

use crate::capture::CaptureConfig;
use crate::error::ConfigError;

/// On-disk configuration; every field is optional and overlays the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// `false` keeps the capture hook from persisting anything.
    pub request_save_enabled: Option<bool>,
    /// SQLite database path; without one records live in memory.
    #[serde(alias = "db_path")]
    pub db: Option<String>,
    pub pipeline: Option<PipelineSection>,
    pub capture: Option<CaptureConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PipelineSection {
    pub buffer_size: Option<usize>,
    pub batch_size: Option<usize>,
    pub flush_interval: Option<DurationValue>,
    pub workers: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_duration(&self) -> Result<Duration, ConfigError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ConfigError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
