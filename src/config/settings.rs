use std::path::PathBuf;

use crate::capture::CaptureConfig;
use crate::error::{AppError, AppResult, ConfigError};
use crate::pipeline::PipelineOptions;

use super::env::apply_process_env;
use super::loader::load_config;
use super::types::ConfigFile;

/// Fully resolved settings for a [`crate::monitor::Monitor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub request_save_enabled: bool,
    pub db_path: Option<PathBuf>,
    pub pipeline: PipelineOptions,
    pub capture: CaptureConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            request_save_enabled: true,
            db_path: None,
            pipeline: PipelineOptions::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl MonitorConfig {
    /// Overlay a parsed config file on the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when `flush_interval` is not a valid duration.
    pub fn from_file(file: ConfigFile) -> AppResult<Self> {
        let mut config = Self::default();
        if let Some(enabled) = file.request_save_enabled {
            config.request_save_enabled = enabled;
        }
        if let Some(db) = file.db {
            config.db_path = Some(PathBuf::from(db));
        }
        if let Some(capture) = file.capture {
            config.capture = capture;
        }
        if let Some(section) = file.pipeline {
            let pipeline = &mut config.pipeline;
            if let Some(size) = section.buffer_size {
                pipeline.buffer_size = size;
            }
            if let Some(size) = section.batch_size {
                pipeline.batch_size = size;
            }
            if let Some(workers) = section.workers {
                pipeline.workers = workers;
            }
            if let Some(interval) = section.flush_interval {
                pipeline.flush_interval = interval.to_duration().map_err(|err| {
                    AppError::config(ConfigError::InvalidField {
                        field: "pipeline.flush_interval",
                        reason: err.to_string(),
                    })
                })?;
            }
        }
        Ok(config)
    }

    /// Defaults, then the config file (explicit or discovered), then the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error when a config file exists but cannot be used.
    pub fn resolve(path: Option<&str>) -> AppResult<Self> {
        let mut config = match load_config(path)? {
            Some(file) => Self::from_file(file)?,
            None => Self::default(),
        };
        apply_process_env(&mut config);
        Ok(config)
    }
}
