use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use super::settings::MonitorConfig;

pub const ENV_REQUEST_SAVE_ENABLED: &str = "APIWATCH_REQUEST_SAVE_ENABLED";
pub const ENV_BUFFER_SIZE: &str = "APIWATCH_BUFFER_SIZE";
pub const ENV_BATCH_SIZE: &str = "APIWATCH_BATCH_SIZE";
pub const ENV_FLUSH_INTERVAL_MS: &str = "APIWATCH_FLUSH_INTERVAL_MS";
pub const ENV_WORKERS: &str = "APIWATCH_WORKERS";
pub const ENV_DB: &str = "APIWATCH_DB";

/// Overlay environment variables read through `lookup`.
///
/// Empty values are ignored; unparsable ones keep the current value and
/// log a warning.
pub fn apply_env<F>(config: &mut MonitorConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(enabled) = read(ENV_REQUEST_SAVE_ENABLED)
        .and_then(|raw| parse_bool(ENV_REQUEST_SAVE_ENABLED, &raw))
    {
        config.request_save_enabled = enabled;
    }
    if let Some(size) = read(ENV_BUFFER_SIZE)
        .and_then(|raw| parse_number(ENV_BUFFER_SIZE, &raw))
    {
        config.pipeline.buffer_size = size;
    }
    if let Some(size) = read(ENV_BATCH_SIZE)
        .and_then(|raw| parse_number(ENV_BATCH_SIZE, &raw))
    {
        config.pipeline.batch_size = size;
    }
    if let Some(millis) = read(ENV_FLUSH_INTERVAL_MS)
        .and_then(|raw| parse_number::<u64>(ENV_FLUSH_INTERVAL_MS, &raw))
    {
        config.pipeline.flush_interval = Duration::from_millis(millis);
    }
    if let Some(workers) = read(ENV_WORKERS)
        .and_then(|raw| parse_number(ENV_WORKERS, &raw))
    {
        config.pipeline.workers = workers;
    }
    if let Some(path) = read(ENV_DB) {
        config.db_path = Some(PathBuf::from(path.trim()));
    }
}

/// [`apply_env`] against the process environment.
pub fn apply_process_env(config: &mut MonitorConfig) {
    apply_env(config, |key| std::env::var(key).ok());
}

fn parse_number<T>(key: &str, raw: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Ignoring {}='{}': {}", key, raw, err);
            None
        }
    }
}

fn parse_bool(key: &str, raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "t" | "true" | "yes" | "on" => Some(true),
        "0" | "f" | "false" | "no" | "off" => Some(false),
        _ => {
            warn!("Ignoring {}='{}': expected a boolean", key, raw);
            None
        }
    }
}
