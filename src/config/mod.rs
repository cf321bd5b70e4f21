//! Configuration loading: defaults, then a TOML/JSON file, then the
//! `APIWATCH_*` environment.
mod env;
mod loader;
mod parse;
mod settings;
pub mod types;


pub use env::{
    ENV_BATCH_SIZE, ENV_BUFFER_SIZE, ENV_DB, ENV_FLUSH_INTERVAL_MS, ENV_REQUEST_SAVE_ENABLED,
    ENV_WORKERS, apply_env, apply_process_env,
};
pub use loader::{DEFAULT_CONFIG_FILES, load_config, load_config_file};
pub use settings::MonitorConfig;
pub use types::{ConfigFile, DurationValue, PipelineSection};

pub(crate) use parse::parse_duration_value;
