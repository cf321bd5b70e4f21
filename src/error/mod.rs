mod app;
mod config;
mod pipeline;
mod store;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use pipeline::PipelineError;
pub use store::{StoreError, StoreResult};
pub use validation::ValidationError;
