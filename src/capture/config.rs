use serde::Deserialize;
use serde_json::Value;

use crate::model::{DEFAULT_ROUTING_KEY, body_value};

pub const DEFAULT_MAX_BODY_SIZE: usize = 64 * 1024;

#[must_use]
pub fn default_skip_paths() -> Vec<String> {
    vec![
        "/api/monitoring".to_owned(),
        "/monitoring".to_owned(),
        "/.well-known".to_owned(),
    ]
}

/// Knobs a framework adapter consults before and while capturing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub enabled: bool,
    pub skip_paths: Vec<String>,
    /// `None` captures bodies without a size limit.
    pub max_body_size: Option<usize>,
    pub capture_request_body: bool,
    pub capture_response_body: bool,
    pub routing_key: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_paths: default_skip_paths(),
            max_body_size: Some(DEFAULT_MAX_BODY_SIZE),
            capture_request_body: true,
            capture_response_body: true,
            routing_key: DEFAULT_ROUTING_KEY.to_owned(),
        }
    }
}

impl CaptureConfig {
    /// True when capturing is disabled or the path starts with a skipped prefix.
    #[must_use]
    pub fn should_skip(&self, path: &str) -> bool {
        !self.enabled
            || self
                .skip_paths
                .iter()
                .any(|prefix| path.starts_with(prefix.as_str()))
    }

    /// Prefix of `body` no longer than `max_body_size`.
    #[must_use]
    pub fn clip_body<'body>(&self, body: &'body [u8]) -> &'body [u8] {
        match self.max_body_size {
            Some(limit) => body.get(..limit).unwrap_or(body),
            None => body,
        }
    }

    /// Request body as stored in the request envelope, or `None` when
    /// request bodies are not captured.
    #[must_use]
    pub fn request_body(&self, body: &[u8]) -> Option<Value> {
        self.body(self.capture_request_body, body)
    }

    /// Response body as stored in the response envelope, or `None` when
    /// response bodies are not captured.
    #[must_use]
    pub fn response_body(&self, body: &[u8]) -> Option<Value> {
        self.body(self.capture_response_body, body)
    }

    fn body(&self, enabled: bool, body: &[u8]) -> Option<Value> {
        if enabled {
            body_value(self.clip_body(body))
        } else {
            None
        }
    }
}
