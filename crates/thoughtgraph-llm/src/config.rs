//! Completion endpoint configuration, loaded from the environment or built
//! explicitly. Secrets are passed into the client, never held globally.

use std::fmt;
use std::time::Duration;

pub const THOUGHTGRAPH_API_KEY_ENV: &str = "THOUGHTGRAPH_API_KEY";
pub const THOUGHTGRAPH_ENDPOINT_ENV: &str = "THOUGHTGRAPH_ENDPOINT";
pub const THOUGHTGRAPH_MODEL_ENV: &str = "THOUGHTGRAPH_MODEL";
pub const THOUGHTGRAPH_TIMEOUT_SECS_ENV: &str = "THOUGHTGRAPH_TIMEOUT_SECS";

pub const DEFAULT_ENDPOINT: &str = "https://api.siliconflow.cn/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "Qwen/QwQ-32B";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    /// Full URL of the chat-completions endpoint.
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("THOUGHTGRAPH_API_KEY is not set (export it in your environment; do not hardcode secrets)")]
    MissingApiKey,
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from `THOUGHTGRAPH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary key lookup (the environment, a map in tests).
    ///
    /// Precedence per field: lookup value (trimmed, non-empty), then default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(THOUGHTGRAPH_API_KEY_ENV).ok_or(ConfigError::MissingApiKey)?;
        let mut config = Self::new(api_key);

        if let Some(endpoint) = get(THOUGHTGRAPH_ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        if let Some(model) = get(THOUGHTGRAPH_MODEL_ENV) {
            config.model = model;
        }
        if let Some(raw) = get(THOUGHTGRAPH_TIMEOUT_SECS_ENV) {
            config.timeout_secs = parse_timeout_secs(&raw)?;
        }

        Ok(config)
    }
}

pub fn parse_timeout_secs(raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigError::Invalid(format!(
            "{THOUGHTGRAPH_TIMEOUT_SECS_ENV} must be a positive integer (got {raw:?})"
        ))),
        Ok(secs) => Ok(secs),
    }
}
