//! Client configuration model.

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_HOST: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Settings read from `config.toml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Prefix for relative API paths, without a trailing slash.
    pub api_host: String,
    /// Per-request timeout applied by the transport.
    pub timeout_secs: u64,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_host: DEFAULT_API_HOST.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn with_api_host(mut self, api_host: impl Into<String>) -> Self {
        self.api_host = api_host.into();
        self
    }

    /// `api_host` with any trailing slashes removed.
    pub fn normalized_api_host(&self) -> &str {
        self.api_host.trim_end_matches('/')
    }
}
