//! Configuration service.
//!
//! Loads `ClientConfig` from `config.toml` and layers environment
//! overrides on top.

use crate::paths::SpeshalPaths;
use speshal_core::config::ClientConfig;
use speshal_core::{Result, SpeshalError};
use std::path::{Path, PathBuf};

pub const ENV_API_HOST: &str = "SPESHAL_API_HOST";
pub const ENV_TIMEOUT_SECS: &str = "SPESHAL_TIMEOUT_SECS";
pub const ENV_LOG_LEVEL: &str = "SPESHAL_LOG_LEVEL";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        Ok(Self {
            path: SpeshalPaths::new(base_path).config_file()?,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File contents only. A missing or empty file yields defaults.
    pub fn load_file(&self) -> Result<ClientConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "No config file, using defaults");
            return Ok(ClientConfig::default());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientConfig::default());
        }
        Ok(toml::from_str(&content)?)
    }

    /// File contents with process environment overrides applied.
    pub fn load(&self) -> Result<ClientConfig> {
        let mut config = self.load_file()?;
        apply_overrides(&mut config, |key| std::env::var(key).ok())?;
        Ok(config)
    }
}

/// Applies `SPESHAL_*` overrides read through `lookup`.
pub fn apply_overrides<F>(config: &mut ClientConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_API_HOST).filter(|v| !v.trim().is_empty()) {
        config.api_host = host;
    }
    if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
        config.timeout_secs = timeout.trim().parse().map_err(|_| {
            SpeshalError::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, timeout))
        })?;
    }
    if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
        config.log_level = level;
    }
    Ok(())
}
