//! Path management for speshal configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/speshal/
//! ├── config.toml     # Client configuration
//! └── tokens.json     # Access and refresh token (mode 600)
//! ```

use std::path::{Path, PathBuf};

const APP_DIR: &str = "speshal";
const CONFIG_FILE: &str = "config.toml";
const TOKENS_FILE: &str = "tokens.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// The platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for speshal_core::SpeshalError {
    fn from(err: PathError) -> Self {
        speshal_core::SpeshalError::config(err.to_string())
    }
}

/// Resolves where speshal keeps its files.
///
/// With a base directory every path is placed directly under it, which is
/// what tests use.
#[derive(Debug, Clone, Default)]
pub struct SpeshalPaths {
    base: Option<PathBuf>,
}

impl SpeshalPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    pub fn config_dir(&self) -> Result<PathBuf, PathError> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(PathError::ConfigDirNotFound),
        }
    }

    pub fn config_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }

    /// # Security Note
    ///
    /// The file holds live credentials and is written with mode 600.
    pub fn tokens_file(&self) -> Result<PathBuf, PathError> {
        Ok(self.config_dir()?.join(TOKENS_FILE))
    }
}
