//! `TokenStore` implementations.

use crate::paths::SpeshalPaths;
use crate::storage::AtomicJsonFile;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use speshal_core::session::{Session, TokenStore};
use speshal_core::{Result, SpeshalError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task;

/// On-disk shape of `tokens.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(rename = "__access_token__", default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(rename = "__refresh_token__", default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

impl From<StoredTokens> for Session {
    fn from(dto: StoredTokens) -> Self {
        Session {
            access_token: dto.access_token,
            refresh_token: dto.refresh_token,
        }
    }
}

impl From<&Session> for StoredTokens {
    fn from(session: &Session) -> Self {
        StoredTokens {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
        }
    }
}

/// Token store backed by `tokens.json`.
///
/// File I/O runs on the blocking pool. Clearing deletes the file.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Uses the default location, or `base_path` when given.
    pub fn new(base_path: Option<&Path>) -> Result<Self> {
        let path = SpeshalPaths::new(base_path).tokens_file()?;
        Ok(Self { path })
    }

    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file(path: PathBuf) -> AtomicJsonFile<StoredTokens> {
        AtomicJsonFile::new(path).private()
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Session> {
        let path = self.path.clone();
        let stored = task::spawn_blocking(move || Self::file(path).load())
            .await
            .map_err(|e| SpeshalError::io(format!("Failed to spawn blocking task: {}", e)))??;
        Ok(stored.map(Session::from).unwrap_or_default())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let path = self.path.clone();
        let stored = StoredTokens::from(session);
        task::spawn_blocking(move || Self::file(path).save(&stored))
            .await
            .map_err(|e| SpeshalError::io(format!("Failed to spawn blocking task: {}", e)))?
    }

    async fn clear(&self) -> Result<()> {
        let path = self.path.clone();
        task::spawn_blocking(move || Self::file(path).remove())
            .await
            .map_err(|e| SpeshalError::io(format!("Failed to spawn blocking task: {}", e)))?
    }
}

/// Process-local token store. Nothing survives a restart.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTokenStore {
    session: Arc<RwLock<Session>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: Session) -> Self {
        Self {
            session: Arc::new(RwLock::new(session)),
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn load(&self) -> Result<Session> {
        Ok(self.session.read().await.clone())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        *self.session.write().await = session.clone();
        Ok(())
    }
}
