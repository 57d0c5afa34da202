pub mod browse;
pub mod output;
pub mod publish;
pub mod session;
pub mod social;

use anyhow::{Context, Result};
use speshal_core::config::ClientConfig;
use speshal_core::session::SessionManager;
use speshal_infrastructure::FileTokenStore;
use speshal_interaction::{AuthenticatedClient, ReqwestTransport, SpeshalApi};
use std::sync::Arc;

/// Wiring shared by every subcommand.
pub struct App {
    pub api: SpeshalApi,
}

impl App {
    pub async fn connect(config: &ClientConfig) -> Result<Self> {
        let store = Arc::new(FileTokenStore::new(None).context("Failed to locate token file")?);
        let session = SessionManager::load(store)
            .await
            .context("Failed to read stored session")?;
        let transport = Arc::new(ReqwestTransport::from_config(config)?);
        let client = AuthenticatedClient::new(transport, session, config.normalized_api_host());
        Ok(Self {
            api: SpeshalApi::new(Arc::new(client)),
        })
    }

    /// Fails early for commands that make no sense anonymously.
    pub async fn require_login(&self) -> Result<()> {
        if !self.api.is_logged_in().await? {
            anyhow::bail!("Not logged in. Run `speshal login <username>` first.");
        }
        Ok(())
    }
}
