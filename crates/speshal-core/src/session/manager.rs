//! Single owner of the session.

use super::model::Session;
use super::observer::SessionObserver;
use super::store::TokenStore;
use crate::error::Result;
use std::sync::Arc;

/// Reads and mutates the session held in a [`TokenStore`] and keeps the
/// [`SessionObserver`] in step.
///
/// All token writes go through here; nothing else touches the store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn TokenStore>,
    observer: Arc<SessionObserver>,
}

impl SessionManager {
    /// Creates a manager and seeds the observer from the stored session.
    pub async fn load(store: Arc<dyn TokenStore>) -> Result<Self> {
        let session = store.load().await?;
        let observer = Arc::new(SessionObserver::new(session.is_authenticated()));
        Ok(Self { store, observer })
    }

    /// Creates a manager sharing an existing observer. The observer is not
    /// re-evaluated until the next call.
    pub fn with_observer(store: Arc<dyn TokenStore>, observer: Arc<SessionObserver>) -> Self {
        Self { store, observer }
    }

    pub fn observer(&self) -> &Arc<SessionObserver> {
        &self.observer
    }

    pub async fn current(&self) -> Result<Session> {
        self.store.load().await
    }

    /// Stores a fresh token pair, e.g. after login.
    pub async fn set_tokens(&self, access: &str, refresh: &str) -> Result<()> {
        let session = Session::new(access, refresh);
        self.store.save(&session).await?;
        tracing::info!("Session tokens stored");
        self.observer.evaluate(&session);
        Ok(())
    }

    /// Replaces the access token after a refresh, keeping the refresh token
    /// unless the server rotated it.
    pub async fn rotate_access_token(&self, access: &str, refresh: Option<&str>) -> Result<Session> {
        let mut session = self.store.load().await?;
        session.access_token = Some(access.to_string());
        if let Some(refresh) = refresh {
            session.refresh_token = Some(refresh.to_string());
        }
        self.store.save(&session).await?;
        self.observer.evaluate(&session);
        Ok(session)
    }

    /// Logout: removes both tokens.
    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("Session cleared");
        self.observer.evaluate(&Session::default());
        Ok(())
    }

    /// Re-reads the store and re-evaluates the observer.
    pub async fn check_logged_in(&self) -> Result<bool> {
        let session = self.store.load().await?;
        self.observer.evaluate(&session);
        Ok(session.is_authenticated())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}
