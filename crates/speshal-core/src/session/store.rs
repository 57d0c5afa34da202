//! Token persistence seam.

use super::model::Session;
use crate::error::Result;

/// Durable holder of the access and refresh tokens.
///
/// Implementations must survive process restarts (except in-memory test
/// doubles) and must not store anything besides the two tokens.
#[async_trait::async_trait]
pub trait TokenStore: Send + Sync {
    /// Loads the stored session. A missing store is an empty session, not an error.
    async fn load(&self) -> Result<Session>;

    /// Replaces the stored session.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Removes both tokens.
    async fn clear(&self) -> Result<()> {
        self.save(&Session::default()).await
    }
}
