//! Screen models.
//!
//! Each view owns its collections and a [`ViewScope`](crate::scope::ViewScope).
//! Cross-view consistency only happens through the reconciler.

mod feed;
mod incoming;
mod post;
mod profile;
mod profile_list;

pub use feed::FeedView;
pub use incoming::IncomingRequestsView;
pub use post::{CommentOutcome, PostView};
pub use profile::ProfileView;
pub use profile_list::{ProfileListKind, ProfileListView};

use speshal_core::SpeshalError;
use std::sync::{Mutex, PoisonError};

/// Why a screen could not show its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    NotLoggedIn,
    Forbidden,
    NotFound,
    Failed(String),
}

impl From<&SpeshalError> for LoadError {
    fn from(err: &SpeshalError) -> Self {
        match err {
            SpeshalError::AuthInvalid => LoadError::NotLoggedIn,
            SpeshalError::Forbidden { .. } => LoadError::Forbidden,
            SpeshalError::NotFound { .. } => LoadError::NotFound,
            other => LoadError::Failed(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewStatus {
    Loading,
    Loaded,
    Failed(LoadError),
}

/// Small shared slot for view state that is never held across an await.
#[derive(Debug, Default)]
pub(crate) struct Slot<T>(Mutex<T>);

impl<T: Clone> Slot<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(Mutex::new(value))
    }

    pub(crate) fn get(&self) -> T {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub(crate) fn set(&self, value: T) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = value;
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_mapping() {
        assert_eq!(LoadError::from(&SpeshalError::AuthInvalid), LoadError::NotLoggedIn);
        assert_eq!(LoadError::from(&SpeshalError::forbidden("post 1")), LoadError::Forbidden);
        assert_eq!(LoadError::from(&SpeshalError::not_found("post 1")), LoadError::NotFound);
        assert!(matches!(
            LoadError::from(&SpeshalError::transport("reset", false)),
            LoadError::Failed(_)
        ));
    }
}
