//! Lifetime of a screen.
//!
//! Requests are never aborted. A result that arrives after its view was torn
//! down is dropped instead of being applied.

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Result of work run inside a [`ViewScope`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery<T> {
    Delivered(T),
    /// The view was torn down while the work was in flight.
    Discarded,
}

impl<T> Delivery<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            Delivery::Delivered(value) => Some(value),
            Delivery::Discarded => None,
        }
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Delivery::Discarded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    token: CancellationToken,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope torn down together with `self`, or on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn teardown(&self) {
        self.token.cancel();
    }

    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Runs `work` to completion and delivers its output only if the scope
    /// is still active afterwards.
    pub async fn run<F: Future>(&self, work: F) -> Delivery<F::Output> {
        let output = work.await;
        if self.is_active() {
            Delivery::Delivered(output)
        } else {
            tracing::warn!("View torn down, discarding late result");
            Delivery::Discarded
        }
    }
}
