//! Process-wide authentication flag.

use super::model::Session;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

type Listener = Arc<dyn Fn(bool) + Send + Sync>;

/// Handle returned by [`SessionObserver::on_session_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Holds "is a session currently authenticated" and notifies listeners
/// when that value flips.
///
/// Re-evaluating with an unchanged result is silent.
#[derive(Default)]
pub struct SessionObserver {
    authenticated: AtomicBool,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
}

impl SessionObserver {
    pub fn new(initial: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(initial),
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Registers a callback invoked with the new value on every transition.
    pub fn on_session_change<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(bool) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Recomputes the flag from `session`. Returns `true` if it changed.
    pub fn evaluate(&self, session: &Session) -> bool {
        let now = session.is_authenticated();
        let before = self.authenticated.swap(now, Ordering::SeqCst);
        if before == now {
            return false;
        }

        tracing::debug!(authenticated = now, "Session state changed");
        // Snapshot so listeners may subscribe or unsubscribe from inside the callback.
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(now);
        }
        true
    }
}

impl std::fmt::Debug for SessionObserver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionObserver")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}
