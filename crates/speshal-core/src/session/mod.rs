//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the two-token `Session` value
//! - `store`: durable `TokenStore` seam
//! - `observer`: process-wide "is authenticated" flag with change callbacks
//! - `manager`: `SessionManager`, the single owner of session mutations

mod manager;
mod model;
mod observer;
mod store;

pub use manager::SessionManager;
pub use model::Session;
pub use observer::{SessionObserver, SubscriptionId};
pub use store::TokenStore;
