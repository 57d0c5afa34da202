//! Network layer: the reqwest transport, the token-refreshing client and
//! the typed Speshalgram API on top of it.

pub mod api;
pub mod client;
pub mod reqwest_transport;

pub use api::SpeshalApi;
pub use client::{AuthenticatedClient, LOGIN_PATH, REFRESH_PATH};
pub use reqwest_transport::ReqwestTransport;
