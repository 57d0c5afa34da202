//! Core domain types for the Speshalgram client.
//!
//! This crate holds the data model, the error taxonomy and the seams
//! (`HttpTransport`, `TokenStore`) the outer layers implement. It performs no I/O.

pub mod collection;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod page;
pub mod reconcile;
pub mod session;

pub use error::{ErrorKind, FieldErrors, Result, SpeshalError};
