//! Filesystem-backed implementations for the Speshalgram client.

pub mod config_service;
pub mod paths;
pub mod storage;
pub mod token_store;

pub use config_service::ConfigService;
pub use paths::{PathError, SpeshalPaths};
pub use token_store::{FileTokenStore, InMemoryTokenStore};
