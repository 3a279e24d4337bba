//! Server core functionality
//!
//! This module contains the listener and the HTTP routes that expose the
//! storage operations.

pub mod core;
pub mod routes;

pub use self::core::Server;
pub use routes::{AppState, router};
