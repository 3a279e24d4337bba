//! Error handling
//!
//! Defines the error taxonomy of the service and how each error surfaces to a caller.

pub mod handlers;
pub mod types;

pub use types::*;
