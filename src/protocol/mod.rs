//! Action protocol
//!
//! Handles action keyword parsing, dispatch to handlers, and response payloads.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Action, parse_action};
pub use handlers::{ActionOutcome, ActionParams, CopyRequest, dispatch};
