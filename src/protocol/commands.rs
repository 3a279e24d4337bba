//! Module `commands`
//!
//! Parses the action keyword of an action request into the set of actions the
//! service knows how to run.

use std::fmt;

use crate::error::RequestError;

/// An action the dispatcher can run.
///
/// Keywords are matched case-insensitively; anything outside this set is
/// rejected before any parameter is looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Copy,
}

impl Action {
    /// Canonical keyword
    pub fn keyword(&self) -> &'static str {
        match self {
            Action::Copy => "COPY",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Parses a raw action keyword.
pub fn parse_action(raw: Option<&str>) -> Result<Action, RequestError> {
    let trimmed = raw.map(str::trim).unwrap_or("");
    if trimmed.is_empty() {
        return Err(RequestError::MissingAction);
    }

    match trimmed.to_ascii_uppercase().as_str() {
        "COPY" => Ok(Action::Copy),
        _ => Err(RequestError::UnknownAction(trimmed.to_string())),
    }
}
