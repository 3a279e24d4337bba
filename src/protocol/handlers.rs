//! Action handlers for the file action service.
//!
//! Dispatches an action request to its handler after validating the
//! parameters the handler needs. Field violations are collected for every
//! parameter before any I/O is attempted.

use log::info;
use std::collections::HashMap;

use crate::config::ServiceConfig;
use crate::error::{FieldErrors, ServiceError};
use crate::protocol::commands::{Action, parse_action};
use crate::storage::{self, CopyResult, FilePath, validate_field};

/// Raw action parameters keyed by wire name
pub type ActionParams = HashMap<String, String>;

pub const SOURCE_PATH_FIELD: &str = "SourcePath";
pub const DEST_PATH_FIELD: &str = "DestPath";
pub const OVERWRITE_FIELD: &str = "Overwrite";

/// A validated copy request, consumed once by the copy engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyRequest {
    pub source_path: FilePath,
    pub dest_path: FilePath,
    pub overwrite: bool,
}

/// Outcome of a successfully dispatched action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Copied {
        request: CopyRequest,
        result: CopyResult,
    },
}

impl ActionOutcome {
    pub fn action(&self) -> Action {
        match self {
            ActionOutcome::Copied { .. } => Action::Copy,
        }
    }
}

/// Dispatches `action` with its parameters.
///
/// Runs blocking file system work; async callers should move it off the
/// reactor.
pub fn dispatch(
    action: Option<&str>,
    params: &ActionParams,
    config: &ServiceConfig,
) -> Result<ActionOutcome, ServiceError> {
    match parse_action(action)? {
        Action::Copy => handle_copy(params, config),
    }
}

/// Handles the COPY action: validates both paths and the overwrite flag, then copies.
fn handle_copy(params: &ActionParams, config: &ServiceConfig) -> Result<ActionOutcome, ServiceError> {
    let request = parse_copy_request(params, config.max_path_length)?;

    info!(
        "COPY {} -> {} (overwrite={})",
        request.source_path, request.dest_path, request.overwrite
    );

    let result = storage::copy(&request.source_path, &request.dest_path, request.overwrite)?;
    Ok(ActionOutcome::Copied { request, result })
}

/// Builds a [`CopyRequest`], reporting every invalid field together.
pub fn parse_copy_request(
    params: &ActionParams,
    max_path_length: usize,
) -> Result<CopyRequest, FieldErrors> {
    let mut errors = FieldErrors::new();

    let source_path = validate_field(
        SOURCE_PATH_FIELD,
        param(params, SOURCE_PATH_FIELD),
        max_path_length,
        &mut errors,
    );
    let dest_path = validate_field(
        DEST_PATH_FIELD,
        param(params, DEST_PATH_FIELD),
        max_path_length,
        &mut errors,
    );
    let overwrite = match parse_flag(param(params, OVERWRITE_FIELD)) {
        Ok(flag) => flag,
        Err(raw) => {
            errors.add(
                OVERWRITE_FIELD,
                format!("The value '{}' is not valid for {}.", raw, OVERWRITE_FIELD),
            );
            false
        }
    };

    match (source_path, dest_path) {
        (Some(source_path), Some(dest_path)) => errors.into_result(CopyRequest {
            source_path,
            dest_path,
            overwrite,
        }),
        _ => Err(errors),
    }
}

/// Looks a parameter up by name, ignoring ASCII case
fn param<'a>(params: &'a ActionParams, name: &str) -> Option<&'a str> {
    params
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

/// Parses an optional boolean flag; absent or empty means `false`.
pub fn parse_flag(raw: Option<&str>) -> Result<bool, String> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(false);
    };

    if raw.eq_ignore_ascii_case("true") || raw == "1" {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") || raw == "0" {
        Ok(false)
    } else {
        Err(raw.to_string())
    }
}
