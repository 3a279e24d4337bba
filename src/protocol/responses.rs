//! Response payloads
//!
//! Defines the JSON bodies returned to callers and maps service errors onto
//! them.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::handlers::{error_tag, error_to_status_code};
use crate::error::{ServiceError, StorageError};
use crate::protocol::handlers::ActionOutcome;
use crate::storage::CopyResult;

/// Standard HTTP status codes used by the service
pub const OK: u16 = 200;
pub const BAD_REQUEST: u16 = 400;
pub const NOT_FOUND: u16 = 404;
pub const INTERNAL_ERROR: u16 = 500;

/// Flat message, used for request-shape errors and missing targets
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Field name to messages mapping for validation failures
#[derive(Debug, Serialize)]
pub struct ValidationBody {
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Host-level failure carrying an exception-type tag
#[derive(Debug, Serialize)]
pub struct ExceptionBody {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
}

/// Body of a successful action
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBody {
    pub action: String,
    pub source_path: String,
    pub dest_path: String,
    #[serde(flatten)]
    pub result: CopyResult,
}

impl From<&ActionOutcome> for ActionBody {
    fn from(outcome: &ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Copied { request, result } => ActionBody {
                action: outcome.action().to_string(),
                source_path: request.source_path.to_string(),
                dest_path: request.dest_path.to_string(),
                result: result.clone(),
            },
        }
    }
}

/// Status code and JSON body for a service error
pub fn error_response(err: &ServiceError) -> (u16, serde_json::Value) {
    let status = error_to_status_code(err);
    let body = match err {
        ServiceError::Validation(errors) => serde_json::json!(ValidationBody {
            errors: errors.fields().clone(),
        }),
        ServiceError::Request(e) => serde_json::json!(MessageBody {
            message: e.to_string(),
        }),
        ServiceError::Storage(e @ StorageError::NotFound(_)) => serde_json::json!(MessageBody {
            message: e.to_string(),
        }),
        ServiceError::Storage(e) => serde_json::json!(ExceptionBody {
            kind: error_tag(e).to_string(),
            message: e.to_string(),
        }),
    };
    (status, body)
}
