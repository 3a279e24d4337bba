//! Error handlers
//!
//! Maps service errors onto the status and tag a caller observes.

use crate::error::types::{ServiceError, StorageError};
use log::{error, warn};

/// Log a service error at a level matching who is at fault
pub fn handle_error(err: &ServiceError) {
    match err {
        ServiceError::Validation(_) | ServiceError::Request(_) => warn!("Rejected request: {}", err),
        ServiceError::Storage(StorageError::NotFound(_)) => warn!("{}", err),
        ServiceError::Storage(_) => error!("Storage failure: {}", err),
    }
}

/// Convert error to HTTP status code
pub fn error_to_status_code(err: &ServiceError) -> u16 {
    match err {
        ServiceError::Validation(_) => 400,
        ServiceError::Request(_) => 400,
        ServiceError::Storage(StorageError::NotFound(_)) => 404,
        ServiceError::Storage(StorageError::Conflict(_)) => 500,
        ServiceError::Storage(StorageError::InvalidOperation(_)) => 500,
        ServiceError::Storage(StorageError::Io(_)) => 500,
    }
}

/// Exception-type tag carried alongside host-level failures
pub fn error_tag(err: &StorageError) -> &'static str {
    match err {
        StorageError::NotFound(_) => "NotFound",
        StorageError::Conflict(_) => "Conflict",
        StorageError::InvalidOperation(_) => "InvalidOperation",
        StorageError::Io(_) => "Io",
    }
}
