//! Error types
//!
//! Defines domain-specific error types for each stage of a request: field
//! validation, request shape, and storage.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

/// Per-field validation violations, aggregated before any I/O happens.
///
/// Field names keep their wire spelling (`Path`, `SourcePath`, `DestPath`, ...)
/// and map to every message reported against that field, in the order found.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation against `field`.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Messages reported against `field`, if any.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }

    /// Returns `value` when no violation was recorded, otherwise the violations.
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed")?;
        for (field, messages) in &self.fields {
            write!(f, "; {}: {}", field, messages.join(" "))?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Request-shape errors, reported as a flat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    MissingAction,
    UnknownAction(String),
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::MissingAction => write!(f, "A value for action is not provided."),
            RequestError::UnknownAction(a) => write!(f, "Unknown action command - '{}'.", a),
        }
    }
}

impl std::error::Error for RequestError {}

/// Storage errors raised once a request has passed validation
#[derive(Debug)]
pub enum StorageError {
    /// The addressed file or directory does not exist
    NotFound(String),
    /// The destination already exists and overwriting was not requested
    Conflict(String),
    /// The operation cannot be carried out on these paths at all
    InvalidOperation(String),
    /// Any other host file system failure
    Io(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::NotFound(p) => write!(f, "Could not find '{}'.", p),
            StorageError::Conflict(p) => write!(f, "The destination '{}' already exists.", p),
            StorageError::InvalidOperation(msg) => write!(f, "{}", msg),
            StorageError::Io(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::Io(error)
    }
}

/// General service error that encompasses all error types
#[derive(Debug)]
pub enum ServiceError {
    Validation(FieldErrors),
    Request(RequestError),
    Storage(StorageError),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::Validation(e) => write!(f, "{}", e),
            ServiceError::Request(e) => write!(f, "{}", e),
            ServiceError::Storage(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ServiceError {}

impl From<FieldErrors> for ServiceError {
    fn from(error: FieldErrors) -> Self {
        ServiceError::Validation(error)
    }
}

impl From<RequestError> for ServiceError {
    fn from(error: RequestError) -> Self {
        ServiceError::Request(error)
    }
}

impl From<StorageError> for ServiceError {
    fn from(error: StorageError) -> Self {
        ServiceError::Storage(error)
    }
}

impl From<io::Error> for ServiceError {
    fn from(error: io::Error) -> Self {
        ServiceError::Storage(StorageError::Io(error))
    }
}
