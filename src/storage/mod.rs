//! File system storage
//!
//! Path validation, content resolution, the copy engine and drive enumeration.

pub mod content;
pub mod drives;
pub mod operations;
pub mod results;
pub mod validation;

// Re-export the operations callers reach for
pub use content::resolve;
pub use drives::list_drives;
pub use operations::{MAX_DIRECTORY_DEPTH, copy};
pub use results::{ContentDescriptor, CopyKind, CopyResult, Disposition, DriveInfoModel};
pub use validation::{FilePath, PathRoot, PathViolation, validate_field, validate_path};
