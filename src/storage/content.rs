//! Content resolution
//!
//! Opens a file for retrieval and decides how it is presented: the media type
//! and whether it is shown inline or offered as a download.

use log::info;
use std::io;
use std::path::Path;
use tokio::fs::{self, File};

use crate::error::StorageError;
use crate::storage::results::{ContentDescriptor, Disposition};
use crate::storage::validation::FilePath;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Extensions whose media type is pinned regardless of the wider mime table
const MEDIA_TYPES: [(&str, &str); 12] = [
    ("txt", "text/plain"),
    ("log", "text/plain"),
    ("xml", "text/xml"),
    ("htm", "text/html"),
    ("html", "text/html"),
    ("css", "text/css"),
    ("csv", "text/csv"),
    ("js", "application/javascript"),
    ("json", "application/json"),
    ("pdf", "application/pdf"),
    ("zip", "application/zip"),
    ("png", "image/png"),
];

/// Media type derived from the file extension; unknown extensions are octet streams
pub fn media_type_for(path: &Path) -> String {
    let Some(extension) = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
    else {
        return OCTET_STREAM.to_string();
    };

    MEDIA_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, media_type)| media_type.to_string())
        .unwrap_or_else(|| {
            mime_guess::from_ext(&extension)
                .first_or_octet_stream()
                .essence_str()
                .to_string()
        })
}

/// Resolves `path` to an open file plus its presentation.
///
/// With `download` set the media type is forced to an octet stream and the
/// disposition to attachment. Directories are not retrievable.
pub async fn resolve(path: &FilePath, download: bool) -> Result<ContentDescriptor, StorageError> {
    let not_found = || StorageError::NotFound(path.to_string());

    let native = path.to_native().ok_or_else(not_found)?;

    let metadata = match fs::metadata(&native).await {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => return Err(not_found()),
        Err(e) => return Err(StorageError::Io(e)),
    };

    if !metadata.is_file() {
        return Err(not_found());
    }

    let file = match File::open(&native).await {
        Ok(file) => file,
        Err(e) if is_missing(&e) => return Err(not_found()),
        Err(e) => return Err(StorageError::Io(e)),
    };
    let length = file.metadata().await?.len();

    let (media_type, disposition) = if download {
        (OCTET_STREAM.to_string(), Disposition::Attachment)
    } else {
        (media_type_for(&native), Disposition::Inline)
    };

    info!(
        "Resolved {} as {} ({}, {} bytes)",
        path, media_type, disposition, length
    );

    Ok(ContentDescriptor::new(
        media_type,
        disposition,
        path.file_name().unwrap_or_default().to_string(),
        length,
        file,
    ))
}

/// Errors that mean "nothing is there" rather than a host failure
pub(crate) fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}
