//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::fmt;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

/// Whether the consumer should display content or save it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of resolving a file for retrieval.
///
/// Owns the open file handle; the handle is closed when the descriptor, or the
/// stream made from it, is dropped.
#[derive(Debug)]
pub struct ContentDescriptor {
    pub media_type: String,
    pub disposition: Disposition,
    pub file_name: String,
    pub length: u64,
    file: File,
}

impl ContentDescriptor {
    pub(crate) fn new(
        media_type: String,
        disposition: Disposition,
        file_name: String,
        length: u64,
        file: File,
    ) -> Self {
        Self {
            media_type,
            disposition,
            file_name,
            length,
            file,
        }
    }

    /// `Content-Disposition` header value, e.g. `inline; filename="1.txt"`
    pub fn content_disposition(&self) -> String {
        let ascii_name: String = self
            .file_name
            .chars()
            .map(|c| match c {
                '"' | '\\' => '_',
                c if c.is_ascii() && !c.is_ascii_control() => c,
                _ => '_',
            })
            .collect();
        format!("{}; filename=\"{}\"", self.disposition, ascii_name)
    }

    /// Chunked stream over the file, `capacity` bytes per chunk
    pub fn into_stream(self, capacity: usize) -> ReaderStream<File> {
        ReaderStream::with_capacity(self.file, capacity)
    }
}

/// What a copy request addressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyKind {
    File,
    Directory,
}

/// Result of a successful copy operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyResult {
    pub kind: CopyKind,
    pub files_copied: usize,
    pub directories_created: usize,
}

/// One storage volume visible to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveInfoModel {
    /// Root of the volume, e.g. `C:\` or `/mnt/data`
    pub name: String,
    pub volume_label: String,
    pub drive_type: String,
    pub drive_format: String,
    pub total_size: u64,
    pub available_free_space: u64,
    pub is_ready: bool,
}
