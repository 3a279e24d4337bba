//! Storage operations
//!
//! The copy engine: copies a single file or a whole directory tree, applying
//! the overwrite policy before anything is written.

use log::{debug, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::StorageError;
use crate::storage::content::is_missing;
use crate::storage::results::{CopyKind, CopyResult};
use crate::storage::validation::FilePath;

/// Deepest directory nesting a tree copy will descend into
pub const MAX_DIRECTORY_DEPTH: usize = 256;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Copies `source` to `dest`.
///
/// A missing source fails with `NotFound`. An existing destination fails with
/// `Conflict` unless `overwrite` is set; both checks happen before any write.
/// Directories are copied recursively. With `overwrite` an existing destination
/// directory is merged into: same-named files are replaced, same-named
/// directories are merged, and entries only present in the destination are kept.
/// The source is never modified.
pub fn copy(source: &FilePath, dest: &FilePath, overwrite: bool) -> Result<CopyResult, StorageError> {
    let source_path = source
        .to_native()
        .ok_or_else(|| StorageError::NotFound(source.to_string()))?;

    let source_meta = match fs::metadata(&source_path) {
        Ok(metadata) => metadata,
        Err(e) if is_missing(&e) => return Err(StorageError::NotFound(source.to_string())),
        Err(e) => return Err(StorageError::Io(e)),
    };

    let dest_path = dest.to_native().ok_or_else(|| {
        StorageError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Could not find a part of the path '{}'.", dest),
        ))
    })?;

    let dest_meta = match fs::metadata(&dest_path) {
        Ok(metadata) => Some(metadata),
        Err(e) if is_missing(&e) => None,
        Err(e) => return Err(StorageError::Io(e)),
    };

    if let Some(existing) = &dest_meta {
        if !overwrite {
            return Err(StorageError::Conflict(dest.to_string()));
        }
        if existing.is_dir() && !source_meta.is_dir() {
            return Err(StorageError::InvalidOperation(format!(
                "Cannot overwrite directory '{}' with file '{}'.",
                dest, source
            )));
        }
        if !existing.is_dir() && source_meta.is_dir() {
            return Err(StorageError::InvalidOperation(format!(
                "Cannot overwrite file '{}' with directory '{}'.",
                dest, source
            )));
        }
    }

    let result = if source_meta.is_dir() {
        ensure_not_nested(&source_path, &dest_path, source, dest)?;

        let mut result = CopyResult {
            kind: CopyKind::Directory,
            files_copied: 0,
            directories_created: 0,
        };
        if dest_meta.is_none() {
            fs::create_dir_all(&dest_path)?;
            result.directories_created += 1;
        }
        copy_tree(&source_path, &dest_path, 1, &mut result)?;
        result
    } else {
        copy_file(&source_path, &dest_path)?;
        CopyResult {
            kind: CopyKind::File,
            files_copied: 1,
            directories_created: 0,
        }
    };

    info!(
        "Copied {} -> {} ({} files, {} directories created, overwrite={})",
        source, dest, result.files_copied, result.directories_created, overwrite
    );

    Ok(result)
}

/// Merges the contents of `from` into the existing directory `to`
fn copy_tree(
    from: &Path,
    to: &Path,
    depth: usize,
    result: &mut CopyResult,
) -> Result<(), StorageError> {
    if depth > MAX_DIRECTORY_DEPTH {
        return Err(StorageError::InvalidOperation(format!(
            "Directory '{}' is nested deeper than {} levels.",
            from.display(),
            MAX_DIRECTORY_DEPTH
        )));
    }

    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let entry_from = entry.path();
        let entry_to = to.join(entry.file_name());
        let is_dir = fs::metadata(&entry_from)?.is_dir();
        let existing = match fs::metadata(&entry_to) {
            Ok(metadata) => Some(metadata),
            Err(e) if is_missing(&e) => None,
            Err(e) => return Err(StorageError::Io(e)),
        };

        if is_dir {
            match existing {
                Some(metadata) if !metadata.is_dir() => {
                    return Err(StorageError::InvalidOperation(format!(
                        "Cannot overwrite file '{}' with a directory.",
                        entry_to.display()
                    )));
                }
                Some(_) => {}
                None => {
                    fs::create_dir(&entry_to)?;
                    result.directories_created += 1;
                }
            }
            copy_tree(&entry_from, &entry_to, depth + 1, result)?;
        } else {
            if existing.is_some_and(|metadata| metadata.is_dir()) {
                return Err(StorageError::InvalidOperation(format!(
                    "Cannot overwrite directory '{}' with a file.",
                    entry_to.display()
                )));
            }
            copy_file(&entry_from, &entry_to)?;
            result.files_copied += 1;
        }
    }

    Ok(())
}

/// Copies one file through a sibling temporary file renamed into place, so a
/// failed copy never leaves a half-written destination behind.
fn copy_file(from: &Path, to: &Path) -> io::Result<()> {
    let temp_path = temp_path_for(to);

    let outcome = fs::copy(from, &temp_path).and_then(|_| fs::rename(&temp_path, to));
    if outcome.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    outcome?;

    debug!("Copied file {} -> {}", from.display(), to.display());
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let unique = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.{}-{}.tmp", name, std::process::id(), unique))
}

/// Rejects copying a directory onto itself, into its own subtree, or into one
/// of its ancestors, where the merge would write back into the source.
fn ensure_not_nested(
    source_path: &Path,
    dest_path: &Path,
    source: &FilePath,
    dest: &FilePath,
) -> Result<(), StorageError> {
    let source_real = source_path.canonicalize()?;
    let dest_real = canonicalize_existing_prefix(dest_path)?;

    if dest_real.starts_with(&source_real) {
        return Err(StorageError::InvalidOperation(format!(
            "Cannot copy directory '{}' into itself ('{}').",
            source, dest
        )));
    }
    if source_real.starts_with(&dest_real) {
        return Err(StorageError::InvalidOperation(format!(
            "Cannot copy directory '{}' into its ancestor '{}'.",
            source, dest
        )));
    }
    Ok(())
}

/// Canonicalizes the deepest existing ancestor of `path` and re-appends the rest
fn canonicalize_existing_prefix(path: &Path) -> io::Result<PathBuf> {
    let mut missing = Vec::new();
    let mut current = path;
    loop {
        match current.canonicalize() {
            Ok(mut real) => {
                real.extend(missing.iter().rev());
                return Ok(real);
            }
            Err(e) if is_missing(&e) => {
                let (Some(parent), Some(name)) = (current.parent(), current.file_name()) else {
                    return Err(e);
                };
                missing.push(name.to_os_string());
                current = parent;
            }
            Err(e) => return Err(e),
        }
    }
}
