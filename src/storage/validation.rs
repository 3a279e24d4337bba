//! Path validation
//!
//! Turns a caller-supplied path string into a [`FilePath`]: rooted, free of
//! characters the host file system refuses, and normalised so that equivalent
//! local and network-share spellings compare equal. Validation is purely
//! syntactic and never touches the file system.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::DEFAULT_MAX_PATH_LENGTH;
use crate::error::FieldErrors;

/// Characters rejected in every path, in addition to control characters
pub const ILLEGAL_PATH_CHARS: [char; 2] = ['<', '>'];

/// Further characters rejected in drive and network-share paths. A `:` is
/// only allowed as the drive designator.
pub const ILLEGAL_WINDOWS_PATH_CHARS: [char; 5] = ['"', '|', '?', '*', ':'];

/// Host names that address the local machine in a UNC path
const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "::1", "0:0:0:0:0:0:0:1"];

/// Where a validated path is anchored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathRoot {
    /// `C:\...`
    Drive(char),
    /// `\\host\share\...`
    Unc { host: String, share: String },
    /// `/...`
    Posix,
}

/// Why a raw path string was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathViolation {
    Empty,
    TooLong(usize),
    IllegalCharacter(char),
    NotRooted,
    IncompleteShare,
}

impl PathViolation {
    /// Message reported against a named request field
    pub fn field_message(&self, field: &str) -> String {
        match self {
            PathViolation::Empty => format!("The {} field is required.", field),
            PathViolation::TooLong(max) => {
                format!("The {} field must not exceed {} characters.", field, max)
            }
            PathViolation::IllegalCharacter(c) => format!(
                "The {} field contains the illegal character '{}'.",
                field,
                c.escape_default()
            ),
            PathViolation::NotRooted => format!("The {} field must be an absolute path.", field),
            PathViolation::IncompleteShare => format!(
                "The {} field must name both a host and a share.",
                field
            ),
        }
    }
}

impl fmt::Display for PathViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathViolation::Empty => write!(f, "Path is empty"),
            PathViolation::TooLong(max) => write!(f, "Path is longer than {} characters", max),
            PathViolation::IllegalCharacter(c) => {
                write!(f, "Path contains illegal character '{}'", c.escape_default())
            }
            PathViolation::NotRooted => write!(f, "Path is not rooted"),
            PathViolation::IncompleteShare => write!(f, "Network path is missing host or share"),
        }
    }
}

impl std::error::Error for PathViolation {}

/// A validated, normalised, absolute path. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePath {
    root: PathRoot,
    components: Vec<String>,
}

impl FilePath {
    /// Validates `raw` and normalises it.
    pub fn parse(raw: &str, max_length: usize) -> Result<FilePath, PathViolation> {
        if raw.trim().is_empty() {
            return Err(PathViolation::Empty);
        }

        if raw.chars().count() > max_length {
            return Err(PathViolation::TooLong(max_length));
        }

        let raw = strip_namespace_prefix(raw);

        if let Some(c) = raw
            .chars()
            .find(|c| c.is_control() || ILLEGAL_PATH_CHARS.contains(c))
        {
            return Err(PathViolation::IllegalCharacter(c));
        }

        let (root, rest) = split_root(&raw)?;

        let separators: &[char] = match root {
            PathRoot::Posix => &['/'],
            _ => {
                if let Some(c) = rest.chars().find(|c| ILLEGAL_WINDOWS_PATH_CHARS.contains(c)) {
                    return Err(PathViolation::IllegalCharacter(c));
                }
                &['\\', '/']
            }
        };

        let mut components: Vec<String> = Vec::new();
        for segment in rest.split(separators) {
            match segment {
                "" | "." => {}
                ".." => {
                    components.pop();
                }
                other => components.push(other.to_string()),
            }
        }

        Ok(FilePath {
            root: fold_admin_share(root),
            components,
        })
    }

    pub fn root(&self) -> &PathRoot {
        &self.root
    }

    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Last component, `None` for a bare root
    pub fn file_name(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }

    /// Resolves to a path on this host, or `None` when the path cannot exist here.
    #[cfg(windows)]
    pub fn to_native(&self) -> Option<PathBuf> {
        Some(PathBuf::from(self.to_string()))
    }

    /// Resolves to a path on this host, or `None` when the path cannot exist here.
    ///
    /// Drive letters and remote shares have no meaning on this host. A loopback
    /// share addresses the local tree, so `\\localhost\tmp\x` is `/tmp/x`.
    #[cfg(not(windows))]
    pub fn to_native(&self) -> Option<PathBuf> {
        let mut path = PathBuf::from("/");
        match &self.root {
            PathRoot::Posix => {}
            PathRoot::Unc { host, share } if is_loopback(host) => path.push(share),
            _ => return None,
        }
        for component in &self.components {
            path.push(component);
        }
        Some(path)
    }
}

impl fmt::Display for FilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            PathRoot::Drive(letter) => write!(f, "{}:\\{}", letter, self.components.join("\\")),
            PathRoot::Unc { host, share } => {
                write!(f, "\\\\{}\\{}", host, share)?;
                for component in &self.components {
                    write!(f, "\\{}", component)?;
                }
                Ok(())
            }
            PathRoot::Posix => write!(f, "/{}", self.components.join("/")),
        }
    }
}

impl FromStr for FilePath {
    type Err = PathViolation;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        FilePath::parse(raw, DEFAULT_MAX_PATH_LENGTH)
    }
}

/// Validates one request field, recording any violation under `field`.
///
/// Returns the path when valid so several fields can be checked before the
/// caller decides whether to proceed.
pub fn validate_field(
    field: &str,
    raw: Option<&str>,
    max_length: usize,
    errors: &mut FieldErrors,
) -> Option<FilePath> {
    match FilePath::parse(raw.unwrap_or(""), max_length) {
        Ok(path) => Some(path),
        Err(violation) => {
            errors.add(field, violation.field_message(field));
            None
        }
    }
}

/// Validates a single path field on its own.
pub fn validate_path(field: &str, raw: Option<&str>, max_length: usize) -> Result<FilePath, FieldErrors> {
    let mut errors = FieldErrors::new();
    match validate_field(field, raw, max_length, &mut errors) {
        Some(path) => Ok(path),
        None => Err(errors),
    }
}

fn is_loopback(host: &str) -> bool {
    LOOPBACK_HOSTS
        .iter()
        .any(|loopback| loopback.eq_ignore_ascii_case(host))
}

/// Removes the `\\?\` and `\\.\` namespace prefixes; `\\?\UNC\` becomes `\\`.
fn strip_namespace_prefix(raw: &str) -> String {
    if let Some(rest) = raw
        .strip_prefix(r"\\?\UNC\")
        .or_else(|| raw.strip_prefix(r"\\?\unc\"))
    {
        return format!(r"\\{}", rest);
    }
    if let Some(rest) = raw
        .strip_prefix(r"\\?\")
        .or_else(|| raw.strip_prefix(r"\\.\"))
    {
        return rest.to_string();
    }
    raw.to_string()
}

/// Splits off the root, returning it with the remainder of the string.
fn split_root(raw: &str) -> Result<(PathRoot, &str), PathViolation> {
    if let Some(rest) = raw.strip_prefix(r"\\") {
        let mut parts = rest.splitn(3, ['\\', '/']);
        let host = parts.next().unwrap_or("");
        let share = parts.next().unwrap_or("");
        if host.is_empty() || share.is_empty() {
            return Err(PathViolation::IncompleteShare);
        }
        // IPv6 hosts carry colons
        if let Some(c) = host
            .chars()
            .filter(|c| *c != ':')
            .chain(share.chars())
            .find(|c| ILLEGAL_WINDOWS_PATH_CHARS.contains(c))
        {
            return Err(PathViolation::IllegalCharacter(c));
        }
        let root = PathRoot::Unc {
            host: host.to_string(),
            share: share.to_string(),
        };
        return Ok((root, parts.next().unwrap_or("")));
    }

    let bytes = raw.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return match bytes.get(2) {
            Some(b'\\') | Some(b'/') => Ok((
                PathRoot::Drive(char::from(bytes[0].to_ascii_uppercase())),
                &raw[3..],
            )),
            // `C:` and `C:dir` are relative to the drive's working directory
            _ => Err(PathViolation::NotRooted),
        };
    }

    if let Some(rest) = raw.strip_prefix('/') {
        return Ok((PathRoot::Posix, rest));
    }

    Err(PathViolation::NotRooted)
}

/// `\\localhost\C$` is the local drive `C:`.
fn fold_admin_share(root: PathRoot) -> PathRoot {
    if let PathRoot::Unc { host, share } = &root {
        let bytes = share.as_bytes();
        if is_loopback(host) && bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b'$' {
            return PathRoot::Drive(char::from(bytes[0].to_ascii_uppercase()));
        }
    }
    root
}
