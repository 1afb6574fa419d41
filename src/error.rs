//! Centralized error handling for Quillpad
//!
//! This module provides a unified error type covering all failure
//! scenarios in the session core: file I/O, save association, and
//! session snapshot persistence.

use log::warn;
use std::fmt;
use std::io;
use std::path::PathBuf;

// ─────────────────────────────────────────────────────────────────────────────
// Custom Result Type Alias
// ─────────────────────────────────────────────────────────────────────────────

/// A specialized `Result` type for the session core.
pub type Result<T> = std::result::Result<T, Error>;

/// The centralized error type for the session core.
///
/// Search exhaustion is deliberately absent here: "no more occurrences"
/// is a normal outcome of scanning, not a fault, and is reported through
/// [`crate::find_replace::SearchOutcome`] instead.
#[derive(Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // File I/O Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Generic I/O error wrapper
    Io(io::Error),

    /// Failed to open a file for reading
    Unreadable { path: PathBuf, source: io::Error },

    /// Failed to open or write a file; carries the underlying I/O message
    Unwritable { path: PathBuf, source: io::Error },

    /// Save requested on a tab with no backing file (caller must Save-As)
    NoAssociatedFile,

    // ─────────────────────────────────────────────────────────────────────────
    // Session Persistence Errors
    // ─────────────────────────────────────────────────────────────────────────
    /// Persisted session snapshot is malformed; recovered by falling
    /// back to a single fresh tab, never fatal
    SessionCorrupt { message: String },

    /// Configuration directory not found or inaccessible
    ConfigDirNotFound,
}

// Implement From traits for convenient error conversion
impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SessionCorrupt {
            message: err.to_string(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Display trait implementation for user-friendly error messages
// ─────────────────────────────────────────────────────────────────────────────
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Unreadable { path, source } => {
                write!(f, "Cannot open '{}': {}", path.display(), source)
            }
            Error::Unwritable { path, source } => {
                write!(f, "Cannot save file '{}': {}", path.display(), source)
            }
            Error::NoAssociatedFile => {
                write!(f, "No file is associated with this tab")
            }
            Error::SessionCorrupt { message } => {
                write!(f, "Session snapshot is corrupt: {}", message)
            }
            Error::ConfigDirNotFound => {
                write!(f, "Configuration directory not found")
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// std::error::Error trait implementation for error chaining
// ─────────────────────────────────────────────────────────────────────────────
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Unreadable { source, .. } => Some(source),
            Error::Unwritable { source, .. } => Some(source),
            Error::NoAssociatedFile
            | Error::SessionCorrupt { .. }
            | Error::ConfigDirNotFound => None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Graceful Degradation Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for Result to support graceful degradation.
pub trait ResultExt<T> {
    /// If the result is an error, log it at warning level and return the provided default.
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T;
}

impl<T> ResultExt<T> for Result<T> {
    fn unwrap_or_warn_default(self, default: T, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                warn!("{}: {}. Using default.", context, err);
                default
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
