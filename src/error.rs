//! Centralized error types for mboxsft.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the mboxsft library.
///
/// Only archive-level and output-level failures surface here. Problems with
/// individual messages are recovered where they happen and never abort a run.
#[derive(Error, Debug)]
pub enum SftError {
    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified archive does not exist.
    #[error("MBOX file not found: {0}")]
    FileNotFound(PathBuf),

    /// The file does not appear to be a valid MBOX.
    #[error("File does not appear to be a valid MBOX: {0}")]
    InvalidMbox(PathBuf),

    /// Extraction options that cannot produce any record.
    #[error("Invalid extraction options: {0}")]
    InvalidOptions(String),

    /// A record could not be serialized.
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Convenience alias for `Result<T, SftError>`.
pub type Result<T> = std::result::Result<T, SftError>;

impl SftError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Allow `?` on `std::io::Error` when no path is at hand (writers, streams).
/// Prefer `SftError::io` whenever the path is known.
impl From<std::io::Error> for SftError {
    fn from(source: std::io::Error) -> Self {
        Self::io("<stream>", source)
    }
}
