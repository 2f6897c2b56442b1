//! Source error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for source operations
pub type Result<T> = std::result::Result<T, SourceError>;

/// Errors raised while discovering, reading or marking input files
///
/// `Pattern` is fatal for a run. The others are file-level: the file is
/// skipped (and left unmarked) and the run continues.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Glob pattern could not be compiled
    #[error("invalid file pattern '{pattern}': {message}")]
    Pattern {
        /// Pattern as configured
        pattern: String,
        /// Parser diagnostic
        message: String,
    },

    /// File could not be opened
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File could not be read or decompressed
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File could not be marked as processed
    #[error("failed to mark {} as processed: {source}", path.display())]
    Mark {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SourceError {
    /// Create a Pattern error
    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Pattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    /// Create an Open error
    pub fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    /// Create a Read error
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    /// Create a Mark error
    pub fn mark(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Mark {
            path: path.into(),
            source,
        }
    }

    /// Whether this error ends the run rather than skipping one file
    #[inline]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Pattern { .. })
    }
}
