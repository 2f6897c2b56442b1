//! Input file discovery

use std::path::PathBuf;

use glob::MatchOptions;

use crate::{Result, SourceError};

/// Enumerates the files of one run
pub trait FileSource: Send + Sync {
    /// List input files in processing order
    ///
    /// # Errors
    ///
    /// Returns `SourceError::Pattern` when the listing itself is impossible.
    /// This aborts the run before any worker starts.
    fn list(&self) -> Result<Vec<PathBuf>>;
}

/// Glob-based file source
///
/// Matches regular files against a shell pattern and returns them in
/// lexicographic order. Names starting with `.` never match a wildcard, so
/// files already renamed by [`DotRenameMarker`](crate::DotRenameMarker) are
/// skipped on later runs.
#[derive(Debug, Clone)]
pub struct GlobFileSource {
    pattern: String,
}

impl GlobFileSource {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Pattern as configured
    #[inline]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn match_options() -> MatchOptions {
        MatchOptions {
            case_sensitive: true,
            require_literal_separator: true,
            require_literal_leading_dot: true,
        }
    }
}

impl FileSource for GlobFileSource {
    fn list(&self) -> Result<Vec<PathBuf>> {
        let entries = glob::glob_with(&self.pattern, Self::match_options())
            .map_err(|e| SourceError::pattern(&self.pattern, e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) if path.is_file() => files.push(path),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(path = %e.path().display(), error = %e.error(), "skipping unreadable path");
                }
            }
        }
        files.sort();

        tracing::debug!(pattern = %self.pattern, count = files.len(), "listed input files");
        Ok(files)
    }
}
