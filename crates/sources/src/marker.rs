//! Completion markers for drained input files

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{Result, SourceError};

/// Marks a file whose lines have all been queued
pub trait CompletionMarker: Send + Sync {
    /// Mark `path` as processed
    fn mark(&self, path: &Path) -> Result<()>;
}

/// Renames `dir/name` to `dir/.name`
#[derive(Debug, Clone, Copy, Default)]
pub struct DotRenameMarker;

impl CompletionMarker for DotRenameMarker {
    fn mark(&self, path: &Path) -> Result<()> {
        let target = dot_path(path).ok_or_else(|| {
            SourceError::mark(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"),
            )
        })?;
        fs::rename(path, &target).map_err(|e| SourceError::mark(path, e))?;
        tracing::debug!(from = %path.display(), to = %target.display(), "marked file processed");
        Ok(())
    }
}

/// Leaves files untouched (dry runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMarker;

impl CompletionMarker for NoopMarker {
    fn mark(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

/// Dot-prefixed sibling of `path`, or `None` if it has no file name
pub fn dot_path(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let mut dotted = OsString::from(".");
    dotted.push(name);
    Some(path.with_file_name(dotted))
}
