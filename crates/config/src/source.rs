//! Input file configuration

use serde::Deserialize;

/// Default input pattern
pub const DEFAULT_PATTERN: &str = "/data/appsinstalled/*.tsv.gz";

/// Which files to load and what to do with them afterwards
///
/// # Example
///
/// ```toml
/// [source]
/// pattern = "/data/appsinstalled/*.tsv.gz"
/// mark_processed = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Glob pattern of gzip input files
    pub pattern: String,

    /// Rename each fully fed file to a dot-file
    /// Default: true (always off in dry runs)
    pub mark_processed: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.into(),
            mark_processed: true,
        }
    }
}
