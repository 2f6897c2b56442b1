//! Quality gate configuration

use serde::Deserialize;

/// Acceptance threshold of a run
///
/// A run is accepted when `errors / processed < max_error_rate`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    /// Default: 0.01
    pub max_error_rate: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            max_error_rate: 0.01,
        }
    }
}
