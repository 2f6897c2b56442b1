//! Global configuration settings
//!
//! Sizing of the pipeline queues and worker pool.

use serde::Deserialize;

/// Global configuration that applies to the whole pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Capacity of the line queue and of each destination queue
    /// Default: 1
    pub queue_size: usize,

    /// Number of parser workers
    /// Default: None (auto = number of CPU cores)
    pub parser_workers: Option<usize>,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            queue_size: 1,
            parser_workers: None,
        }
    }
}

impl GlobalConfig {
    /// Get the effective number of parser workers
    ///
    /// Returns the configured value, or num_cpus if not set (auto mode).
    pub fn effective_parser_workers(&self) -> usize {
        self.parser_workers.unwrap_or_else(num_cpus).max(1)
    }
}

/// Get the number of available CPUs, defaulting to 1 if detection fails
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
