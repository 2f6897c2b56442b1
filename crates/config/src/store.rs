//! Store client configuration
//!
//! Connection and retry settings shared by every memcached destination.

use std::time::Duration;

use serde::Deserialize;

/// Store client settings
///
/// # Example
///
/// ```toml
/// [store]
/// dry_run = false
/// connect_timeout = "1s"
/// io_timeout = "1s"
/// retry_attempts = 3
/// retry_interval = "100ms"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Log payloads instead of writing them; input files are left in place
    pub dry_run: bool,

    /// Timeout for establishing a connection
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Timeout for one `set` round trip
    #[serde(with = "humantime_serde")]
    pub io_timeout: Duration,

    /// Attempts per item, including the first
    pub retry_attempts: u32,

    /// Pause between attempts
    #[serde(with = "humantime_serde")]
    pub retry_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            connect_timeout: Duration::from_secs(1),
            io_timeout: Duration::from_secs(1),
            retry_attempts: 3,
            retry_interval: Duration::from_millis(100),
        }
    }
}
