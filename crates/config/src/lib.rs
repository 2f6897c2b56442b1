//! memload Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! Minimal config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use memload_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[source]\npattern = \"in/*.tsv.gz\"").unwrap();
//! assert_eq!(config.destinations.len(), 4);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [global]
//! queue_size = 1
//! parser_workers = 4
//!
//! [log]
//! level = "info"
//!
//! [source]
//! pattern = "/data/appsinstalled/*.tsv.gz"
//!
//! [destinations]
//! idfa = "127.0.0.1:33013"
//! gaid = "127.0.0.1:33014"
//!
//! [store]
//! io_timeout = "1s"
//!
//! [quality]
//! max_error_rate = 0.01
//! ```

mod destinations;
mod error;
mod global;
mod logging;
mod quality;
mod source;
mod store;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use destinations::{DEFAULT_DESTINATIONS, DestinationsConfig};
pub use error::{ConfigError, Result};
pub use global::GlobalConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use quality::QualityConfig;
pub use source::{DEFAULT_PATTERN, SourceConfig};
pub use store::StoreConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Queue and worker sizing
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Input files
    pub source: SourceConfig,

    /// Device type → store address
    pub destinations: DestinationsConfig,

    /// Store client behaviour
    pub store: StoreConfig,

    /// Acceptance threshold
    pub quality: QualityConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML or fails
    /// validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Run again after applying command-line overrides.
    pub fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
