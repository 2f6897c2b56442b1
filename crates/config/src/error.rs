//! Configuration error types

use std::io;
use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file
    #[error("failed to read config file '{path}': {source}")]
    IoError {
        /// Path to the file
        path: String,
        /// Underlying IO error
        #[source]
        source: io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Validation error - required field missing or empty
    #[error("[{section}] is missing required field '{field}'")]
    MissingField {
        /// Config section
        section: &'static str,
        /// Missing field name
        field: String,
    },

    /// Validation error - invalid value
    #[error("[{section}] has invalid {field}: {message}")]
    InvalidValue {
        /// Config section
        section: &'static str,
        /// Field name
        field: String,
        /// Error message
        message: String,
    },

    /// No destinations configured
    #[error("no destinations are configured - at least one device type must be mapped")]
    NoDestinations,
}

impl ConfigError {
    /// Create a MissingField error
    pub fn missing_field(section: &'static str, field: impl Into<String>) -> Self {
        Self::MissingField {
            section,
            field: field.into(),
        }
    }

    /// Create an InvalidValue error
    pub fn invalid_value(
        section: &'static str,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            section,
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_error() {
        let err = ConfigError::missing_field("source", "pattern");
        assert_eq!(err.to_string(), "[source] is missing required field 'pattern'");
    }

    #[test]
    fn test_invalid_value_error() {
        let err = ConfigError::invalid_value("global", "queue_size", "must be at least 1");
        assert!(err.to_string().contains("[global]"));
        assert!(err.to_string().contains("queue_size"));
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_io_error() {
        let err = ConfigError::IoError {
            path: "/etc/memload.toml".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/etc/memload.toml"));
    }

    #[test]
    fn test_no_destinations() {
        assert!(ConfigError::NoDestinations.to_string().contains("no destinations"));
    }
}
