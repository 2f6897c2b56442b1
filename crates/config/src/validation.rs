//! Configuration validation
//!
//! Validates config consistency:
//! - Queue and worker sizes are positive
//! - An input pattern is given
//! - At least one destination, each with a usable tag and address
//! - Error rate threshold and retry count are in range

use crate::Config;
use crate::error::{ConfigError, Result};

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_global(config)?;
    validate_source(config)?;
    validate_destinations(config)?;
    validate_store(config)?;
    validate_quality(config)?;
    Ok(())
}

fn validate_global(config: &Config) -> Result<()> {
    if config.global.queue_size == 0 {
        return Err(ConfigError::invalid_value(
            "global",
            "queue_size",
            "must be at least 1",
        ));
    }
    if config.global.parser_workers == Some(0) {
        return Err(ConfigError::invalid_value(
            "global",
            "parser_workers",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_source(config: &Config) -> Result<()> {
    if config.source.pattern.trim().is_empty() {
        return Err(ConfigError::missing_field("source", "pattern"));
    }
    Ok(())
}

fn validate_destinations(config: &Config) -> Result<()> {
    if config.destinations.is_empty() {
        return Err(ConfigError::NoDestinations);
    }

    for (device_type, address) in config.destinations.iter() {
        if device_type
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == ':')
        {
            return Err(ConfigError::invalid_value(
                "destinations",
                device_type,
                "device type must not contain whitespace or ':'",
            ));
        }
        if address.trim().is_empty() {
            return Err(ConfigError::missing_field("destinations", device_type));
        }
    }
    Ok(())
}

fn validate_store(config: &Config) -> Result<()> {
    if config.store.retry_attempts == 0 {
        return Err(ConfigError::invalid_value(
            "store",
            "retry_attempts",
            "must be at least 1",
        ));
    }
    Ok(())
}

fn validate_quality(config: &Config) -> Result<()> {
    let rate = config.quality.max_error_rate;
    // Also rejects NaN
    if !(rate > 0.0 && rate <= 1.0) {
        return Err(ConfigError::invalid_value(
            "quality",
            "max_error_rate",
            format!("must be in (0, 1], got {rate}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Config, ConfigError};

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        Config::from_str(toml)
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(parse("").is_ok());
    }

    #[test]
    fn test_zero_queue_size() {
        let err = parse("[global]\nqueue_size = 0").unwrap_err();
        assert!(err.to_string().contains("queue_size"));
    }

    #[test]
    fn test_zero_parser_workers() {
        let err = parse("[global]\nparser_workers = 0").unwrap_err();
        assert!(err.to_string().contains("parser_workers"));
    }

    #[test]
    fn test_empty_pattern() {
        let err = parse("[source]\npattern = \"  \"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { section: "source", .. }));
    }

    #[test]
    fn test_empty_destinations_table() {
        let err = parse("[destinations]").unwrap_err();
        assert!(matches!(err, ConfigError::NoDestinations));
    }

    #[test]
    fn test_destination_tag_with_colon() {
        let err = parse("[destinations]\n\"id:fa\" = \"127.0.0.1:1\"").unwrap_err();
        assert!(err.to_string().contains("id:fa"));
    }

    #[test]
    fn test_destination_without_address() {
        let err = parse("[destinations]\nidfa = \"\"").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField { section: "destinations", .. }));
    }

    #[test]
    fn test_zero_retry_attempts() {
        let err = parse("[store]\nretry_attempts = 0").unwrap_err();
        assert!(err.to_string().contains("retry_attempts"));
    }

    #[test]
    fn test_error_rate_bounds() {
        for rate in ["0.0", "-0.1", "1.5", "nan"] {
            let err = parse(&format!("[quality]\nmax_error_rate = {rate}")).unwrap_err();
            assert!(err.to_string().contains("max_error_rate"), "rate {rate}");
        }
        assert!(parse("[quality]\nmax_error_rate = 1.0").is_ok());
    }
}
