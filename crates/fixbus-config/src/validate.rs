//! Configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::{BusConfig, MAX_CHANNEL_CAPACITY};

/// Log levels accepted in `logging.level`.
const VALID_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Formats accepted in `logging.format`.
const VALID_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

/// Validate a deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &BusConfig) -> ConfigResult<()> {
    validate_channels(config)?;
    validate_logging(config)?;
    Ok(())
}

fn validate_channels(config: &BusConfig) -> ConfigResult<()> {
    check_capacity("channels.capacity", config.channels.capacity)?;

    for (name, o) in &config.channels.overrides {
        if name.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: "channels.overrides".to_owned(),
                message: "channel name must not be empty".to_owned(),
            });
        }
        if let Some(capacity) = o.capacity {
            check_capacity(&format!("channels.overrides.{name}.capacity"), capacity)?;
        }
    }

    Ok(())
}

fn check_capacity(field: &str, capacity: usize) -> ConfigResult<()> {
    if capacity == 0 || capacity > MAX_CHANNEL_CAPACITY {
        return Err(ConfigError::ValidationError {
            field: field.to_owned(),
            message: format!(
                "capacity {capacity} is out of range; must be between 1 and {MAX_CHANNEL_CAPACITY}"
            ),
        });
    }
    Ok(())
}

fn validate_logging(config: &BusConfig) -> ConfigResult<()> {
    if !VALID_LEVELS.contains(&config.logging.level.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.level".to_owned(),
            message: format!(
                "unsupported log level '{}'; expected one of: {}",
                config.logging.level,
                VALID_LEVELS.join(", ")
            ),
        });
    }

    if !VALID_FORMATS.contains(&config.logging.format.as_str()) {
        return Err(ConfigError::ValidationError {
            field: "logging.format".to_owned(),
            message: format!(
                "unsupported log format '{}'; expected one of: {}",
                config.logging.format,
                VALID_FORMATS.join(", ")
            ),
        });
    }

    Ok(())
}
