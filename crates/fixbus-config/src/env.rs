//! Environment variable overrides.
//!
//! Variables are applied on top of whatever the file set.

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::{BusConfig, OverflowMode};

/// Overrides `channels.capacity`.
pub const CHANNEL_CAPACITY_VAR: &str = "FIXBUS_CHANNEL_CAPACITY";
/// Overrides `channels.overflow`.
pub const OVERFLOW_VAR: &str = "FIXBUS_OVERFLOW";
/// Overrides `logging.level`.
pub const LOG_LEVEL_VAR: &str = "FIXBUS_LOG_LEVEL";

/// Apply overrides from the process environment.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a variable is set to an unparsable
/// value.
pub fn apply_env_overrides(config: &mut BusConfig) -> ConfigResult<()> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`.
///
/// Empty values are ignored.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a variable is set to an unparsable
/// value.
pub fn apply_overrides<F>(config: &mut BusConfig, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(raw) = get(CHANNEL_CAPACITY_VAR) {
        config.channels.capacity = raw.trim().parse().map_err(|e| ConfigError::EnvError {
            var_name: CHANNEL_CAPACITY_VAR.to_owned(),
            message: format!("invalid capacity '{raw}': {e}"),
        })?;
        debug!(var = CHANNEL_CAPACITY_VAR, "applied env override");
    }

    if let Some(raw) = get(OVERFLOW_VAR) {
        config.channels.overflow =
            raw.parse::<OverflowMode>()
                .map_err(|message| ConfigError::EnvError {
                    var_name: OVERFLOW_VAR.to_owned(),
                    message,
                })?;
        debug!(var = OVERFLOW_VAR, "applied env override");
    }

    if let Some(raw) = get(LOG_LEVEL_VAR) {
        config.logging.level = raw.trim().to_ascii_lowercase();
        debug!(var = LOG_LEVEL_VAR, "applied env override");
    }

    Ok(())
}
