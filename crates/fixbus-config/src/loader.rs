//! Configuration file loading.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info};

use crate::env;
use crate::error::{ConfigError, ConfigResult};
use crate::types::BusConfig;
use crate::validate;

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Parse and validate configuration from a TOML string.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the input is malformed or fails validation.
pub fn from_toml_str(content: &str) -> ConfigResult<BusConfig> {
    let config: BusConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: "<string>".to_owned(),
        source: e,
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Load a config from a specific file path, without env overrides.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, is too large,
/// cannot be parsed, or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<BusConfig> {
    let config = read_file(path)?.ok_or_else(|| ConfigError::ReadError {
        path: path.display().to_string(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Load configuration: optional file, then environment overrides, then
/// validation.
///
/// A missing file is not an error; defaults are used instead.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable or malformed, an
/// environment variable is invalid, or the result fails validation.
pub fn load(path: Option<&Path>) -> ConfigResult<BusConfig> {
    let mut config = match path {
        Some(path) => read_file(path)?.unwrap_or_default(),
        None => BusConfig::default(),
    };

    env::apply_env_overrides(&mut config)?;
    validate::validate(&config)?;

    info!(
        capacity = config.channels.capacity,
        overflow = %config.channels.overflow,
        overrides = config.channels.overrides.len(),
        "Bus configuration loaded"
    );
    Ok(config)
}

/// Read and parse `path`, returning `None` if it does not exist.
///
/// The size limit is checked on the opened handle before reading, and the
/// read itself is capped in case the file grows in between.
fn read_file(path: &Path) -> ConfigResult<Option<BusConfig>> {
    let read_error = |source: std::io::Error| ConfigError::ReadError {
        path: path.display().to_string(),
        source,
    };

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => return Err(read_error(e)),
    };

    let size = file.metadata().map_err(read_error)?.len();
    if size > MAX_CONFIG_FILE_SIZE {
        return Err(too_large(path, size));
    }

    let mut content = String::new();
    file.take(MAX_CONFIG_FILE_SIZE.saturating_add(1))
        .read_to_string(&mut content)
        .map_err(read_error)?;
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(too_large(path, content.len() as u64));
    }

    let config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(config))
}

fn too_large(path: &Path, size: u64) -> ConfigError {
    ConfigError::ValidationError {
        field: path.display().to_string(),
        message: format!(
            "config file is {size} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit"
        ),
    }
}
