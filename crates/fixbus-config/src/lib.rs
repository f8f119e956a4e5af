#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
//! Configuration for fixbus channel directories and logging.
//!
//! # Usage
//!
//! ```rust
//! use fixbus_config::{BusConfig, OverflowMode};
//!
//! let config = BusConfig::from_toml_str(
//!     r#"
//!     [channels]
//!     capacity = 8
//!
//!     [channels.overrides.Click]
//!     capacity = 2
//!     overflow = "reject"
//!     "#,
//! )
//! .unwrap();
//!
//! let click = config.settings_for("Click");
//! assert_eq!(click.capacity, 2);
//! assert_eq!(click.overflow, OverflowMode::Reject);
//! assert_eq!(config.settings_for("Tick").capacity, 8);
//! ```
//!
//! # Precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`FIXBUS_CHANNEL_CAPACITY`,
//!    `FIXBUS_OVERFLOW`, `FIXBUS_LOG_LEVEL`)
//! 2. **Config file**, if present
//! 3. **Built-in defaults**
//!
//! This crate has no dependencies on other internal fixbus crates; the
//! conversion into channel settings lives behind the `config` feature of
//! `fixbus-events`.

/// Environment variable overrides.
pub mod env;
/// Configuration error types.
pub mod error;
/// Configuration file loading.
pub mod loader;
/// Configuration struct definitions.
pub mod types;
/// Configuration validation rules.
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use types::*;

impl BusConfig {
    /// Parse and validate configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the input is malformed or invalid.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        loader::from_toml_str(content)
    }

    /// Load and validate a single config file, without env overrides.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read, parsed or
    /// validated.
    pub fn load_file(path: &std::path::Path) -> ConfigResult<Self> {
        loader::load_file(path)
    }

    /// Load configuration from an optional file plus environment overrides.
    ///
    /// See [`loader::load`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file is malformed, an environment
    /// variable is invalid, or the result fails validation.
    pub fn load(path: Option<&std::path::Path>) -> ConfigResult<Self> {
        loader::load(path)
    }

    /// Validate this configuration.
    ///
    /// # Errors
    ///
    /// Returns the first validation error found.
    pub fn validate(&self) -> ConfigResult<()> {
        validate::validate(self)
    }
}
