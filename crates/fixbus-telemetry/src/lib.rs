//! Fixbus Telemetry - Logging setup for fixbus hosts.
//!
//! Every fixbus crate emits structured `tracing` events (`channel`,
//! `subscriber`, `handler`, `capacity`, `len` fields). This crate installs a
//! subscriber that renders them.
//!
//! # Example
//!
//! ```rust,no_run
//! use fixbus_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), fixbus_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("fixbus_events=trace");
//!
//! setup_logging(&config)?;
//! tracing::info!("Logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{
    LOG_FILE_PREFIX, LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging,
};
