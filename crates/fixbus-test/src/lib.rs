//! Fixbus Test - Shared test utilities for fixbus.
//!
//! Sample channel markers and payloads, a call recorder, and a logging
//! initializer for tests.
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! fixbus-test.workspace = true
//! ```
//!
//! ```rust
//! use fixbus_test::{CallLog, FrameStarted, signal_listener, test_directory, test_listener_key};
//!
//! let directory = test_directory();
//! let log = CallLog::new();
//! directory
//!     .register_signal::<FrameStarted>(signal_listener(&log, test_listener_key(), "a"))
//!     .unwrap();
//!
//! directory.raise::<FrameStarted>().unwrap();
//! assert_eq!(log.entries(), vec!["a"]);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod prelude;

pub mod fixtures;
pub mod logging;
pub mod mocks;

pub use fixtures::*;
pub use logging::*;
pub use mocks::*;
