//! Prelude module - commonly used test helpers.
//!
//! Use `use fixbus_test::prelude::*;` in test modules.

pub use crate::fixtures::{
    ClickData, Clicked, Counted, FrameStarted, TestEventData, Tick, click, test_directory,
    test_directory_with_capacity, test_listener_key, test_subscriber_id,
};
pub use crate::logging::init_test_logging;
pub use crate::mocks::{CallLog, Recorder, event_listener, signal_listener};
