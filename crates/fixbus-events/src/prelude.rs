//! Prelude module - commonly used types for convenient import.
//!
//! Use `use fixbus_events::prelude::*;` to import all essential types.

// Markers and payloads
pub use crate::{Consumable, Event, Signal};

// Directory
pub use crate::{ChannelDirectory, ChannelSettings, OverflowPolicy};

// Subscribers
pub use crate::{ListenerTable, Subscriber, SubscriberHandle, SubscriberId};

// Wiring
pub use crate::{Auditor, ResolveReport, SubscriptionResolver};

// Errors
pub use crate::{EventError, EventResult};
