//! Fixed-capacity listener registries.
//!
//! Both channel kinds pre-allocate storage for `capacity` listeners at
//! construction and never grow it, so neither registration nor dispatch
//! allocates once a channel exists.
//!
//! The two kinds deliberately differ:
//!
//! | | [`SignalChannel`] | [`EventChannel`] |
//! |---|---|---|
//! | payload | none | `&mut T` |
//! | dispatch order | oldest first | newest first |
//! | short-circuit | never | when the payload is consumed |
//! | unregister | swap with last (order not kept) | shift left (order kept) |

use std::fmt;

use tracing::warn;

use crate::error::{EventError, EventResult};

mod event;
mod signal;

pub use event::EventChannel;
pub use signal::SignalChannel;

/// Default capacity for channels built without an explicit capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// What a channel does when asked to register a listener while full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OverflowPolicy {
    /// Drop the registration without any diagnostic.
    #[default]
    Silent,
    /// Drop the registration and emit a warning.
    Warn,
    /// Refuse the registration with [`EventError::CapacityExhausted`].
    Reject,
}

/// Outcome of a successful `register` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registered {
    /// The listener was appended.
    Added,
    /// A listener with the same key was already present; nothing changed.
    Duplicate,
    /// The channel was full and the overflow policy dropped the listener.
    Dropped,
}

/// The two channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// No payload, every listener runs.
    Signal,
    /// Typed payload, newest listener first, stops when consumed.
    Event,
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal => f.write_str("signal"),
            Self::Event => f.write_str("event"),
        }
    }
}

/// Construction-time settings for a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelSettings {
    /// Maximum number of live listeners.
    pub capacity: usize,
    /// Behaviour when registering on a full channel.
    pub overflow: OverflowPolicy,
}

impl ChannelSettings {
    /// Settings with the given capacity and the default overflow policy.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            overflow: OverflowPolicy::default(),
        }
    }

    /// Set the overflow policy.
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

/// Apply `policy` to a registration that found the channel full.
fn overflow(
    policy: OverflowPolicy,
    channel: &'static str,
    capacity: usize,
) -> EventResult<Registered> {
    match policy {
        OverflowPolicy::Silent => Ok(Registered::Dropped),
        OverflowPolicy::Warn => {
            warn!(channel, capacity, "Channel full, listener dropped");
            Ok(Registered::Dropped)
        },
        OverflowPolicy::Reject => Err(EventError::CapacityExhausted { channel, capacity }),
    }
}
