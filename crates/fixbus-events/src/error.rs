//! Event bus error types.

use thiserror::Error;

use crate::channel::ChannelKind;

/// Errors reported by channels, the channel directory and the resolver.
///
/// None of these abort the host: the resolver logs them and moves on to the
/// next handler, and the directory hands them back to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// The declared channel is not installed in the directory.
    #[error("channel '{channel}' is not installed in the directory")]
    MissingChannel {
        /// Name of the requested channel.
        channel: &'static str,
    },

    /// A directory entry exists for the marker type but has the other kind.
    #[error("channel '{channel}' is a {found} channel, expected {expected}")]
    WrongChannelKind {
        /// Name of the requested channel.
        channel: &'static str,
        /// Kind the caller asked for.
        expected: ChannelKind,
        /// Kind actually installed.
        found: ChannelKind,
    },

    /// Registration on a full channel under [`OverflowPolicy::Reject`].
    ///
    /// [`OverflowPolicy::Reject`]: crate::OverflowPolicy::Reject
    #[error("channel '{channel}' is full ({capacity} listeners)")]
    CapacityExhausted {
        /// Name of the full channel.
        channel: &'static str,
        /// Fixed capacity of the channel.
        capacity: usize,
    },

    /// The same marker type was installed twice while building a directory.
    #[error("channel '{channel}' is installed more than once")]
    DuplicateChannel {
        /// Name of the duplicated channel.
        channel: &'static str,
    },

    /// The channel is borrowed by an in-flight dispatch or mutation.
    #[error("channel '{channel}' is busy (modified during dispatch)")]
    ChannelBusy {
        /// Name of the busy channel.
        channel: &'static str,
    },
}

/// Result type for event bus operations.
pub type EventResult<T> = Result<T, EventError>;
