//! Channel with a consumable payload.

use tracing::trace;

use super::{ChannelSettings, OverflowPolicy, Registered, overflow};
use crate::error::EventResult;
use crate::listener::{EventListener, ListenerKey};
use crate::payload::Consumable;

/// Fixed-capacity registry of listeners receiving `&mut T`.
///
/// Dispatch walks from the most recently registered listener to the oldest,
/// so a later listener can intercept a payload before earlier ones see it.
/// Dispatch stops as soon as a listener marks the payload consumed. Removal
/// shifts the following listeners down, keeping their relative order.
#[derive(Debug)]
pub struct EventChannel<T> {
    name: &'static str,
    listeners: Vec<EventListener<T>>,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl<T: Consumable> EventChannel<T> {
    /// Create a channel with room for `capacity` listeners.
    #[must_use]
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self::with_settings(name, ChannelSettings::new(capacity))
    }

    /// Create a channel from explicit settings.
    #[must_use]
    pub fn with_settings(name: &'static str, settings: ChannelSettings) -> Self {
        Self {
            name,
            listeners: Vec::with_capacity(settings.capacity),
            capacity: settings.capacity,
            overflow: settings.overflow,
        }
    }

    /// Register a listener.
    ///
    /// Same rules as [`SignalChannel::register`](super::SignalChannel::register):
    /// duplicates are ignored, a full channel defers to the overflow policy.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::CapacityExhausted`](crate::EventError::CapacityExhausted)
    /// when the channel is full and the policy is
    /// [`OverflowPolicy::Reject`].
    pub fn register(&mut self, listener: EventListener<T>) -> EventResult<Registered> {
        let key = listener.key();
        if self.contains(key) {
            return Ok(Registered::Duplicate);
        }
        if self.is_full() {
            return overflow(self.overflow, self.name, self.capacity);
        }

        self.listeners.push(listener);
        trace!(
            channel = self.name,
            handler = key.handler.name(),
            len = self.listeners.len(),
            "Event listener registered"
        );
        Ok(Registered::Added)
    }

    /// Remove the listener with `key`, shifting later listeners down.
    ///
    /// Returns `true` if a listener was removed.
    pub fn unregister(&mut self, key: ListenerKey) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };

        self.listeners.remove(index);
        trace!(
            channel = self.name,
            handler = key.handler.name(),
            len = self.listeners.len(),
            "Event listener unregistered"
        );
        true
    }

    /// Deliver `payload` to the listeners, newest first.
    ///
    /// Stops after the first listener that leaves the payload consumed. A
    /// payload that arrives already consumed still reaches the newest
    /// listener, which may clear the flag.
    ///
    /// Returns the number of listeners called.
    pub fn invoke(&self, payload: &mut T) -> usize {
        let mut called: usize = 0;
        for listener in self.listeners.iter().rev() {
            listener.call(payload);
            called = called.saturating_add(1);
            if payload.is_consumed() {
                break;
            }
        }
        called
    }

    /// Whether a listener with `key` is registered.
    #[must_use]
    pub fn contains(&self, key: ListenerKey) -> bool {
        self.position(key).is_some()
    }

    /// Keys of the live listeners in slot (registration) order.
    pub fn keys(&self) -> impl Iterator<Item = ListenerKey> + '_ {
        self.listeners.iter().map(EventListener::key)
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Number of live listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the channel has no free slot.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.listeners.len() >= self.capacity
    }

    /// Overflow policy applied when full.
    #[must_use]
    pub fn overflow_policy(&self) -> OverflowPolicy {
        self.overflow
    }

    fn position(&self, key: ListenerKey) -> Option<usize> {
        self.listeners.iter().position(|l| l.key() == key)
    }
}
