//! Channel without payload.

use tracing::trace;

use super::{ChannelSettings, OverflowPolicy, Registered, overflow};
use crate::error::EventResult;
use crate::listener::{ListenerKey, SignalListener};

/// Fixed-capacity registry of zero-argument listeners.
///
/// Listeners run in registration order and every listener runs on each
/// [`invoke`](Self::invoke). Removal swaps the last listener into the freed
/// slot, so the order of the remaining listeners may change after an
/// [`unregister`](Self::unregister).
///
/// A listener cannot register or unregister on the channel that is
/// dispatching it: both take `&mut self` while `invoke` holds `&self`.
#[derive(Debug)]
pub struct SignalChannel {
    name: &'static str,
    listeners: Vec<SignalListener>,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl SignalChannel {
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
    /// A listener whose key is already present is ignored. On a full channel
    /// the overflow policy decides between dropping and rejecting.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::CapacityExhausted`](crate::EventError::CapacityExhausted)
    /// when the channel is full and the policy is
    /// [`OverflowPolicy::Reject`].
    pub fn register(&mut self, listener: SignalListener) -> EventResult<Registered> {
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
            "Signal listener registered"
        );
        Ok(Registered::Added)
    }

    /// Remove the listener with `key`, filling its slot from the tail.
    ///
    /// Returns `true` if a listener was removed.
    pub fn unregister(&mut self, key: ListenerKey) -> bool {
        let Some(index) = self.position(key) else {
            return false;
        };

        self.listeners.swap_remove(index);
        trace!(
            channel = self.name,
            handler = key.handler.name(),
            len = self.listeners.len(),
            "Signal listener unregistered"
        );
        true
    }

    /// Call every listener, oldest slot first.
    ///
    /// Returns the number of listeners called.
    pub fn invoke(&self) -> usize {
        for listener in &self.listeners {
            listener.call();
        }
        self.listeners.len()
    }

    /// Whether a listener with `key` is registered.
    #[must_use]
    pub fn contains(&self, key: ListenerKey) -> bool {
        self.position(key).is_some()
    }

    /// Keys of the live listeners in slot order.
    pub fn keys(&self) -> impl Iterator<Item = ListenerKey> + '_ {
        self.listeners.iter().map(SignalListener::key)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EventError;
    use crate::listener::{HandlerId, SubscriberId};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn handler() {}

    fn key() -> ListenerKey {
        ListenerKey::new(SubscriberId::new(), HandlerId::of_val(&handler))
    }

    fn recording(
        log: &Rc<RefCell<Vec<&'static str>>>,
        key: ListenerKey,
        tag: &'static str,
    ) -> SignalListener {
        let log = Rc::clone(log);
        SignalListener::new(key, move || log.borrow_mut().push(tag))
    }

    #[test]
    fn test_invoke_runs_all_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 3);

        channel.register(recording(&log, key(), "h1")).unwrap();
        channel.register(recording(&log, key(), "h2")).unwrap();
        channel.register(recording(&log, key(), "h3")).unwrap();

        assert_eq!(channel.invoke(), 3);
        assert_eq!(*log.borrow(), vec!["h1", "h2", "h3"]);
    }

    #[test]
    fn test_duplicate_key_is_ignored() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 4);
        let k = key();

        assert_eq!(
            channel.register(recording(&log, k, "first")).unwrap(),
            Registered::Added
        );
        assert_eq!(
            channel.register(recording(&log, k, "second")).unwrap(),
            Registered::Duplicate
        );
        assert_eq!(channel.len(), 1);

        channel.invoke();
        assert_eq!(*log.borrow(), vec!["first"]);
    }

    #[test]
    fn test_full_channel_drops_silently_by_default() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 2);

        channel.register(recording(&log, key(), "a")).unwrap();
        channel.register(recording(&log, key(), "b")).unwrap();
        let outcome = channel.register(recording(&log, key(), "c")).unwrap();

        assert_eq!(outcome, Registered::Dropped);
        assert_eq!(channel.len(), 2);
        assert!(channel.is_full());
    }

    #[test]
    fn test_full_channel_rejects_under_reject_policy() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let settings = ChannelSettings::new(1).with_overflow(OverflowPolicy::Reject);
        let mut channel = SignalChannel::with_settings("Tick", settings);

        channel.register(recording(&log, key(), "a")).unwrap();
        let err = channel.register(recording(&log, key(), "b")).unwrap_err();

        assert_eq!(
            err,
            EventError::CapacityExhausted {
                channel: "Tick",
                capacity: 1
            }
        );
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_full_channel_warn_policy_still_drops() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let settings = ChannelSettings::new(1).with_overflow(OverflowPolicy::Warn);
        let mut channel = SignalChannel::with_settings("Tick", settings);

        channel.register(recording(&log, key(), "a")).unwrap();
        assert_eq!(
            channel.register(recording(&log, key(), "b")).unwrap(),
            Registered::Dropped
        );
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_unregister_swaps_last_into_freed_slot() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 4);
        let (k1, k2, k3, k4) = (key(), key(), key(), key());

        channel.register(recording(&log, k1, "h1")).unwrap();
        channel.register(recording(&log, k2, "h2")).unwrap();
        channel.register(recording(&log, k3, "h3")).unwrap();
        channel.register(recording(&log, k4, "h4")).unwrap();

        assert!(channel.unregister(k2));
        assert_eq!(channel.keys().collect::<Vec<_>>(), vec![k1, k4, k3]);

        channel.invoke();
        assert_eq!(*log.borrow(), vec!["h1", "h4", "h3"]);
    }

    #[test]
    fn test_unregister_unknown_key_is_noop() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 2);
        channel.register(recording(&log, key(), "a")).unwrap();

        assert!(!channel.unregister(key()));
        assert_eq!(channel.len(), 1);
    }

    #[test]
    fn test_freed_slot_can_be_reused() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut channel = SignalChannel::new("Tick", 1);
        let k = key();

        channel.register(recording(&log, k, "a")).unwrap();
        channel.unregister(k);
        assert!(channel.is_empty());

        assert_eq!(
            channel.register(recording(&log, key(), "b")).unwrap(),
            Registered::Added
        );
        assert_eq!(channel.capacity(), 1);
    }
}
