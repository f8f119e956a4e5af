//! Listener identity and bound callables.

use std::any::TypeId;
use std::fmt;

use uuid::Uuid;

/// Identity of a subscriber object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(Uuid);

impl SubscriberId {
    /// Mint a fresh subscriber ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a handler function.
///
/// Every `fn` item and every non-capturing closure has its own zero-sized
/// Rust type, so for those the type alone names the callable. Handlers whose
/// type can hold different callables (`fn` pointers, capturing closures) are
/// told apart by their slot in the declaring [`ListenerTable`].
///
/// [`ListenerTable`]: crate::ListenerTable
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId {
    type_id: TypeId,
    name: &'static str,
    slot: Option<usize>,
}

impl HandlerId {
    /// Identity of the handler type `F`.
    #[must_use]
    pub fn of<F: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<F>(),
            name: std::any::type_name::<F>(),
            slot: None,
        }
    }

    /// Identity of the handler `value`.
    #[must_use]
    pub fn of_val<F: 'static>(_handler: &F) -> Self {
        Self::of::<F>()
    }

    /// Identity of a handler of type `F` declared at `slot` in a listener
    /// table.
    pub(crate) fn declared<F: 'static>(slot: usize) -> Self {
        let id = Self::of::<F>();
        if std::mem::size_of::<F>() == 0 {
            id
        } else {
            Self {
                slot: Some(slot),
                ..id
            }
        }
    }

    /// Fully qualified type name of the handler, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declaration slot, for handlers whose type does not identify them.
    #[must_use]
    pub fn slot(&self) -> Option<usize> {
        self.slot
    }
}

impl fmt::Debug for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tuple = f.debug_tuple("HandlerId");
        tuple.field(&self.name);
        if let Some(slot) = self.slot {
            tuple.field(&slot);
        }
        tuple.finish()
    }
}

/// Identity of a bound listener: which subscriber, which handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    /// Subscriber the handler is bound to.
    pub subscriber: SubscriberId,
    /// Handler that was bound.
    pub handler: HandlerId,
}

impl ListenerKey {
    /// Create a listener key.
    #[must_use]
    pub fn new(subscriber: SubscriberId, handler: HandlerId) -> Self {
        Self {
            subscriber,
            handler,
        }
    }
}

/// A zero-argument callable registered on a signal channel.
pub struct SignalListener {
    key: ListenerKey,
    callback: Box<dyn Fn()>,
}

impl SignalListener {
    /// Bind `callback` under `key`.
    pub fn new<F>(key: ListenerKey, callback: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self {
            key,
            callback: Box::new(callback),
        }
    }

    /// Identity of this listener.
    #[must_use]
    pub fn key(&self) -> ListenerKey {
        self.key
    }

    pub(crate) fn call(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for SignalListener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalListener")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A callable registered on an event channel, receiving `&mut T`.
pub struct EventListener<T> {
    key: ListenerKey,
    callback: Box<dyn Fn(&mut T)>,
}

impl<T> EventListener<T> {
    /// Bind `callback` under `key`.
    pub fn new<F>(key: ListenerKey, callback: F) -> Self
    where
        F: Fn(&mut T) + 'static,
    {
        Self {
            key,
            callback: Box::new(callback),
        }
    }

    /// Identity of this listener.
    #[must_use]
    pub fn key(&self) -> ListenerKey {
        self.key
    }

    pub(crate) fn call(&self, payload: &mut T) {
        (self.callback)(payload);
    }
}

impl<T> fmt::Debug for EventListener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListener")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first() {}
    fn second() {}

    #[test]
    fn test_handler_ids_distinguish_functions() {
        assert_eq!(HandlerId::of_val(&first), HandlerId::of_val(&first));
        assert_ne!(HandlerId::of_val(&first), HandlerId::of_val(&second));
        assert!(HandlerId::of_val(&first).name().ends_with("first"));
    }

    #[test]
    fn test_handler_ids_distinguish_closures() {
        let a = || {};
        let b = || {};
        assert_ne!(HandlerId::of_val(&a), HandlerId::of_val(&b));
    }

    fn declared_at<F: 'static>(_handler: &F, slot: usize) -> HandlerId {
        HandlerId::declared::<F>(slot)
    }

    #[test]
    fn test_declared_fn_items_ignore_slot() {
        assert_eq!(declared_at(&first, 0), declared_at(&first, 3));
        assert_eq!(declared_at(&first, 3).slot(), None);
        assert_ne!(declared_at(&first, 0), declared_at(&second, 0));
    }

    #[test]
    fn test_declared_fn_pointers_use_slot() {
        assert_ne!(
            HandlerId::declared::<fn()>(0),
            HandlerId::declared::<fn()>(1)
        );
        assert_eq!(HandlerId::declared::<fn()>(1).slot(), Some(1));
        assert_eq!(HandlerId::of::<fn()>().slot(), None);
    }

    #[test]
    fn test_listener_key_equality() {
        let subscriber = SubscriberId::new();
        let handler = HandlerId::of_val(&first);

        assert_eq!(
            ListenerKey::new(subscriber, handler),
            ListenerKey::new(subscriber, handler)
        );
        assert_ne!(
            ListenerKey::new(subscriber, handler),
            ListenerKey::new(SubscriberId::new(), handler)
        );
    }

    #[test]
    fn test_event_listener_mutates_payload() {
        let key = ListenerKey::new(SubscriberId::new(), HandlerId::of::<u8>());
        let listener = EventListener::new(key, |value: &mut u32| *value = value.saturating_add(1));

        let mut value = 41;
        listener.call(&mut value);
        assert_eq!(value, 42);
        assert_eq!(listener.key(), key);
    }
}
