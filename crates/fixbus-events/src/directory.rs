//! Channel directory: the context object mapping channel markers to live
//! channels.
//!
//! A directory is assembled once with a [`DirectoryBuilder`] before any
//! subscriber is wired; its set of channels never changes afterwards. It is
//! passed by reference to publishers and to the
//! [`SubscriptionResolver`](crate::SubscriptionResolver).
//!
//! Each channel sits in its own `RefCell`. Publishing takes a shared borrow,
//! so a listener may publish again (on the same or another channel) while
//! it is being dispatched. Registering or unregistering on a channel that is
//! currently dispatching needs an exclusive borrow and is reported as
//! [`EventError::ChannelBusy`] instead of corrupting the iteration.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::channel::{
    ChannelKind, ChannelSettings, DEFAULT_CHANNEL_CAPACITY, EventChannel, OverflowPolicy,
    Registered, SignalChannel,
};
use crate::error::{EventError, EventResult};
use crate::listener::{EventListener, ListenerKey, SignalListener};
use crate::payload::{Consumable, Event, Signal};

/// Identity of a channel inside a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId {
    type_id: TypeId,
    name: &'static str,
    kind: ChannelKind,
}

impl ChannelId {
    /// Identity of the signal channel marked by `M`.
    #[must_use]
    pub fn signal<M: Signal>() -> Self {
        Self {
            type_id: TypeId::of::<M>(),
            name: M::name(),
            kind: ChannelKind::Signal,
        }
    }

    /// Identity of the event channel marked by `E`.
    #[must_use]
    pub fn event<E: Event>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            name: E::name(),
            kind: ChannelKind::Event,
        }
    }

    /// Channel name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Channel kind the marker was declared with.
    #[must_use]
    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

/// Snapshot of one installed channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    /// Channel name.
    pub name: &'static str,
    /// Channel kind.
    pub kind: ChannelKind,
    /// Payload type name for event channels.
    pub payload: Option<&'static str>,
    /// Live listener count (`None` while the channel is being mutated).
    pub len: Option<usize>,
    /// Fixed capacity.
    pub capacity: usize,
    /// Overflow policy.
    pub overflow: OverflowPolicy,
}

/// Type-erased view of an installed channel.
trait ChannelSlot {
    fn info(&self) -> ChannelInfo;
    fn unregister(&self, key: ListenerKey) -> EventResult<bool>;
    fn as_any(&self) -> &dyn Any;
}

struct SignalSlot {
    channel: RefCell<SignalChannel>,
    name: &'static str,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl ChannelSlot for SignalSlot {
    fn info(&self) -> ChannelInfo {
        ChannelInfo {
            name: self.name,
            kind: ChannelKind::Signal,
            payload: None,
            len: self.channel.try_borrow().ok().map(|c| c.len()),
            capacity: self.capacity,
            overflow: self.overflow,
        }
    }

    fn unregister(&self, key: ListenerKey) -> EventResult<bool> {
        let mut channel = self
            .channel
            .try_borrow_mut()
            .map_err(|_| EventError::ChannelBusy { channel: self.name })?;
        Ok(channel.unregister(key))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

struct EventSlot<T: 'static> {
    channel: RefCell<EventChannel<T>>,
    name: &'static str,
    capacity: usize,
    overflow: OverflowPolicy,
}

impl<T: Consumable + 'static> ChannelSlot for EventSlot<T> {
    fn info(&self) -> ChannelInfo {
        ChannelInfo {
            name: self.name,
            kind: ChannelKind::Event,
            payload: Some(std::any::type_name::<T>()),
            len: self.channel.try_borrow().ok().map(|c| c.len()),
            capacity: self.capacity,
            overflow: self.overflow,
        }
    }

    fn unregister(&self, key: ListenerKey) -> EventResult<bool> {
        let mut channel = self
            .channel
            .try_borrow_mut()
            .map_err(|_| EventError::ChannelBusy { channel: self.name })?;
        Ok(channel.unregister(key))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Deferred channel construction, run once the builder knows its settings.
type Install = Box<dyn FnOnce(ChannelSettings) -> Box<dyn ChannelSlot>>;

struct Pending {
    id: ChannelId,
    capacity: Option<usize>,
    install: Install,
}

/// Builder for a [`ChannelDirectory`].
///
/// Settings are resolved at [`build`](Self::build) time, so the order of
/// builder calls does not matter. A channel's effective settings come from,
/// in order of precedence: an explicit `*_with_capacity` call, a
/// [`channel_settings`](Self::channel_settings) entry for its name, then the
/// builder defaults.
///
/// # Example
///
/// ```rust
/// use fixbus_events::{ChannelDirectory, Consumable, Event, Signal};
///
/// struct FrameStarted;
/// impl Signal for FrameStarted {}
///
/// #[derive(Default)]
/// struct Click { consumed: bool }
/// impl Consumable for Click {
///     fn is_consumed(&self) -> bool { self.consumed }
///     fn set_consumed(&mut self, consumed: bool) { self.consumed = consumed; }
/// }
///
/// struct Clicked;
/// impl Event for Clicked { type Payload = Click; }
///
/// let directory = ChannelDirectory::builder()
///     .default_capacity(8)
///     .signal::<FrameStarted>()
///     .event_with_capacity::<Clicked>(4)
///     .build()
///     .unwrap();
///
/// assert_eq!(directory.len(), 2);
/// assert_eq!(directory.raise::<FrameStarted>(), Ok(0));
/// ```
#[must_use]
pub struct DirectoryBuilder {
    defaults: ChannelSettings,
    named: HashMap<String, ChannelSettings>,
    pending: Vec<Pending>,
}

impl DirectoryBuilder {
    /// Create an empty builder with default settings.
    pub fn new() -> Self {
        Self {
            defaults: ChannelSettings::new(DEFAULT_CHANNEL_CAPACITY),
            named: HashMap::new(),
            pending: Vec::new(),
        }
    }

    /// Capacity for channels without a more specific setting.
    pub fn default_capacity(mut self, capacity: usize) -> Self {
        self.defaults.capacity = capacity;
        self
    }

    /// Overflow policy for channels without a more specific setting.
    pub fn overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.defaults.overflow = overflow;
        self
    }

    /// Settings for the channel called `name`.
    pub fn channel_settings(mut self, name: impl Into<String>, settings: ChannelSettings) -> Self {
        self.named.insert(name.into(), settings);
        self
    }

    /// Install the signal channel marked by `M`.
    pub fn signal<M: Signal>(self) -> Self {
        self.install_signal::<M>(None)
    }

    /// Install the signal channel marked by `M` with a fixed capacity.
    pub fn signal_with_capacity<M: Signal>(self, capacity: usize) -> Self {
        self.install_signal::<M>(Some(capacity))
    }

    /// Install the event channel marked by `E`.
    pub fn event<E: Event>(self) -> Self {
        self.install_event::<E>(None)
    }

    /// Install the event channel marked by `E` with a fixed capacity.
    pub fn event_with_capacity<E: Event>(self, capacity: usize) -> Self {
        self.install_event::<E>(Some(capacity))
    }

    fn install_signal<M: Signal>(mut self, capacity: Option<usize>) -> Self {
        let name = M::name();
        self.pending.push(Pending {
            id: ChannelId::signal::<M>(),
            capacity,
            install: Box::new(move |settings: ChannelSettings| -> Box<dyn ChannelSlot> {
                Box::new(SignalSlot {
                    channel: RefCell::new(SignalChannel::with_settings(name, settings)),
                    name,
                    capacity: settings.capacity,
                    overflow: settings.overflow,
                })
            }),
        });
        self
    }

    fn install_event<E: Event>(mut self, capacity: Option<usize>) -> Self {
        let name = E::name();
        self.pending.push(Pending {
            id: ChannelId::event::<E>(),
            capacity,
            install: Box::new(move |settings: ChannelSettings| -> Box<dyn ChannelSlot> {
                Box::new(EventSlot::<E::Payload> {
                    channel: RefCell::new(EventChannel::with_settings(name, settings)),
                    name,
                    capacity: settings.capacity,
                    overflow: settings.overflow,
                })
            }),
        });
        self
    }

    /// Build the directory.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DuplicateChannel`] if a marker type was
    /// installed more than once.
    pub fn build(self) -> EventResult<ChannelDirectory> {
        let mut slots: HashMap<TypeId, Box<dyn ChannelSlot>> =
            HashMap::with_capacity(self.pending.len());
        let mut order = Vec::with_capacity(self.pending.len());

        for pending in self.pending {
            if slots.contains_key(&pending.id.type_id) {
                return Err(EventError::DuplicateChannel {
                    channel: pending.id.name,
                });
            }

            let mut settings = self
                .named
                .get(pending.id.name)
                .copied()
                .unwrap_or(self.defaults);
            if let Some(capacity) = pending.capacity {
                settings.capacity = capacity;
            }

            debug!(
                channel = pending.id.name,
                kind = %pending.id.kind,
                capacity = settings.capacity,
                "Channel installed"
            );
            slots.insert(pending.id.type_id, (pending.install)(settings));
            order.push(pending.id.type_id);
        }

        Ok(ChannelDirectory { slots, order })
    }
}

impl Default for DirectoryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "config")]
impl DirectoryBuilder {
    /// Seed a builder with the defaults and per-channel overrides of a
    /// [`BusConfig`](fixbus_config::BusConfig).
    pub fn from_config(config: &fixbus_config::BusConfig) -> Self {
        let mut builder = Self::new()
            .default_capacity(config.channels.capacity)
            .overflow(config.channels.overflow.into());

        for name in config.channels.overrides.keys() {
            let resolved = config.settings_for(name);
            builder = builder.channel_settings(
                name.clone(),
                ChannelSettings::new(resolved.capacity).with_overflow(resolved.overflow.into()),
            );
        }
        builder
    }
}

#[cfg(feature = "config")]
impl From<fixbus_config::OverflowMode> for OverflowPolicy {
    fn from(mode: fixbus_config::OverflowMode) -> Self {
        match mode {
            fixbus_config::OverflowMode::Silent => Self::Silent,
            fixbus_config::OverflowMode::Warn => Self::Warn,
            fixbus_config::OverflowMode::Reject => Self::Reject,
        }
    }
}

/// Live channels keyed by marker type.
pub struct ChannelDirectory {
    slots: HashMap<TypeId, Box<dyn ChannelSlot>>,
    order: Vec<TypeId>,
}

impl ChannelDirectory {
    /// Start building a directory.
    pub fn builder() -> DirectoryBuilder {
        DirectoryBuilder::new()
    }

    /// Invoke the signal channel marked by `M`.
    ///
    /// Returns the number of listeners called.
    ///
    /// # Errors
    ///
    /// Fails if the channel is missing, is not a signal channel, or is being
    /// mutated.
    pub fn raise<M: Signal>(&self) -> EventResult<usize> {
        let channel = self.signal_cell::<M>()?;
        let channel = channel
            .try_borrow()
            .map_err(|_| EventError::ChannelBusy { channel: M::name() })?;
        let called = channel.invoke();
        trace!(channel = M::name(), listeners = called, "Signal raised");
        Ok(called)
    }

    /// Invoke the event channel marked by `E` with `payload`.
    ///
    /// The publisher keeps ownership of `payload` and observes every change
    /// listeners made to it, including the consumed flag.
    ///
    /// # Errors
    ///
    /// Fails if the channel is missing, is not an event channel, or is being
    /// mutated.
    pub fn publish<E: Event>(&self, payload: &mut E::Payload) -> EventResult<usize> {
        let channel = self.event_cell::<E>()?;
        let channel = channel
            .try_borrow()
            .map_err(|_| EventError::ChannelBusy { channel: E::name() })?;
        let called = channel.invoke(payload);
        trace!(channel = E::name(), listeners = called, "Event published");
        Ok(called)
    }

    /// Register a listener on the signal channel marked by `M`.
    ///
    /// # Errors
    ///
    /// Fails on lookup errors, when the channel is dispatching, or when the
    /// channel rejects the listener.
    pub fn register_signal<M: Signal>(&self, listener: SignalListener) -> EventResult<Registered> {
        let channel = self.signal_cell::<M>()?;
        let mut channel = channel
            .try_borrow_mut()
            .map_err(|_| EventError::ChannelBusy { channel: M::name() })?;
        channel.register(listener)
    }

    /// Register a listener on the event channel marked by `E`.
    ///
    /// # Errors
    ///
    /// Fails on lookup errors, when the channel is dispatching, or when the
    /// channel rejects the listener.
    pub fn register_event<E: Event>(
        &self,
        listener: EventListener<E::Payload>,
    ) -> EventResult<Registered> {
        let channel = self.event_cell::<E>()?;
        let mut channel = channel
            .try_borrow_mut()
            .map_err(|_| EventError::ChannelBusy { channel: E::name() })?;
        channel.register(listener)
    }

    /// Remove the listener with `key` from the channel identified by `id`.
    ///
    /// # Errors
    ///
    /// Fails if the channel is missing, was installed as the other kind,
    /// or is dispatching.
    pub fn unregister(&self, id: ChannelId, key: ListenerKey) -> EventResult<bool> {
        let slot = self.slot(id.type_id, id.name)?;
        let found = slot.info().kind;
        if found != id.kind {
            return Err(EventError::WrongChannelKind {
                channel: id.name,
                expected: id.kind,
                found,
            });
        }
        slot.unregister(key)
    }

    /// Check that a signal channel is installed for `M`.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingChannel`] or [`EventError::WrongChannelKind`].
    pub fn check_signal<M: Signal>(&self) -> EventResult<()> {
        self.signal_cell::<M>().map(|_| ())
    }

    /// Check that an event channel is installed for `E`.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingChannel`] or [`EventError::WrongChannelKind`].
    pub fn check_event<E: Event>(&self) -> EventResult<()> {
        self.event_cell::<E>().map(|_| ())
    }

    /// Whether a channel is installed for the marker `M`.
    #[must_use]
    pub fn contains<M: 'static>(&self) -> bool {
        self.slots.contains_key(&TypeId::of::<M>())
    }

    /// Snapshot of the channel identified by `id`.
    ///
    /// # Errors
    ///
    /// [`EventError::MissingChannel`] if nothing is installed for `id`.
    pub fn info(&self, id: ChannelId) -> EventResult<ChannelInfo> {
        self.slot(id.type_id, id.name).map(|slot| slot.info())
    }

    /// Snapshots of all channels in installation order.
    pub fn channels(&self) -> impl Iterator<Item = ChannelInfo> + '_ {
        self.order
            .iter()
            .filter_map(|type_id| self.slots.get(type_id))
            .map(|slot| slot.info())
    }

    /// Number of installed channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether no channel is installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn slot(&self, type_id: TypeId, name: &'static str) -> EventResult<&dyn ChannelSlot> {
        self.slots
            .get(&type_id)
            .map(AsRef::as_ref)
            .ok_or(EventError::MissingChannel { channel: name })
    }

    fn signal_cell<M: Signal>(&self) -> EventResult<&RefCell<SignalChannel>> {
        let slot = self.slot(TypeId::of::<M>(), M::name())?;
        slot.as_any()
            .downcast_ref::<SignalSlot>()
            .map(|s| &s.channel)
            .ok_or_else(|| EventError::WrongChannelKind {
                channel: M::name(),
                expected: ChannelKind::Signal,
                found: slot.info().kind,
            })
    }

    fn event_cell<E: Event>(&self) -> EventResult<&RefCell<EventChannel<E::Payload>>> {
        let slot = self.slot(TypeId::of::<E>(), E::name())?;
        slot.as_any()
            .downcast_ref::<EventSlot<E::Payload>>()
            .map(|s| &s.channel)
            .ok_or_else(|| EventError::WrongChannelKind {
                channel: E::name(),
                expected: ChannelKind::Event,
                found: slot.info().kind,
            })
    }
}

impl fmt::Debug for ChannelDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelDirectory")
            .field("channels", &self.channels().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::{HandlerId, SubscriberId};
    use std::rc::Rc;

    struct Tick;
    impl Signal for Tick {}

    struct Unused;
    impl Signal for Unused {}

    #[derive(Debug, Default)]
    struct Score {
        points: u32,
        consumed: bool,
    }

    impl Consumable for Score {
        fn is_consumed(&self) -> bool {
            self.consumed
        }

        fn set_consumed(&mut self, consumed: bool) {
            self.consumed = consumed;
        }
    }

    struct Scored;
    impl Event for Scored {
        type Payload = Score;
    }

    // A marker usable as either kind, to exercise kind mismatches.
    struct Ambiguous;
    impl Signal for Ambiguous {}
    impl Event for Ambiguous {
        type Payload = Score;
    }

    fn key() -> ListenerKey {
        ListenerKey::new(SubscriberId::new(), HandlerId::of::<()>())
    }

    #[test]
    fn test_build_and_lookup() {
        let directory = ChannelDirectory::builder()
            .signal::<Tick>()
            .event::<Scored>()
            .build()
            .unwrap();

        assert_eq!(directory.len(), 2);
        assert!(directory.contains::<Tick>());
        assert!(directory.contains::<Scored>());
        assert!(!directory.contains::<Unused>());
        assert!(directory.check_signal::<Tick>().is_ok());
        assert!(directory.check_event::<Scored>().is_ok());
    }

    #[test]
    fn test_duplicate_marker_is_rejected() {
        let result = ChannelDirectory::builder()
            .signal::<Tick>()
            .signal_with_capacity::<Tick>(2)
            .build();

        assert_eq!(
            result.unwrap_err(),
            EventError::DuplicateChannel { channel: "Tick" }
        );
    }

    #[test]
    fn test_missing_channel() {
        let directory = ChannelDirectory::builder().signal::<Tick>().build().unwrap();

        assert_eq!(
            directory.raise::<Unused>(),
            Err(EventError::MissingChannel { channel: "Unused" })
        );
        assert_eq!(
            directory.publish::<Scored>(&mut Score::default()),
            Err(EventError::MissingChannel { channel: "Scored" })
        );
    }

    #[test]
    fn test_wrong_kind() {
        let directory = ChannelDirectory::builder()
            .signal::<Ambiguous>()
            .build()
            .unwrap();

        assert_eq!(
            directory.check_event::<Ambiguous>(),
            Err(EventError::WrongChannelKind {
                channel: "Ambiguous",
                expected: ChannelKind::Event,
                found: ChannelKind::Signal,
            })
        );
        assert!(directory.check_signal::<Ambiguous>().is_ok());
    }

    #[test]
    fn test_settings_precedence() {
        let directory = ChannelDirectory::builder()
            .default_capacity(8)
            .overflow(OverflowPolicy::Warn)
            .channel_settings(
                "Scored",
                ChannelSettings::new(3).with_overflow(OverflowPolicy::Reject),
            )
            .signal_with_capacity::<Tick>(2)
            .event::<Scored>()
            .signal::<Unused>()
            .build()
            .unwrap();

        let infos: Vec<_> = directory.channels().collect();
        assert_eq!(infos[0].name, "Tick");
        assert_eq!(infos[0].capacity, 2);
        assert_eq!(infos[0].overflow, OverflowPolicy::Warn);
        assert_eq!(infos[1].name, "Scored");
        assert_eq!(infos[1].capacity, 3);
        assert_eq!(infos[1].overflow, OverflowPolicy::Reject);
        assert_eq!(infos[2].capacity, 8);
        assert!(infos[1].payload.unwrap().ends_with("Score"));
    }

    #[test]
    fn test_publish_returns_mutated_payload() {
        let directory = ChannelDirectory::builder().event::<Scored>().build().unwrap();
        directory
            .register_event::<Scored>(EventListener::new(key(), |score: &mut Score| {
                score.points = score.points.saturating_add(10);
                score.consume();
            }))
            .unwrap();

        let mut score = Score::default();
        assert_eq!(directory.publish::<Scored>(&mut score), Ok(1));
        assert_eq!(score.points, 10);
        assert!(score.consumed);
    }

    #[test]
    fn test_register_during_dispatch_is_busy() {
        let directory = Rc::new(ChannelDirectory::builder().signal::<Tick>().build().unwrap());
        let outcome = Rc::new(RefCell::new(None));

        let inner_directory = Rc::downgrade(&directory);
        let inner_outcome = Rc::clone(&outcome);
        directory
            .register_signal::<Tick>(SignalListener::new(key(), move || {
                if let Some(directory) = inner_directory.upgrade() {
                    let result =
                        directory.register_signal::<Tick>(SignalListener::new(key(), || {}));
                    *inner_outcome.borrow_mut() = Some(result);
                }
            }))
            .unwrap();

        directory.raise::<Tick>().unwrap();

        assert_eq!(
            *outcome.borrow(),
            Some(Err(EventError::ChannelBusy { channel: "Tick" }))
        );
        assert_eq!(directory.info(ChannelId::signal::<Tick>()).unwrap().len, Some(1));
    }

    #[test]
    fn test_reentrant_publish_is_allowed() {
        let directory = Rc::new(ChannelDirectory::builder().signal::<Tick>().build().unwrap());
        let depth = Rc::new(RefCell::new(0_u32));

        let inner_directory = Rc::downgrade(&directory);
        let inner_depth = Rc::clone(&depth);
        directory
            .register_signal::<Tick>(SignalListener::new(key(), move || {
                let current = {
                    let mut d = inner_depth.borrow_mut();
                    *d = d.saturating_add(1);
                    *d
                };
                if current < 3 {
                    if let Some(directory) = inner_directory.upgrade() {
                        assert!(directory.raise::<Tick>().is_ok());
                    }
                }
            }))
            .unwrap();

        directory.raise::<Tick>().unwrap();
        assert_eq!(*depth.borrow(), 3);
    }

    #[test]
    fn test_unregister_through_channel_id() {
        let directory = ChannelDirectory::builder().event::<Scored>().build().unwrap();
        let k = key();
        directory
            .register_event::<Scored>(EventListener::new(k, |_: &mut Score| {}))
            .unwrap();

        let id = ChannelId::event::<Scored>();
        assert_eq!(directory.unregister(id, k), Ok(true));
        assert_eq!(directory.unregister(id, k), Ok(false));
        assert_eq!(directory.info(id).unwrap().len, Some(0));
    }

    #[test]
    fn test_unregister_checks_channel_kind() {
        let directory = ChannelDirectory::builder()
            .event::<Ambiguous>()
            .build()
            .unwrap();
        let k = key();
        directory
            .register_event::<Ambiguous>(EventListener::new(k, |_: &mut Score| {}))
            .unwrap();

        assert_eq!(
            directory.unregister(ChannelId::signal::<Ambiguous>(), k),
            Err(EventError::WrongChannelKind {
                channel: "Ambiguous",
                expected: ChannelKind::Signal,
                found: ChannelKind::Event,
            })
        );
        let id = ChannelId::event::<Ambiguous>();
        assert_eq!(directory.info(id).unwrap().len, Some(1));
        assert_eq!(directory.unregister(id, k), Ok(true));
    }
}
