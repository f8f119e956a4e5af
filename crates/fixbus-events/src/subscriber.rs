//! Subscribers and their declared listener tables.
//!
//! A subscriber type lists its handlers once, in
//! [`Subscriber::declare`]. Each entry pairs a channel marker with a
//! handler function. The handler's signature is checked by the compiler
//! against the channel's kind and payload type: a signal handler takes
//! `&mut Self`, an event handler takes `(&mut Self, &mut E::Payload)`.

use std::cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut};
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::channel::Registered;
use crate::directory::{ChannelDirectory, ChannelId};
use crate::error::EventResult;
use crate::listener::{EventListener, HandlerId, ListenerKey, SignalListener, SubscriberId};
use crate::payload::{Event, Signal};

/// A type whose instances listen on channels.
///
/// # Example
///
/// ```rust
/// use fixbus_events::{Consumable, Event, ListenerTable, Signal, Subscriber};
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
/// #[derive(Default)]
/// struct Button { frames: u32, clicks: u32 }
///
/// impl Button {
///     fn on_frame(&mut self) {
///         self.frames += 1;
///     }
///
///     fn on_click(&mut self, click: &mut Click) {
///         self.clicks += 1;
///         click.consume();
///     }
/// }
///
/// impl Subscriber for Button {
///     fn declare(table: &mut ListenerTable<Self>) {
///         table
///             .on_signal::<FrameStarted, _>(Self::on_frame)
///             .on_event::<Clicked, _>(Self::on_click);
///     }
/// }
/// ```
pub trait Subscriber: Sized + 'static {
    /// Declare every handler of this type.
    fn declare(table: &mut ListenerTable<Self>);

    /// Build this type's listener table.
    #[must_use]
    fn listener_table() -> ListenerTable<Self> {
        let mut table = ListenerTable::new();
        Self::declare(&mut table);
        table
    }
}

/// Shared, identifiable handle to a subscriber instance.
///
/// Clones share the same instance and the same [`SubscriberId`]. Bound
/// listeners hold only a weak reference, so dropping every handle turns the
/// subscriber's listeners into no-ops even if it was never revoked.
pub struct SubscriberHandle<S> {
    id: SubscriberId,
    inner: Rc<RefCell<S>>,
}

impl<S> SubscriberHandle<S> {
    /// Wrap `subscriber` under a fresh ID.
    pub fn new(subscriber: S) -> Self {
        Self::with_id(SubscriberId::new(), subscriber)
    }

    /// Wrap `subscriber` under an explicit ID.
    pub fn with_id(id: SubscriberId, subscriber: S) -> Self {
        Self {
            id,
            inner: Rc::new(RefCell::new(subscriber)),
        }
    }

    /// Subscriber ID.
    #[must_use]
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Immutably borrow the subscriber.
    ///
    /// # Errors
    ///
    /// Fails if the subscriber is currently mutably borrowed, e.g. from
    /// inside one of its own handlers.
    pub fn try_borrow(&self) -> Result<Ref<'_, S>, BorrowError> {
        self.inner.try_borrow()
    }

    /// Mutably borrow the subscriber.
    ///
    /// # Errors
    ///
    /// Fails if the subscriber is currently borrowed.
    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, S>, BorrowMutError> {
        self.inner.try_borrow_mut()
    }

    fn downgrade(&self) -> Weak<RefCell<S>> {
        Rc::downgrade(&self.inner)
    }
}

impl<S> Clone for SubscriberHandle<S> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S> fmt::Debug for SubscriberHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberHandle")
            .field("id", &self.id)
            .field("type", &std::any::type_name::<S>())
            .finish()
    }
}

/// Binds one declaration for one subscriber instance and registers it.
type Bind<S> = Box<dyn Fn(&ChannelDirectory, &SubscriberHandle<S>) -> EventResult<Registered>>;

/// Validates one declaration against a directory without registering.
type Check = Box<dyn Fn(&ChannelDirectory) -> EventResult<()>>;

/// One declared handler.
pub(crate) struct Declaration<S> {
    pub(crate) channel: ChannelId,
    pub(crate) handler: HandlerId,
    pub(crate) bind: Bind<S>,
    pub(crate) check: Check,
}

/// The handlers a subscriber type declares, built by [`Subscriber::declare`].
pub struct ListenerTable<S> {
    declarations: Vec<Declaration<S>>,
}

impl<S: 'static> ListenerTable<S> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
        }
    }

    /// Declare `handler` for the signal channel marked by `M`.
    pub fn on_signal<M, F>(&mut self, handler: F) -> &mut Self
    where
        M: Signal,
        F: Fn(&mut S) + Clone + 'static,
    {
        let handler_id = HandlerId::declared::<F>(self.declarations.len());
        self.declarations.push(Declaration {
            channel: ChannelId::signal::<M>(),
            handler: handler_id,
            bind: Box::new(move |directory: &ChannelDirectory, subscriber: &SubscriberHandle<S>| {
                let key = ListenerKey::new(subscriber.id(), handler_id);
                let target = subscriber.downgrade();
                let handler = handler.clone();
                let listener = SignalListener::new(key, move || {
                    with_subscriber(&target, key, M::name(), |s| handler(s));
                });
                directory.register_signal::<M>(listener)
            }),
            check: Box::new(|directory: &ChannelDirectory| directory.check_signal::<M>()),
        });
        self
    }

    /// Declare `handler` for the event channel marked by `E`.
    pub fn on_event<E, F>(&mut self, handler: F) -> &mut Self
    where
        E: Event,
        F: Fn(&mut S, &mut E::Payload) + Clone + 'static,
    {
        let handler_id = HandlerId::declared::<F>(self.declarations.len());
        self.declarations.push(Declaration {
            channel: ChannelId::event::<E>(),
            handler: handler_id,
            bind: Box::new(move |directory: &ChannelDirectory, subscriber: &SubscriberHandle<S>| {
                let key = ListenerKey::new(subscriber.id(), handler_id);
                let target = subscriber.downgrade();
                let handler = handler.clone();
                let listener = EventListener::new(key, move |payload: &mut E::Payload| {
                    with_subscriber(&target, key, E::name(), |s| handler(s, payload));
                });
                directory.register_event::<E>(listener)
            }),
            check: Box::new(|directory: &ChannelDirectory| directory.check_event::<E>()),
        });
        self
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Channel and handler of every declaration, in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = (ChannelId, HandlerId)> + '_ {
        self.declarations.iter().map(|d| (d.channel, d.handler))
    }

    pub(crate) fn declarations(&self) -> &[Declaration<S>] {
        &self.declarations
    }
}

impl<S: 'static> Default for ListenerTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for ListenerTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(
                self.declarations
                    .iter()
                    .map(|d| (d.channel.name(), d.handler.name())),
            )
            .finish()
    }
}

/// Run `f` on the subscriber behind `target`, if it is alive and free.
fn with_subscriber<S>(
    target: &Weak<RefCell<S>>,
    key: ListenerKey,
    channel: &'static str,
    f: impl FnOnce(&mut S),
) {
    let Some(target) = target.upgrade() else {
        return;
    };
    match target.try_borrow_mut() {
        Ok(mut subscriber) => f(&mut *subscriber),
        Err(_) => warn!(
            channel,
            subscriber = %key.subscriber,
            handler = key.handler.name(),
            "Subscriber already borrowed, handler skipped"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::Consumable;

    struct Ping;
    impl Signal for Ping {}

    #[derive(Default)]
    struct Note {
        text: &'static str,
        consumed: bool,
    }

    impl Consumable for Note {
        fn is_consumed(&self) -> bool {
            self.consumed
        }

        fn set_consumed(&mut self, consumed: bool) {
            self.consumed = consumed;
        }
    }

    struct Noted;
    impl Event for Noted {
        type Payload = Note;
    }

    #[derive(Default)]
    struct Journal {
        pings: u32,
        notes: Vec<&'static str>,
    }

    impl Journal {
        fn on_ping(&mut self) {
            self.pings = self.pings.saturating_add(1);
        }

        fn on_note(&mut self, note: &mut Note) {
            self.notes.push(note.text);
        }
    }

    impl Subscriber for Journal {
        fn declare(table: &mut ListenerTable<Self>) {
            table
                .on_signal::<Ping, _>(Self::on_ping)
                .on_event::<Noted, _>(Self::on_note);
        }
    }

    fn directory() -> ChannelDirectory {
        ChannelDirectory::builder()
            .signal::<Ping>()
            .event::<Noted>()
            .build()
            .unwrap()
    }

    #[test]
    fn test_listener_table_entries() {
        let table = Journal::listener_table();
        assert_eq!(table.len(), 2);

        let entries: Vec<_> = table.entries().collect();
        assert_eq!(entries[0].0, ChannelId::signal::<Ping>());
        assert_eq!(entries[1].0, ChannelId::event::<Noted>());
        assert!(entries[0].1.name().ends_with("on_ping"));
        assert!(entries[1].1.name().ends_with("on_note"));
    }

    #[test]
    fn test_bind_registers_and_dispatches_to_instance() {
        let directory = directory();
        let journal = SubscriberHandle::new(Journal::default());

        for declaration in Journal::listener_table().declarations() {
            assert_eq!(
                (declaration.bind)(&directory, &journal).unwrap(),
                Registered::Added
            );
        }

        directory.raise::<Ping>().unwrap();
        directory
            .publish::<Noted>(&mut Note {
                text: "hello",
                consumed: false,
            })
            .unwrap();

        let journal = journal.try_borrow().unwrap();
        assert_eq!(journal.pings, 1);
        assert_eq!(journal.notes, vec!["hello"]);
    }

    #[test]
    fn test_dropped_subscriber_becomes_noop() {
        let directory = directory();
        let journal = SubscriberHandle::new(Journal::default());
        for declaration in Journal::listener_table().declarations() {
            (declaration.bind)(&directory, &journal).unwrap();
        }
        drop(journal);

        // The listener is still registered but finds nothing to call.
        assert_eq!(directory.raise::<Ping>(), Ok(1));
    }

    #[test]
    fn test_borrowed_subscriber_is_skipped() {
        let directory = directory();
        let journal = SubscriberHandle::new(Journal::default());
        for declaration in Journal::listener_table().declarations() {
            (declaration.bind)(&directory, &journal).unwrap();
        }

        {
            let _guard = journal.try_borrow_mut().unwrap();
            directory.raise::<Ping>().unwrap();
        }
        assert_eq!(journal.try_borrow().unwrap().pings, 0);

        directory.raise::<Ping>().unwrap();
        assert_eq!(journal.try_borrow().unwrap().pings, 1);
    }

    #[test]
    fn test_check_reports_missing_channels() {
        let empty = ChannelDirectory::builder().build().unwrap();
        let table = Journal::listener_table();

        for declaration in table.declarations() {
            assert!((declaration.check)(&empty).is_err());
            assert!((declaration.check)(&directory()).is_ok());
        }
    }

    #[test]
    fn test_handle_clones_share_identity() {
        let a = SubscriberHandle::new(Journal::default());
        let b = a.clone();
        assert_eq!(a.id(), b.id());

        b.try_borrow_mut().unwrap().pings = 7;
        assert_eq!(a.try_borrow().unwrap().pings, 7);
    }
}
