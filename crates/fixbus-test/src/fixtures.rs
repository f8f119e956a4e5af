//! Sample channel markers, payloads and directories.

use uuid::Uuid;

use fixbus_events::{
    ChannelDirectory, Consumable, Event, HandlerId, ListenerKey, Signal, SubscriberId,
};

/// Signal raised once per frame.
#[derive(Debug)]
pub struct FrameStarted;
impl Signal for FrameStarted {}

/// Second signal channel, for tests that need two.
#[derive(Debug)]
pub struct Tick;
impl Signal for Tick {}

/// Pointer click payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickData {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
    /// Set once a listener claims the click.
    pub consumed: bool,
}

impl Consumable for ClickData {
    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn set_consumed(&mut self, consumed: bool) {
        self.consumed = consumed;
    }
}

/// Event channel carrying [`ClickData`].
#[derive(Debug)]
pub struct Clicked;
impl Event for Clicked {
    type Payload = ClickData;
}

/// Payload that listeners accumulate into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestEventData {
    /// Number of listeners that saw the payload.
    pub count: u32,
    /// Free-form value listeners may rewrite.
    pub value: i64,
    /// Set once a listener claims the payload.
    pub consumed: bool,
}

impl Consumable for TestEventData {
    fn is_consumed(&self) -> bool {
        self.consumed
    }

    fn set_consumed(&mut self, consumed: bool) {
        self.consumed = consumed;
    }
}

/// Event channel carrying [`TestEventData`].
#[derive(Debug)]
pub struct Counted;
impl Event for Counted {
    type Payload = TestEventData;
}

/// An unconsumed click at `(x, y)`.
#[must_use]
pub fn click(x: i32, y: i32) -> ClickData {
    ClickData {
        x,
        y,
        consumed: false,
    }
}

/// Create a test subscriber ID.
#[must_use]
pub fn test_subscriber_id() -> SubscriberId {
    SubscriberId::new()
}

/// Create a test subscriber ID with a specific UUID.
#[must_use]
pub fn test_subscriber_id_from(uuid: Uuid) -> SubscriberId {
    SubscriberId::from_uuid(uuid)
}

/// A listener key unique to this call.
#[must_use]
pub fn test_listener_key() -> ListenerKey {
    ListenerKey::new(test_subscriber_id(), HandlerId::of::<ListenerKey>())
}

/// Directory with [`FrameStarted`], [`Tick`], [`Clicked`] and [`Counted`]
/// at the default capacity.
///
/// # Panics
///
/// Panics if the directory fails to build.
#[must_use]
pub fn test_directory() -> ChannelDirectory {
    fixture_builder()
        .build()
        .unwrap_or_else(|e| panic!("fixture directory: {e}"))
}

/// Same channels as [`test_directory`], each with room for `capacity`
/// listeners.
///
/// # Panics
///
/// Panics if the directory fails to build.
#[must_use]
pub fn test_directory_with_capacity(capacity: usize) -> ChannelDirectory {
    fixture_builder()
        .default_capacity(capacity)
        .build()
        .unwrap_or_else(|e| panic!("fixture directory: {e}"))
}

fn fixture_builder() -> fixbus_events::DirectoryBuilder {
    ChannelDirectory::builder()
        .signal::<FrameStarted>()
        .signal::<Tick>()
        .event::<Clicked>()
        .event::<Counted>()
}
