//! Recording listeners and subscribers.

use std::cell::RefCell;
use std::rc::Rc;

use fixbus_events::{
    Consumable, EventListener, ListenerKey, ListenerTable, SignalListener, Subscriber,
};

use crate::fixtures::{ClickData, Clicked, Counted, FrameStarted, TestEventData};

/// Shared, ordered record of listener calls.
///
/// Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Rc<RefCell<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a call.
    pub fn record(&self, call: impl Into<String>) {
        self.calls.borrow_mut().push(call.into());
    }

    /// Every recorded call, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// How many times `call` was recorded.
    #[must_use]
    pub fn count_of(&self, call: &str) -> usize {
        self.calls.borrow().iter().filter(|c| *c == call).count()
    }

    /// Number of recorded calls.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.borrow().len()
    }

    /// Whether nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.borrow().is_empty()
    }

    /// Forget every recorded call.
    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }
}

/// Signal listener that records `tag` when called.
#[must_use]
pub fn signal_listener(log: &CallLog, key: ListenerKey, tag: &'static str) -> SignalListener {
    let log = log.clone();
    SignalListener::new(key, move || log.record(tag))
}

/// Event listener that records `tag` and optionally consumes the payload.
#[must_use]
pub fn event_listener<T: Consumable + 'static>(
    log: &CallLog,
    key: ListenerKey,
    tag: &'static str,
    consume: bool,
) -> EventListener<T> {
    let log = log.clone();
    EventListener::new(key, move |payload: &mut T| {
        log.record(tag);
        if consume {
            payload.consume();
        }
    })
}

/// Subscriber listening on [`FrameStarted`], [`Clicked`] and [`Counted`].
///
/// Each handler records `"<tag>:<channel>"` into the shared log.
#[derive(Debug)]
pub struct Recorder {
    /// Prefix for recorded calls.
    pub tag: &'static str,
    /// Shared call log.
    pub log: CallLog,
    /// Whether `on_click` consumes the click.
    pub consume_clicks: bool,
    /// Frames seen.
    pub frames: u32,
    /// Click positions seen.
    pub clicks: Vec<(i32, i32)>,
}

impl Recorder {
    /// Create a recorder that leaves clicks unconsumed.
    #[must_use]
    pub fn new(tag: &'static str, log: &CallLog) -> Self {
        Self {
            tag,
            log: log.clone(),
            consume_clicks: false,
            frames: 0,
            clicks: Vec::new(),
        }
    }

    /// Consume every click this recorder sees.
    #[must_use]
    pub fn consuming(mut self) -> Self {
        self.consume_clicks = true;
        self
    }

    fn on_frame(&mut self) {
        self.frames = self.frames.saturating_add(1);
        self.log.record(format!("{}:frame", self.tag));
    }

    fn on_click(&mut self, click: &mut ClickData) {
        self.clicks.push((click.x, click.y));
        self.log.record(format!("{}:click", self.tag));
        if self.consume_clicks {
            click.consume();
        }
    }

    fn on_count(&mut self, data: &mut TestEventData) {
        data.count = data.count.saturating_add(1);
        self.log.record(format!("{}:count", self.tag));
    }
}

impl Subscriber for Recorder {
    fn declare(table: &mut ListenerTable<Self>) {
        table
            .on_signal::<FrameStarted, _>(Self::on_frame)
            .on_event::<Clicked, _>(Self::on_click)
            .on_event::<Counted, _>(Self::on_count);
    }
}
