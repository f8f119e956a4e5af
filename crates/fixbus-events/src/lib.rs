//! Fixbus Events - Fixed-capacity, allocation-free publish/subscribe.
//!
//! This crate provides:
//! - Signal channels (no payload, every listener runs)
//! - Event channels (a `&mut` payload that any listener may consume)
//! - A channel directory mapping marker types to live channels
//! - A subscription resolver that wires declared handlers in and out
//! - An auditor that checks declarations without registering anything
//!
//! # Architecture
//!
//! Channels are identified by zero-sized marker types implementing
//! [`Signal`] or [`Event`]. A [`ChannelDirectory`] is built once with every
//! channel the program uses; each channel reserves its listener storage up
//! front and never grows it.
//!
//! Subscribers declare their handlers in [`Subscriber::declare`]. The
//! [`SubscriptionResolver`] binds those handlers to a live
//! [`SubscriberHandle`] when it becomes active and removes exactly those
//! bindings when it is revoked.
//!
//! # Example
//!
//! ```rust
//! use fixbus_events::prelude::*;
//!
//! struct FrameStarted;
//! impl Signal for FrameStarted {}
//!
//! #[derive(Default)]
//! struct Click { x: i32, y: i32, consumed: bool }
//! impl Consumable for Click {
//!     fn is_consumed(&self) -> bool { self.consumed }
//!     fn set_consumed(&mut self, consumed: bool) { self.consumed = consumed; }
//! }
//!
//! struct Clicked;
//! impl Event for Clicked { type Payload = Click; }
//!
//! #[derive(Default)]
//! struct Button { frames: u32, last_click: Option<(i32, i32)> }
//!
//! impl Button {
//!     fn on_frame(&mut self) { self.frames += 1; }
//!
//!     fn on_click(&mut self, click: &mut Click) {
//!         self.last_click = Some((click.x, click.y));
//!         click.consume();
//!     }
//! }
//!
//! impl Subscriber for Button {
//!     fn declare(table: &mut ListenerTable<Self>) {
//!         table
//!             .on_signal::<FrameStarted, _>(Self::on_frame)
//!             .on_event::<Clicked, _>(Self::on_click);
//!     }
//! }
//!
//! let directory = ChannelDirectory::builder()
//!     .signal::<FrameStarted>()
//!     .event::<Clicked>()
//!     .build()
//!     .unwrap();
//!
//! let mut resolver = SubscriptionResolver::new();
//! let button = SubscriberHandle::new(Button::default());
//! assert!(resolver.resolve(&directory, &button).is_complete());
//!
//! directory.raise::<FrameStarted>().unwrap();
//! let mut click = Click { x: 3, y: 4, consumed: false };
//! directory.publish::<Clicked>(&mut click).unwrap();
//! assert!(click.is_consumed());
//!
//! resolver.revoke(&directory, button.id());
//! assert_eq!(directory.raise::<FrameStarted>(), Ok(0));
//! assert_eq!(button.try_borrow().unwrap().frames, 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod audit;
mod channel;
mod directory;
mod error;
mod listener;
mod payload;
mod resolver;
mod subscriber;

pub use audit::{AuditReport, Auditor};
pub use channel::{
    ChannelKind, ChannelSettings, DEFAULT_CHANNEL_CAPACITY, EventChannel, OverflowPolicy,
    Registered, SignalChannel,
};
pub use directory::{ChannelDirectory, ChannelId, ChannelInfo, DirectoryBuilder};
pub use error::{EventError, EventResult};
pub use listener::{EventListener, HandlerId, ListenerKey, SignalListener, SubscriberId};
pub use payload::{Consumable, Event, Signal};
pub use resolver::{Binding, ResolveFailure, ResolveReport, SubscriptionResolver};
pub use subscriber::{ListenerTable, Subscriber, SubscriberHandle};
