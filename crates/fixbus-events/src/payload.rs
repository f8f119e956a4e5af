//! Payload capability and channel marker traits.
//!
//! Channels are identified by zero-sized marker types. A marker implements
//! [`Signal`] for a channel without payload, or [`Event`] for a channel that
//! delivers a [`Consumable`] payload by mutable reference.

/// A payload that a listener can claim by marking it consumed.
///
/// Once a listener sets the flag, an event channel stops delivering the
/// payload to the remaining (earlier-registered) listeners.
///
/// # Example
///
/// ```rust
/// use fixbus_events::Consumable;
///
/// #[derive(Debug, Default)]
/// struct Click {
///     x: i32,
///     y: i32,
///     consumed: bool,
/// }
///
/// impl Consumable for Click {
///     fn is_consumed(&self) -> bool {
///         self.consumed
///     }
///
///     fn set_consumed(&mut self, consumed: bool) {
///         self.consumed = consumed;
///     }
/// }
///
/// let mut click = Click::default();
/// click.consume();
/// assert!(click.is_consumed());
/// ```
pub trait Consumable {
    /// Whether a listener has claimed this payload.
    fn is_consumed(&self) -> bool;

    /// Set or clear the consumed flag.
    fn set_consumed(&mut self, consumed: bool);

    /// Claim the payload, halting further delivery.
    fn consume(&mut self) {
        self.set_consumed(true);
    }
}

/// Marker for a channel that carries no payload.
pub trait Signal: 'static {
    /// Channel name used in diagnostics and configuration lookups.
    ///
    /// Defaults to the marker's unqualified type name.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

/// Marker for a channel that delivers a typed payload.
pub trait Event: 'static {
    /// Payload handed to every listener as `&mut Self::Payload`.
    type Payload: Consumable + 'static;

    /// Channel name used in diagnostics and configuration lookups.
    ///
    /// Defaults to the marker's unqualified type name.
    fn name() -> &'static str {
        short_type_name::<Self>()
    }
}

/// Last path segment of a type name (`app::events::Click` -> `Click`).
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    // Generic arguments may contain `::`; only strip the outer path.
    let head = full.split('<').next().unwrap_or(full);
    head.rsplit("::").next().unwrap_or(head)
}
