//! Subscription resolver: wires declared handlers into channels and tracks
//! the bindings per subscriber so they can be revoked together.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::channel::Registered;
use crate::directory::{ChannelDirectory, ChannelId};
use crate::error::EventError;
use crate::listener::{HandlerId, ListenerKey, SubscriberId};
use crate::subscriber::{Subscriber, SubscriberHandle};

/// A handler that could not be wired, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    /// Subscriber type name.
    pub subscriber: &'static str,
    /// Handler that was skipped.
    pub handler: HandlerId,
    /// Channel the handler targets.
    pub channel: ChannelId,
    /// Why it was skipped.
    pub error: EventError,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {}: {}",
            self.handler.name(),
            self.subscriber,
            self.error
        )
    }
}

/// Outcome of one [`SubscriptionResolver::resolve`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Handlers newly registered.
    pub bound: usize,
    /// Handlers that were already registered for this subscriber.
    pub duplicates: usize,
    /// Handlers dropped by a full channel's overflow policy.
    pub dropped: usize,
    /// Handlers skipped because of an error.
    pub failures: Vec<ResolveFailure>,
}

impl ResolveReport {
    /// Whether every declared handler is live on its channel.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.dropped == 0 && self.failures.is_empty()
    }
}

/// One recorded (channel, listener) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    /// Channel the listener was registered on.
    pub channel: ChannelId,
    /// Key the listener was registered under.
    pub key: ListenerKey,
}

/// Wires subscribers into a [`ChannelDirectory`] and remembers what it
/// wired.
///
/// The host calls [`resolve`](Self::resolve) when a subscriber becomes
/// active and [`revoke`](Self::revoke) when it becomes inactive. Failures
/// while resolving never abort the wiring of the remaining handlers: each
/// is logged, recorded in the returned [`ResolveReport`], and skipped.
#[derive(Debug, Default)]
pub struct SubscriptionResolver {
    records: HashMap<SubscriberId, Vec<Binding>>,
}

impl SubscriptionResolver {
    /// Create a resolver with no records.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind every handler `S` declares for `subscriber` into `directory`.
    ///
    /// Resolving the same subscriber again without revoking re-registers the
    /// same listener keys; the channels absorb them as duplicates and the
    /// record keeps a single entry per binding.
    pub fn resolve<S: Subscriber>(
        &mut self,
        directory: &ChannelDirectory,
        subscriber: &SubscriberHandle<S>,
    ) -> ResolveReport {
        let subscriber_type = std::any::type_name::<S>();
        let table = S::listener_table();
        let mut report = ResolveReport::default();

        for declaration in table.declarations() {
            let key = ListenerKey::new(subscriber.id(), declaration.handler);

            let outcome = match (declaration.bind)(directory, subscriber) {
                Ok(outcome) => outcome,
                Err(error) => {
                    warn!(
                        subscriber = subscriber_type,
                        handler = declaration.handler.name(),
                        channel = declaration.channel.name(),
                        %error,
                        "Failed to bind event listener"
                    );
                    report.failures.push(ResolveFailure {
                        subscriber: subscriber_type,
                        handler: declaration.handler,
                        channel: declaration.channel,
                        error,
                    });
                    continue;
                },
            };

            match outcome {
                Registered::Added => report.bound = report.bound.saturating_add(1),
                Registered::Duplicate => report.duplicates = report.duplicates.saturating_add(1),
                Registered::Dropped => report.dropped = report.dropped.saturating_add(1),
            }

            let binding = Binding {
                channel: declaration.channel,
                key,
            };
            let record = self.records.entry(subscriber.id()).or_default();
            if !record.contains(&binding) {
                record.push(binding);
            }
            trace!(
                subscriber = subscriber_type,
                handler = declaration.handler.name(),
                channel = declaration.channel.name(),
                ?outcome,
                "Event listener bound"
            );
        }

        debug!(
            subscriber = subscriber_type,
            id = %subscriber.id(),
            bound = report.bound,
            duplicates = report.duplicates,
            dropped = report.dropped,
            failed = report.failures.len(),
            "Subscriber resolved"
        );
        report
    }

    /// Unregister every listener recorded for `subscriber` and forget it.
    ///
    /// Returns the number of listeners actually removed. Revoking a
    /// subscriber without a record does nothing. Bindings that cannot be
    /// removed, e.g. because their channel is dispatching, stay recorded so
    /// a later `revoke` can finish the job.
    pub fn revoke(&mut self, directory: &ChannelDirectory, subscriber: SubscriberId) -> usize {
        let Some(bindings) = self.records.remove(&subscriber) else {
            return 0;
        };
        let total = bindings.len();

        let mut removed: usize = 0;
        let mut retained = Vec::new();
        for binding in bindings {
            match directory.unregister(binding.channel, binding.key) {
                Ok(true) => removed = removed.saturating_add(1),
                Ok(false) => {},
                Err(error) => {
                    warn!(
                        subscriber = %subscriber,
                        handler = binding.key.handler.name(),
                        channel = binding.channel.name(),
                        %error,
                        "Failed to unregister event listener, binding kept"
                    );
                    retained.push(binding);
                },
            }
        }

        debug!(
            subscriber = %subscriber,
            bindings = total,
            removed,
            retained = retained.len(),
            "Subscriber revoked"
        );
        if !retained.is_empty() {
            self.records.insert(subscriber, retained);
        }
        removed
    }

    /// Whether a record exists for `subscriber`.
    #[must_use]
    pub fn is_subscribed(&self, subscriber: SubscriberId) -> bool {
        self.records.contains_key(&subscriber)
    }

    /// Bindings recorded for `subscriber`.
    #[must_use]
    pub fn bindings(&self, subscriber: SubscriberId) -> &[Binding] {
        self.records.get(&subscriber).map_or(&[], Vec::as_slice)
    }

    /// Number of subscribers with a record.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.records.len()
    }
}
