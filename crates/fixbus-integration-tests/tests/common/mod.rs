//! Shared harness for integration tests.

use fixbus_events::{ChannelDirectory, SubscriberHandle, SubscriptionResolver};
use fixbus_test::{CallLog, Recorder, init_test_logging, test_directory_with_capacity};

/// A directory, a resolver and a shared call log wired together.
#[allow(dead_code)]
pub struct BusHarness {
    /// Fixture channels.
    pub directory: ChannelDirectory,
    /// Resolver under test.
    pub resolver: SubscriptionResolver,
    /// Log shared by every recorder this harness creates.
    pub log: CallLog,
}

#[allow(dead_code)]
impl BusHarness {
    /// Harness whose channels each hold `capacity` listeners.
    pub fn new(capacity: usize) -> Self {
        init_test_logging();
        Self {
            directory: test_directory_with_capacity(capacity),
            resolver: SubscriptionResolver::new(),
            log: CallLog::new(),
        }
    }

    /// Create a recorder tagged `tag` and resolve it.
    pub fn activate(&mut self, tag: &'static str) -> SubscriberHandle<Recorder> {
        self.activate_recorder(Recorder::new(tag, &self.log))
    }

    /// Resolve an already configured recorder.
    pub fn activate_recorder(&mut self, recorder: Recorder) -> SubscriberHandle<Recorder> {
        let handle = SubscriberHandle::new(recorder);
        let report = self.resolver.resolve(&self.directory, &handle);
        assert!(report.is_complete(), "resolve failed: {report:?}");
        handle
    }
}
