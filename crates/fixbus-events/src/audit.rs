//! Startup sweep over subscriber declarations.

use tracing::{debug, warn};

use crate::directory::ChannelDirectory;
use crate::resolver::ResolveFailure;
use crate::subscriber::Subscriber;

/// Result of an [`Auditor`] sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditReport {
    /// Declarations whose channel exists with the right kind.
    pub passed: usize,
    /// Declarations that would fail to bind.
    pub violations: Vec<ResolveFailure>,
}

impl AuditReport {
    /// Whether every audited declaration would bind.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Checks subscriber types against a directory without registering
/// anything.
///
/// Handler shapes and payload types are already enforced by the compiler;
/// what remains to check at runtime is that each declared channel is
/// installed with the expected kind.
///
/// ```rust
/// use fixbus_events::{Auditor, ChannelDirectory, ListenerTable, Signal, Subscriber};
///
/// struct Tick;
/// impl Signal for Tick {}
///
/// struct Clock;
/// impl Clock {
///     fn on_tick(&mut self) {}
/// }
/// impl Subscriber for Clock {
///     fn declare(table: &mut ListenerTable<Self>) {
///         table.on_signal::<Tick, _>(Self::on_tick);
///     }
/// }
///
/// let directory = ChannelDirectory::builder().build().unwrap();
/// let report = Auditor::new(&directory).check::<Clock>().finish();
/// assert_eq!(report.violations.len(), 1);
/// ```
#[derive(Debug)]
pub struct Auditor<'a> {
    directory: &'a ChannelDirectory,
    report: AuditReport,
}

impl<'a> Auditor<'a> {
    /// Start an audit against `directory`.
    #[must_use]
    pub fn new(directory: &'a ChannelDirectory) -> Self {
        Self {
            directory,
            report: AuditReport::default(),
        }
    }

    /// Audit every declaration of `S`.
    #[must_use]
    pub fn check<S: Subscriber>(mut self) -> Self {
        let subscriber = std::any::type_name::<S>();
        let table = S::listener_table();

        for declaration in table.declarations() {
            match (declaration.check)(self.directory) {
                Ok(()) => {
                    debug!(
                        subscriber,
                        handler = declaration.handler.name(),
                        channel = declaration.channel.name(),
                        kind = %declaration.channel.kind(),
                        "Listener declaration valid"
                    );
                    self.report.passed = self.report.passed.saturating_add(1);
                },
                Err(error) => {
                    warn!(
                        subscriber,
                        handler = declaration.handler.name(),
                        channel = declaration.channel.name(),
                        %error,
                        "Listener declaration invalid"
                    );
                    self.report.violations.push(ResolveFailure {
                        subscriber,
                        handler: declaration.handler,
                        channel: declaration.channel,
                        error,
                    });
                },
            }
        }
        self
    }

    /// Finish the audit.
    #[must_use]
    pub fn finish(self) -> AuditReport {
        self.report
    }
}
