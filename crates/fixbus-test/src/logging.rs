//! Test logging.

use tracing_subscriber::EnvFilter;

/// Route `tracing` output through the test harness's captured writer.
///
/// Honors `RUST_LOG`; defaults to `fixbus_events=trace`. Safe to call from
/// every test: only the first call installs a subscriber.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("fixbus_events=trace"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
