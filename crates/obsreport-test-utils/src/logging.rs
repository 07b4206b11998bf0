//! Test log capture.

use tracing_subscriber::EnvFilter;

/// Install a `tracing` subscriber that writes through the test harness, so
/// log lines show up only for failing tests.
///
/// Honors `RUST_LOG`, defaulting to `obsreport=debug`. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_test_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("obsreport=debug"));

    // A subscriber installed by an earlier test is fine.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
