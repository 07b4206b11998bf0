//! Receiver instrumentation error types.
//!
//! Only construction can fail. Per-operation problems (non-recording spans,
//! missing recorders) are absorbed and never reach the data path.

use opentelemetry::metrics::MetricsError;
use thiserror::Error;

/// A counter that could not be created, with the reason reported by the meter.
#[derive(Debug)]
pub struct InstrumentFailure {
    /// Metric name of the instrument.
    pub name: &'static str,
    /// Error returned by the meter.
    pub error: MetricsError,
}

/// Obsreport error type.
#[derive(Debug, Error)]
pub enum ObsReportError {
    /// One or more receiver counters could not be created.
    ///
    /// Carries every non-tolerated failure, not just the first.
    #[error("failed to create {} receiver instrument(s): {}", .0.len(), format_failures(.0))]
    InstrumentCreation(Vec<InstrumentFailure>),
}

fn format_failures(failures: &[InstrumentFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}: {}", f.name, f.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type alias using `ObsReportError`
pub type Result<T> = std::result::Result<T, ObsReportError>;
