//! Accepted/refused item counting with two interchangeable backends.
//!
//! The backend is fixed when a receiver is built and never re-decided per
//! operation:
//!
//! - **Legacy**: dimensional series in the `metrics` facade, labelled with
//!   the operation's [`TagSet`].
//! - **Otel**: six OpenTelemetry counters created up front, recorded with
//!   the receiver's fixed attribute set.

pub mod legacy;
pub mod otel;

pub use legacy::{describe_legacy_metrics, TagSet};
pub use otel::{CounterPair, InstrumentOutcome, ReceiverCounters};

use common::config::MetricsBackend;
use common::types::DataType;
use opentelemetry::KeyValue;

/// Routes one operation's counts to the backend chosen at construction.
#[derive(Debug, Clone)]
pub enum MetricsRecorder {
    /// Series in the `metrics` facade, labelled per operation.
    Legacy,
    /// OpenTelemetry counters created up front.
    Otel {
        /// The six accepted/refused counters.
        counters: ReceiverCounters,
        /// `receiver` and `transport` attributes added to every recording.
        attrs: Vec<KeyValue>,
    },
}

impl MetricsRecorder {
    /// Backend this recorder writes to.
    #[must_use]
    pub fn backend(&self) -> MetricsBackend {
        match self {
            MetricsRecorder::Legacy => MetricsBackend::Legacy,
            MetricsRecorder::Otel { .. } => MetricsBackend::Otel,
        }
    }

    /// Add `accepted` and `refused` to the counters for `data_type`.
    pub fn record(&self, tags: &TagSet, data_type: DataType, accepted: u64, refused: u64) {
        match self {
            MetricsRecorder::Legacy => legacy::record(tags, data_type, accepted, refused),
            MetricsRecorder::Otel { counters, attrs } => {
                counters.record(attrs, data_type, accepted, refused);
            }
        }
    }
}
