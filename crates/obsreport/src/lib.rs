//! Receiver operation reporting.
//!
//! Instruments the "receive" side of a telemetry pipeline component. Every
//! batch of spans, metric points or log records that arrives from a client
//! is bracketed by a start/end call pair on a [`Receiver`], which:
//!
//! - records a span for the operation, parented to the caller's span for
//!   request/response transports or linked to it for long-lived streams, and
//! - counts accepted versus refused items per data type, through either the
//!   `metrics` facade (legacy, label based) or pre-bound OpenTelemetry
//!   counters, chosen once per receiver.
//!
//! # Modules
//!
//! - [`receiver`] - The `Receiver` facade and its start/end entry points
//! - [`operation`] - Operation handle, outcome split and span lifecycle
//! - [`recorder`] - The two metrics backends
//! - [`settings`] - Construction inputs and provider abstractions
//! - [`names`] - Metric, attribute and span names
//! - [`error`] - Construction error type

#![warn(missing_docs)]

pub mod error;
pub mod names;
pub mod operation;
pub mod receiver;
pub mod recorder;
pub mod settings;

// Re-exports for convenience
pub use common::config::{MetricsBackend, TelemetryConfig, TelemetryLevel};
pub use common::types::{ComponentId, DataType};
pub use error::{ObsReportError, Result};
pub use operation::{Outcome, ReceiveOperation};
pub use receiver::Receiver;
pub use recorder::{describe_legacy_metrics, MetricsRecorder, TagSet};
pub use settings::{
    GlobalProviders, ReceiverMeterProvider, ReceiverSettings, ReceiverTracerProvider,
    SpanStarter, TelemetrySettings,
};
