//! # Obsreport Test Utilities
//!
//! Shared test utilities for receiver instrumentation.
//!
//! This crate provides:
//! - Span capture (`SpanHarness`, backed by the SDK in-memory exporter)
//! - Span start/end counting, recording or not (`SpanCounter`)
//! - OpenTelemetry counter capture (`OtelMetricsHarness`)
//! - `metrics` facade capture (`LegacyMetricsHarness`, thread-local `DebuggingRecorder`)
//! - Receiver builders wired to the harnesses (`TestReceiverBuilder`)
//! - Custom assertions (`SpanAssertions` trait)
//! - Test log capture (`init_test_logging`)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use obsreport_test_utils::*;
//!
//! #[test]
//! fn test_example() {
//!     let spans = SpanHarness::new();
//!     let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);
//!
//!     let op = receiver.start_logs_op(&Context::new());
//!     receiver.end_logs_op(op, "proto", 10, None);
//!
//!     spans.single_span()
//!         .assert_named("receiver/otlp/LogsReceived")
//!         .assert_attr_i64("accepted_log_records", 10)
//!         .assert_unset_status();
//! }
//! ```

pub mod assertions;
pub mod logging;
pub mod metrics_harness;
pub mod receiver_builder;
pub mod span_counter;
pub mod span_harness;

// Re-export commonly used items
pub use assertions::*;
pub use logging::*;
pub use metrics_harness::*;
pub use receiver_builder::*;
pub use span_counter::*;
pub use span_harness::*;
