//! Observability helper for receivers.
//!
//! A [`Receiver`] is created once per receiver component and shared by every
//! task that accepts data for it. Each batch is bracketed by a start/end call
//! pair:
//!
//! ```rust,ignore
//! let op = obsrecv.start_traces_op(&Context::current());
//! let result = consumer.consume_traces(op.context(), batch).await;
//! obsrecv.end_traces_op(op, "protobuf", span_count, result.as_ref().err().map(|e| e as _));
//! ```

use crate::error::ObsReportError;
use crate::names::{RECEIVER_KEY, RECEIVER_METER_SCOPE, TRANSPORT_KEY};
use crate::operation::{OperationTracker, Outcome, ReceiveOperation};
use crate::recorder::{MetricsRecorder, ReceiverCounters};
use crate::settings::ReceiverSettings;
use common::config::{MetricsBackend, TelemetryLevel};
use common::types::{ComponentId, DataType};
use opentelemetry::{Context, KeyValue};
use std::error::Error;
use std::fmt;
use tracing::{debug, trace};

/// Records spans and accepted/refused counts for receive operations.
///
/// Identity and backend are fixed at construction. `Receiver` is `Send +
/// Sync`; share it behind an `Arc` across connections and tasks.
pub struct Receiver {
    receiver_id: ComponentId,
    transport: String,
    long_lived_ctx: bool,
    level: TelemetryLevel,
    tracker: OperationTracker,
    recorder: MetricsRecorder,
}

impl Receiver {
    /// Create a receiver helper.
    ///
    /// # Errors
    ///
    /// Returns `ObsReportError::InstrumentCreation` if the OpenTelemetry
    /// backend is selected and any counter fails to be created with a
    /// non-tolerated error.
    pub fn new(settings: ReceiverSettings) -> Result<Self, ObsReportError> {
        let ReceiverSettings {
            receiver_id,
            transport,
            long_lived_ctx,
            telemetry,
            metrics_backend,
        } = settings;

        let tracer = telemetry
            .tracer_provider
            .receiver_tracer(receiver_id.to_string());
        let tracker = OperationTracker::new(tracer, &receiver_id, &transport, long_lived_ctx);

        let recorder = match metrics_backend {
            MetricsBackend::Legacy => MetricsRecorder::Legacy,
            MetricsBackend::Otel => {
                let meter = telemetry.meter_provider.receiver_meter(RECEIVER_METER_SCOPE);
                MetricsRecorder::Otel {
                    counters: ReceiverCounters::create(&meter)?,
                    attrs: vec![
                        KeyValue::new(RECEIVER_KEY, receiver_id.to_string()),
                        KeyValue::new(TRANSPORT_KEY, transport.clone()),
                    ],
                }
            }
        };

        debug!(
            receiver = %receiver_id,
            transport = %transport,
            long_lived_ctx,
            level = %telemetry.level,
            backend = ?metrics_backend,
            "Receiver instrumentation created"
        );

        Ok(Self {
            receiver_id,
            transport,
            long_lived_ctx,
            level: telemetry.level,
            tracker,
            recorder,
        })
    }

    /// Component id the receiver was created with.
    #[must_use]
    pub fn receiver_id(&self) -> &ComponentId {
        &self.receiver_id
    }

    /// Transport label; empty when not applicable.
    #[must_use]
    pub fn transport(&self) -> &str {
        &self.transport
    }

    /// Whether start calls receive a long-lived context.
    #[must_use]
    pub fn is_long_lived(&self) -> bool {
        self.long_lived_ctx
    }

    /// Telemetry level fixed at construction.
    #[must_use]
    pub fn level(&self) -> TelemetryLevel {
        self.level
    }

    /// Counter backend fixed at construction.
    #[must_use]
    pub fn metrics_backend(&self) -> MetricsBackend {
        self.recorder.backend()
    }

    /// Called when a trace request is received from a client.
    ///
    /// The returned operation's context should be used for any work done on
    /// behalf of the same receive operation.
    pub fn start_traces_op(&self, cx: &Context) -> ReceiveOperation {
        self.start_op(cx, DataType::Traces)
    }

    /// Completes a receive operation started with [`start_traces_op`](Self::start_traces_op).
    pub fn end_traces_op(
        &self,
        operation: ReceiveOperation,
        format: &str,
        num_received_spans: u64,
        err: Option<&dyn Error>,
    ) {
        self.end_as(operation, DataType::Traces, format, num_received_spans, err);
    }

    /// Called when a metrics request is received from a client.
    pub fn start_metrics_op(&self, cx: &Context) -> ReceiveOperation {
        self.start_op(cx, DataType::Metrics)
    }

    /// Completes a receive operation started with [`start_metrics_op`](Self::start_metrics_op).
    pub fn end_metrics_op(
        &self,
        operation: ReceiveOperation,
        format: &str,
        num_received_points: u64,
        err: Option<&dyn Error>,
    ) {
        self.end_as(operation, DataType::Metrics, format, num_received_points, err);
    }

    /// Called when a logs request is received from a client.
    pub fn start_logs_op(&self, cx: &Context) -> ReceiveOperation {
        self.start_op(cx, DataType::Logs)
    }

    /// Completes a receive operation started with [`start_logs_op`](Self::start_logs_op).
    pub fn end_logs_op(
        &self,
        operation: ReceiveOperation,
        format: &str,
        num_received_log_records: u64,
        err: Option<&dyn Error>,
    ) {
        self.end_as(
            operation,
            DataType::Logs,
            format,
            num_received_log_records,
            err,
        );
    }

    /// Start a receive operation for `data_type`.
    pub fn start_op(&self, cx: &Context, data_type: DataType) -> ReceiveOperation {
        self.tracker.start(cx, data_type)
    }

    /// End a receive operation as the data type it was started for: record
    /// counts (unless the level is `None`), annotate the span with the
    /// outcome and end it.
    ///
    /// Never fails; telemetry problems only degrade telemetry.
    pub fn end_op(
        &self,
        operation: ReceiveOperation,
        format: &str,
        num_received_items: u64,
        err: Option<&dyn Error>,
    ) {
        let data_type = operation.data_type();
        self.finish(operation, data_type, format, num_received_items, err);
    }

    /// Typed end call; the operation keeps the data type it was started for.
    fn end_as(
        &self,
        operation: ReceiveOperation,
        expected: DataType,
        format: &str,
        num_received_items: u64,
        err: Option<&dyn Error>,
    ) {
        let data_type = operation.data_type();
        if data_type != expected {
            debug!(
                receiver = %self.receiver_id,
                started = %data_type,
                ended = %expected,
                "Receive operation ended through another data type's end call"
            );
        }
        self.finish(operation, data_type, format, num_received_items, err);
    }

    fn finish(
        &self,
        operation: ReceiveOperation,
        data_type: DataType,
        format: &str,
        num_received_items: u64,
        err: Option<&dyn Error>,
    ) {
        let outcome = Outcome::from_error(num_received_items, err);

        if self.level.is_enabled() {
            self.recorder.record(
                operation.tags(),
                data_type,
                outcome.accepted,
                outcome.refused,
            );
        }

        trace!(
            receiver = %self.receiver_id,
            data_type = %data_type,
            accepted = outcome.accepted,
            refused = outcome.refused,
            "Receive operation ended"
        );

        self.tracker.finish(operation, data_type, format, outcome, err);
    }

    /// Span name used for operations of `data_type`.
    #[must_use]
    pub fn span_name(&self, data_type: DataType) -> String {
        self.tracker.span_name(data_type)
    }

    /// Dimensional tags applied to every operation of this receiver.
    #[must_use]
    pub fn tags(&self) -> &crate::recorder::TagSet {
        self.tracker.tags()
    }
}

impl fmt::Debug for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Receiver")
            .field("receiver_id", &self.receiver_id)
            .field("transport", &self.transport)
            .field("long_lived_ctx", &self.long_lived_ctx)
            .field("level", &self.level)
            .field("recorder", &self.recorder)
            .finish_non_exhaustive()
    }
}
