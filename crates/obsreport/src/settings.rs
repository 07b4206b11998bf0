//! Construction inputs for a [`Receiver`](crate::Receiver).
//!
//! Tracer and meter providers are held as shared trait objects so a single
//! `TelemetrySettings` value can be cloned into every receiver of a process,
//! whatever concrete OpenTelemetry provider the process installed.

use common::config::{MetricsBackend, TelemetryConfig, TelemetryLevel};
use common::types::ComponentId;
use opentelemetry::global;
use opentelemetry::metrics::{Meter, MeterProvider};
use opentelemetry::trace::{SpanBuilder, TraceContextExt, Tracer, TracerProvider};
use opentelemetry::Context;
use std::fmt;
use std::sync::Arc;

/// Starts spans for one named tracer.
///
/// Implemented for every OpenTelemetry [`Tracer`] whose spans can live in a
/// [`Context`].
pub trait SpanStarter: Send + Sync {
    /// Build a span from `builder` with `parent` as its parent context and
    /// return `attach_to` carrying the new span as its active span.
    fn start_span(&self, builder: SpanBuilder, parent: &Context, attach_to: &Context) -> Context;
}

impl<T> SpanStarter for T
where
    T: Tracer + Send + Sync,
    T::Span: Send + Sync + 'static,
{
    fn start_span(&self, builder: SpanBuilder, parent: &Context, attach_to: &Context) -> Context {
        let span = self.build_with_context(builder, parent);
        attach_to.with_span(span)
    }
}

/// Source of named tracers for receivers.
pub trait ReceiverTracerProvider: Send + Sync {
    /// Tracer named after the receiver's component id.
    fn receiver_tracer(&self, name: String) -> Arc<dyn SpanStarter>;
}

impl<P> ReceiverTracerProvider for P
where
    P: TracerProvider + Send + Sync,
    P::Tracer: Send + Sync + 'static,
    <P::Tracer as Tracer>::Span: Send + Sync + 'static,
{
    fn receiver_tracer(&self, name: String) -> Arc<dyn SpanStarter> {
        Arc::new(self.tracer(name))
    }
}

/// Source of the meter that owns receiver counters.
pub trait ReceiverMeterProvider: Send + Sync {
    /// Meter for the given instrumentation scope.
    fn receiver_meter(&self, scope: &'static str) -> Meter;
}

impl<P> ReceiverMeterProvider for P
where
    P: MeterProvider + Send + Sync,
{
    fn receiver_meter(&self, scope: &'static str) -> Meter {
        self.meter(scope)
    }
}

/// Providers installed process-wide through `opentelemetry::global`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalProviders;

impl ReceiverTracerProvider for GlobalProviders {
    fn receiver_tracer(&self, name: String) -> Arc<dyn SpanStarter> {
        Arc::new(global::tracer(name))
    }
}

impl ReceiverMeterProvider for GlobalProviders {
    fn receiver_meter(&self, scope: &'static str) -> Meter {
        global::meter(scope)
    }
}

/// Telemetry bundle handed to every receiver at creation time.
#[derive(Clone)]
pub struct TelemetrySettings {
    /// Metrics verbosity; `None` disables count recording.
    pub level: TelemetryLevel,
    /// Source of the per-receiver tracer.
    pub tracer_provider: Arc<dyn ReceiverTracerProvider>,
    /// Source of the meter owning the OpenTelemetry counters.
    pub meter_provider: Arc<dyn ReceiverMeterProvider>,
}

impl TelemetrySettings {
    /// Settings backed by explicit providers.
    pub fn new<T, M>(level: TelemetryLevel, tracer_provider: T, meter_provider: M) -> Self
    where
        T: ReceiverTracerProvider + 'static,
        M: ReceiverMeterProvider + 'static,
    {
        Self {
            level,
            tracer_provider: Arc::new(tracer_provider),
            meter_provider: Arc::new(meter_provider),
        }
    }

    /// Settings backed by the process-global providers.
    #[must_use]
    pub fn global(level: TelemetryLevel) -> Self {
        Self::new(level, GlobalProviders, GlobalProviders)
    }
}

impl fmt::Debug for TelemetrySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelemetrySettings")
            .field("level", &self.level)
            .field("tracer_provider", &"<dyn ReceiverTracerProvider>")
            .field("meter_provider", &"<dyn ReceiverMeterProvider>")
            .finish()
    }
}

/// Settings for creating a [`Receiver`](crate::Receiver).
#[derive(Debug, Clone)]
pub struct ReceiverSettings {
    /// Component id of the receiver, e.g. `otlp/edge`.
    pub receiver_id: ComponentId,

    /// Transport label (e.g. "grpc", "http"); empty when not applicable.
    pub transport: String,

    /// When true, the context passed to the start calls outlives each
    /// individual receive operation.
    ///
    /// Typically the long-lived context belongs to a connection, e.g. a gRPC
    /// stream, over which many batches arrive without a fresh context per
    /// batch.
    pub long_lived_ctx: bool,

    /// Providers and level shared by the process.
    pub telemetry: TelemetrySettings,

    /// Backend for accepted/refused counts, resolved once by the caller.
    pub metrics_backend: MetricsBackend,
}

impl ReceiverSettings {
    /// Settings with a legacy metrics backend and a short-lived context.
    pub fn new(
        receiver_id: ComponentId,
        transport: impl Into<String>,
        telemetry: TelemetrySettings,
    ) -> Self {
        Self {
            receiver_id,
            transport: transport.into(),
            long_lived_ctx: false,
            telemetry,
            metrics_backend: MetricsBackend::default(),
        }
    }

    /// Set whether start calls receive a long-lived context.
    #[must_use]
    pub fn with_long_lived_ctx(mut self, long_lived_ctx: bool) -> Self {
        self.long_lived_ctx = long_lived_ctx;
        self
    }

    /// Select the counter backend.
    #[must_use]
    pub fn with_metrics_backend(mut self, metrics_backend: MetricsBackend) -> Self {
        self.metrics_backend = metrics_backend;
        self
    }

    /// Apply a process-wide [`TelemetryConfig`]: its level overrides the
    /// telemetry bundle's level and its backend is adopted as-is.
    #[must_use]
    pub fn with_config(mut self, config: TelemetryConfig) -> Self {
        self.telemetry.level = config.level;
        self.metrics_backend = config.metrics_backend;
        self
    }
}
