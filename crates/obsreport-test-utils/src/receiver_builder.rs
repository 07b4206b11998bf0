//! Builder patterns for test receivers
//!
//! Provides a fluent API for creating a `Receiver` wired to the harnesses.

use crate::metrics_harness::OtelMetricsHarness;
use crate::span_harness::SpanHarness;
use common::config::{MetricsBackend, TelemetryLevel};
use common::types::ComponentId;
use obsreport::{
    Receiver, ReceiverMeterProvider, ReceiverSettings, ReceiverTracerProvider, TelemetrySettings,
};
use opentelemetry::metrics::noop::NoopMeterProvider;
use opentelemetry::trace::noop::NoopTracerProvider;

/// Builder for creating test receivers
///
/// # Example
/// ```rust,ignore
/// let spans = SpanHarness::new();
/// let receiver = TestReceiverBuilder::new("otlp", "grpc")
///     .long_lived()
///     .level(TelemetryLevel::Detailed)
///     .build(&spans);
/// ```
pub struct TestReceiverBuilder {
    receiver_id: ComponentId,
    transport: String,
    long_lived_ctx: bool,
    level: TelemetryLevel,
    backend: MetricsBackend,
}

impl TestReceiverBuilder {
    /// Create a builder for the receiver `id` (`"type"` or `"type/name"`).
    ///
    /// # Panics
    ///
    /// Panics if `id` is not a valid component id.
    pub fn new(id: &str, transport: &str) -> Self {
        Self {
            receiver_id: id.parse().expect("test receiver id should be valid"),
            transport: transport.to_string(),
            long_lived_ctx: false,
            level: TelemetryLevel::Normal,
            backend: MetricsBackend::Legacy,
        }
    }

    /// Treat the context passed to start calls as long-lived.
    pub fn long_lived(mut self) -> Self {
        self.long_lived_ctx = true;
        self
    }

    /// Set the telemetry level
    pub fn level(mut self, level: TelemetryLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the metrics backend
    pub fn backend(mut self, backend: MetricsBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Settings with arbitrary providers.
    pub fn settings<T, M>(&self, tracer_provider: T, meter_provider: M) -> ReceiverSettings
    where
        T: ReceiverTracerProvider + 'static,
        M: ReceiverMeterProvider + 'static,
    {
        ReceiverSettings::new(
            self.receiver_id.clone(),
            self.transport.clone(),
            TelemetrySettings::new(self.level, tracer_provider, meter_provider),
        )
        .with_long_lived_ctx(self.long_lived_ctx)
        .with_metrics_backend(self.backend)
    }

    /// Receiver tracing into `spans`, with noop meters.
    pub fn build(self, spans: &SpanHarness) -> Receiver {
        Self::create(self.settings(spans.provider(), NoopMeterProvider::new()))
    }

    /// Receiver tracing into `spans` and counting into `meters`.
    ///
    /// Selects the OpenTelemetry backend regardless of [`backend`](Self::backend).
    pub fn build_with_metrics(self, spans: &SpanHarness, meters: &OtelMetricsHarness) -> Receiver {
        let builder = self.backend(MetricsBackend::Otel);
        Self::create(builder.settings(spans.provider(), meters.provider()))
    }

    /// Receiver tracing through `tracer_provider`, with noop meters.
    pub fn build_with_tracer<T>(self, tracer_provider: T) -> Receiver
    where
        T: ReceiverTracerProvider + 'static,
    {
        Self::create(self.settings(tracer_provider, NoopMeterProvider::new()))
    }

    /// Receiver with noop tracer and meter providers.
    pub fn build_noop(self) -> Receiver {
        Self::create(self.settings(NoopTracerProvider::new(), NoopMeterProvider::new()))
    }

    fn create(settings: ReceiverSettings) -> Receiver {
        Receiver::new(settings).expect("test receiver should build")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let receiver = TestReceiverBuilder::new("otlp", "grpc").build_noop();

        assert_eq!(receiver.receiver_id().to_string(), "otlp");
        assert_eq!(receiver.transport(), "grpc");
        assert!(!receiver.is_long_lived());
        assert_eq!(receiver.level(), TelemetryLevel::Normal);
        assert_eq!(receiver.metrics_backend(), MetricsBackend::Legacy);
    }

    #[test]
    fn test_builder_overrides() {
        let receiver = TestReceiverBuilder::new("kafka/orders", "")
            .long_lived()
            .level(TelemetryLevel::None)
            .backend(MetricsBackend::Otel)
            .build_noop();

        assert_eq!(receiver.receiver_id().to_string(), "kafka/orders");
        assert!(receiver.is_long_lived());
        assert_eq!(receiver.level(), TelemetryLevel::None);
        assert_eq!(receiver.metrics_backend(), MetricsBackend::Otel);
    }
}
