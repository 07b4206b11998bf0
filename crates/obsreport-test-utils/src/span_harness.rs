//! In-memory span capture.
//!
//! Builds an SDK tracer provider with a synchronous exporter, so spans are
//! visible to the test as soon as they end.

use opentelemetry::trace::{TraceContextExt, Tracer, TracerProvider as _};
use opentelemetry::Context;
use opentelemetry_sdk::export::trace::SpanData;
use opentelemetry_sdk::testing::trace::InMemorySpanExporter;
use opentelemetry_sdk::trace::{Config, Sampler, TracerProvider};

/// Tracer name used for spans created by the harness itself (callers'
/// request or stream spans).
pub const CALLER_TRACER_NAME: &str = "obsreport-test-caller";

/// Captures every span ended through its tracer provider.
#[derive(Clone)]
pub struct SpanHarness {
    exporter: InMemorySpanExporter,
    provider: TracerProvider,
}

impl SpanHarness {
    /// Harness whose spans are all sampled and recording.
    pub fn new() -> Self {
        Self::with_sampler(Sampler::AlwaysOn)
    }

    /// Harness whose spans are never sampled, so `is_recording()` is false.
    pub fn non_recording() -> Self {
        Self::with_sampler(Sampler::AlwaysOff)
    }

    fn with_sampler(sampler: Sampler) -> Self {
        let exporter = InMemorySpanExporter::default();
        let provider = TracerProvider::builder()
            .with_simple_exporter(exporter.clone())
            .with_config(Config::default().with_sampler(sampler))
            .build();
        Self { exporter, provider }
    }

    /// Tracer provider to hand to `TelemetrySettings`.
    pub fn provider(&self) -> TracerProvider {
        self.provider.clone()
    }

    /// Start a caller span (e.g. a gRPC request or stream span) and return
    /// a context carrying it.
    pub fn caller_context(&self, name: &'static str) -> Context {
        let span = self.provider.tracer(CALLER_TRACER_NAME).start(name);
        Context::new().with_span(span)
    }

    /// All spans ended so far, in end order.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.exporter
            .get_finished_spans()
            .expect("in-memory exporter should return finished spans")
    }

    /// The only span ended so far.
    pub fn single_span(&self) -> SpanData {
        let spans = self.finished_spans();
        assert_eq!(
            spans.len(),
            1,
            "expected exactly one finished span, got {}: {:?}",
            spans.len(),
            spans.iter().map(|s| s.name.to_string()).collect::<Vec<_>>()
        );
        spans.into_iter().next().unwrap()
    }

    /// Finished spans with the given name.
    pub fn spans_named(&self, name: &str) -> Vec<SpanData> {
        self.finished_spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }

    /// Drop everything captured so far.
    pub fn reset(&self) {
        self.exporter.reset();
    }
}

impl Default for SpanHarness {
    fn default() -> Self {
        Self::new()
    }
}
