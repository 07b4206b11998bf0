//! Span lifecycle counting
//!
//! The SDK exporter only sees spans that were sampled, so it cannot tell
//! whether a non-recording span was ended. `SpanCounter` is a tracer
//! provider that counts every span it starts and every `end()` call,
//! whatever the span's recording state.

use opentelemetry::trace::{Span, SpanBuilder, SpanContext, Status, Tracer, TracerProvider};
use opentelemetry::{Context, InstrumentationLibrary, KeyValue};
use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

#[derive(Default)]
struct Counts {
    starts: AtomicUsize,
    ends: AtomicUsize,
    errors: AtomicUsize,
}

/// Tracer provider counting span starts, ends and error statuses.
///
/// # Example
/// ```rust,ignore
/// let counter = SpanCounter::non_recording();
/// let receiver = TestReceiverBuilder::new("otlp", "grpc").build_with_tracer(counter.clone());
///
/// let op = receiver.start_logs_op(&Context::new());
/// receiver.end_logs_op(op, "protobuf", 1, None);
///
/// assert_eq!(counter.starts(), 1);
/// assert_eq!(counter.ends(), 1);
/// ```
#[derive(Clone)]
pub struct SpanCounter {
    counts: Arc<Counts>,
    recording: bool,
}

impl SpanCounter {
    /// Counter whose spans report `is_recording() == true`.
    pub fn recording() -> Self {
        Self {
            counts: Arc::default(),
            recording: true,
        }
    }

    /// Counter whose spans report `is_recording() == false`.
    pub fn non_recording() -> Self {
        Self {
            counts: Arc::default(),
            recording: false,
        }
    }

    /// Spans started so far.
    pub fn starts(&self) -> usize {
        self.counts.starts.load(Ordering::SeqCst)
    }

    /// `end()` calls so far, summed over all spans.
    pub fn ends(&self) -> usize {
        self.counts.ends.load(Ordering::SeqCst)
    }

    /// Spans given an error status so far.
    pub fn errors(&self) -> usize {
        self.counts.errors.load(Ordering::SeqCst)
    }

    /// Assert that `expected` spans were started and each was ended once.
    pub fn assert_balanced(&self, expected: usize) {
        assert_eq!(self.starts(), expected, "spans started");
        assert_eq!(self.ends(), expected, "span end() calls");
    }
}

impl TracerProvider for SpanCounter {
    type Tracer = CountingTracer;

    fn library_tracer(&self, _library: Arc<InstrumentationLibrary>) -> Self::Tracer {
        CountingTracer {
            counts: self.counts.clone(),
            recording: self.recording,
        }
    }
}

/// Tracer handed out by [`SpanCounter`].
pub struct CountingTracer {
    counts: Arc<Counts>,
    recording: bool,
}

impl Tracer for CountingTracer {
    type Span = CountingSpan;

    fn build_with_context(&self, _builder: SpanBuilder, _parent_cx: &Context) -> Self::Span {
        self.counts.starts.fetch_add(1, Ordering::SeqCst);
        CountingSpan {
            counts: self.counts.clone(),
            recording: self.recording,
            span_context: SpanContext::empty_context(),
        }
    }
}

/// Span handed out by [`CountingTracer`]. Records nothing but its end calls
/// and error statuses.
pub struct CountingSpan {
    counts: Arc<Counts>,
    recording: bool,
    span_context: SpanContext,
}

impl Span for CountingSpan {
    fn add_event_with_timestamp<T>(
        &mut self,
        _name: T,
        _timestamp: SystemTime,
        _attributes: Vec<KeyValue>,
    ) where
        T: Into<Cow<'static, str>>,
    {
    }

    fn span_context(&self) -> &SpanContext {
        &self.span_context
    }

    fn is_recording(&self) -> bool {
        self.recording
    }

    fn set_attribute(&mut self, _attribute: KeyValue) {}

    fn set_status(&mut self, status: Status) {
        if matches!(status, Status::Error { .. }) {
            self.counts.errors.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn update_name<T>(&mut self, _new_name: T)
    where
        T: Into<Cow<'static, str>>,
    {
    }

    fn add_link(&mut self, _span_context: SpanContext, _attributes: Vec<KeyValue>) {}

    fn end_with_timestamp(&mut self, _timestamp: SystemTime) {
        self.counts.ends.fetch_add(1, Ordering::SeqCst);
    }
}
