//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for exported receive operation spans.

use opentelemetry::trace::{SpanContext, SpanId, Status};
use opentelemetry::{Key, Value};
use opentelemetry_sdk::export::trace::SpanData;

/// Name of the span event produced by `record_error`.
const EXCEPTION_EVENT: &str = "exception";

/// Custom assertions for finished spans
///
/// # Example
/// ```rust,ignore
/// spans
///     .single_span()
///     .assert_named("receiver/otlp/LogsReceived")
///     .assert_attr_str("transport", "grpc")
///     .assert_attr_i64("accepted_log_records", 10)
///     .assert_unset_status();
/// ```
pub trait SpanAssertions {
    /// Assert that the span has the given name
    fn assert_named(&self, name: &str) -> &Self;

    /// Assert that the span carries a string attribute with the given value
    fn assert_attr_str(&self, key: &str, expected: &str) -> &Self;

    /// Assert that the span carries an integer attribute with the given value
    fn assert_attr_i64(&self, key: &str, expected: i64) -> &Self;

    /// Assert that the span has no attribute with the given key
    fn assert_no_attr(&self, key: &str) -> &Self;

    /// Assert that the span status was never set
    fn assert_unset_status(&self) -> &Self;

    /// Assert that the span status is an error with the given description
    fn assert_error_status(&self, description: &str) -> &Self;

    /// Assert that the span recorded an exception event
    fn assert_has_exception_event(&self) -> &Self;

    /// Assert that the span is a structural child of `parent`
    fn assert_child_of(&self, parent: &SpanContext) -> &Self;

    /// Assert that the span is a root span linked to `linked`
    fn assert_root_linked_to(&self, linked: &SpanContext) -> &Self;
}

fn attribute<'a>(span: &'a SpanData, key: &str) -> Option<&'a Value> {
    let key = Key::from(key.to_string());
    span.attributes
        .iter()
        .find(|kv| kv.key == key)
        .map(|kv| &kv.value)
}

impl SpanAssertions for SpanData {
    fn assert_named(&self, name: &str) -> &Self {
        assert_eq!(self.name, name, "unexpected span name");
        self
    }

    fn assert_attr_str(&self, key: &str, expected: &str) -> &Self {
        match attribute(self, key) {
            Some(Value::String(actual)) => assert_eq!(
                actual.as_str(),
                expected,
                "span {} attribute {key}",
                self.name
            ),
            other => panic!(
                "span {} should carry string attribute {key}, got {other:?}",
                self.name
            ),
        }
        self
    }

    fn assert_attr_i64(&self, key: &str, expected: i64) -> &Self {
        match attribute(self, key) {
            Some(Value::I64(actual)) => {
                assert_eq!(*actual, expected, "span {} attribute {key}", self.name);
            }
            other => panic!(
                "span {} should carry integer attribute {key}, got {other:?}",
                self.name
            ),
        }
        self
    }

    fn assert_no_attr(&self, key: &str) -> &Self {
        let found = attribute(self, key);
        assert!(
            found.is_none(),
            "span {} should not carry attribute {key}, got {found:?}",
            self.name
        );
        self
    }

    fn assert_unset_status(&self) -> &Self {
        assert_eq!(
            self.status,
            Status::Unset,
            "span {} status should be unset",
            self.name
        );
        self
    }

    fn assert_error_status(&self, description: &str) -> &Self {
        match &self.status {
            Status::Error { description: actual } => assert_eq!(
                actual.as_ref(),
                description,
                "span {} error description",
                self.name
            ),
            other => panic!(
                "span {} should have error status, got {other:?}",
                self.name
            ),
        }
        self
    }

    fn assert_has_exception_event(&self) -> &Self {
        assert!(
            self.events
                .events
                .iter()
                .any(|event| event.name == EXCEPTION_EVENT),
            "span {} should have an exception event",
            self.name
        );
        self
    }

    fn assert_child_of(&self, parent: &SpanContext) -> &Self {
        assert_eq!(
            self.span_context.trace_id(),
            parent.trace_id(),
            "span {} should share its parent's trace",
            self.name
        );
        assert_eq!(
            self.parent_span_id,
            parent.span_id(),
            "span {} should be a child of the caller span",
            self.name
        );
        self
    }

    fn assert_root_linked_to(&self, linked: &SpanContext) -> &Self {
        assert_eq!(
            self.parent_span_id,
            SpanId::INVALID,
            "span {} should be a root span",
            self.name
        );
        assert_ne!(
            self.span_context.trace_id(),
            linked.trace_id(),
            "span {} should start a new trace",
            self.name
        );
        assert!(
            self.links
                .links
                .iter()
                .any(|link| link.span_context == *linked),
            "span {} should link to the caller span",
            self.name
        );
        self
    }
}
