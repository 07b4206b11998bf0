//! Receive operation span tests.
//!
//! Runs full start/end cycles against an SDK tracer provider with an
//! in-memory exporter and checks naming, attributes, status and parenting of
//! the exported spans.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

use common::config::{MetricsBackend, TelemetryLevel};
use common::types::DataType;
use obsreport::names::{
    ACCEPTED_LOG_RECORDS_KEY, ACCEPTED_METRIC_POINTS_KEY, ACCEPTED_SPANS_KEY, FORMAT_KEY,
    REFUSED_LOG_RECORDS_KEY, REFUSED_METRIC_POINTS_KEY, REFUSED_SPANS_KEY, TRANSPORT_KEY,
};
use obsreport_test_utils::{
    init_test_logging, SpanAssertions, SpanCounter, SpanHarness, TestReceiverBuilder,
};
use opentelemetry::trace::TraceContextExt;
use opentelemetry::{Context, Value};
use opentelemetry_sdk::export::trace::SpanData;
use std::io;

fn downstream_error() -> io::Error {
    io::Error::other("pipeline refused the batch")
}

fn i64_attr(span: &SpanData, key: &str) -> i64 {
    match span.attributes.iter().find(|kv| kv.key.as_str() == key) {
        Some(kv) => match kv.value {
            Value::I64(v) => v,
            ref other => panic!("{key} should be an integer, got {other:?}"),
        },
        None => panic!("span {} has no {key} attribute", span.name),
    }
}

#[test]
fn test_logs_success_span() {
    init_test_logging();
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_logs_op(&Context::new());
    receiver.end_logs_op(op, "protobuf", 10, None);

    spans
        .single_span()
        .assert_named("receiver/otlp/LogsReceived")
        .assert_attr_str(TRANSPORT_KEY, "grpc")
        .assert_attr_str(FORMAT_KEY, "protobuf")
        .assert_attr_i64(ACCEPTED_LOG_RECORDS_KEY, 10)
        .assert_attr_i64(REFUSED_LOG_RECORDS_KEY, 0)
        .assert_unset_status();
}

#[test]
fn test_logs_failure_span() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);
    let err = downstream_error();

    let op = receiver.start_logs_op(&Context::new());
    receiver.end_logs_op(op, "protobuf", 5, Some(&err));

    spans
        .single_span()
        .assert_attr_i64(ACCEPTED_LOG_RECORDS_KEY, 0)
        .assert_attr_i64(REFUSED_LOG_RECORDS_KEY, 5)
        .assert_error_status("pipeline refused the batch")
        .assert_has_exception_event();
}

#[test]
fn test_span_names_and_count_keys_per_data_type() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp/edge", "http").build(&spans);
    let cx = Context::new();

    let op = receiver.start_traces_op(&cx);
    receiver.end_traces_op(op, "json", 3, None);
    let op = receiver.start_metrics_op(&cx);
    receiver.end_metrics_op(op, "json", 4, None);

    spans
        .spans_named("receiver/otlp/edge/TraceDataReceived")
        .first()
        .expect("trace span exported")
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 3)
        .assert_attr_i64(REFUSED_SPANS_KEY, 0)
        .assert_no_attr(ACCEPTED_LOG_RECORDS_KEY);

    spans
        .spans_named("receiver/otlp/edge/MetricsReceived")
        .first()
        .expect("metrics span exported")
        .assert_attr_i64(ACCEPTED_METRIC_POINTS_KEY, 4)
        .assert_attr_i64(REFUSED_METRIC_POINTS_KEY, 0);
}

#[test]
fn test_generic_ops_match_kind_specific_ops() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_op(&Context::new(), DataType::Traces);
    assert_eq!(op.data_type(), DataType::Traces);
    receiver.end_op(op, "protobuf", 2, None);

    spans
        .single_span()
        .assert_named(&receiver.span_name(DataType::Traces))
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 2);
}

#[test]
fn test_generic_end_uses_the_started_data_type() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_traces_op(&Context::new());
    receiver.end_op(op, "protobuf", 3, None);

    spans
        .single_span()
        .assert_named("receiver/otlp/TraceDataReceived")
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 3)
        .assert_no_attr(ACCEPTED_LOG_RECORDS_KEY);
}

#[test]
fn test_typed_end_on_another_kind_keeps_started_kind() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_traces_op(&Context::new());
    receiver.end_logs_op(op, "protobuf", 3, None);

    spans
        .single_span()
        .assert_named("receiver/otlp/TraceDataReceived")
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 3)
        .assert_no_attr(ACCEPTED_LOG_RECORDS_KEY);
}

#[test]
fn test_empty_transport_is_not_a_span_attribute() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("filelog", "").build(&spans);

    let op = receiver.start_logs_op(&Context::new());
    receiver.end_logs_op(op, "text", 1, None);

    spans
        .single_span()
        .assert_no_attr(TRANSPORT_KEY)
        .assert_attr_i64(ACCEPTED_LOG_RECORDS_KEY, 1);
}

#[test]
fn test_zero_items_still_produce_a_span() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_metrics_op(&Context::new());
    receiver.end_metrics_op(op, "protobuf", 0, None);

    spans
        .single_span()
        .assert_attr_i64(ACCEPTED_METRIC_POINTS_KEY, 0)
        .assert_attr_i64(REFUSED_METRIC_POINTS_KEY, 0)
        .assert_unset_status();
}

#[test]
fn test_level_none_still_records_span() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc")
        .level(TelemetryLevel::None)
        .build(&spans);

    let op = receiver.start_traces_op(&Context::new());
    receiver.end_traces_op(op, "protobuf", 8, None);

    spans
        .single_span()
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 8)
        .assert_attr_i64(REFUSED_SPANS_KEY, 0);
}

#[test]
fn test_operation_span_is_child_of_request_span() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "http").build(&spans);
    let request_cx = spans.caller_context("POST /v1/logs");
    let request_span = request_cx.span().span_context().clone();

    let op = receiver.start_logs_op(&request_cx);
    assert_eq!(
        op.context().span().span_context().trace_id(),
        request_span.trace_id()
    );
    receiver.end_logs_op(op, "json", 2, None);

    spans
        .single_span()
        .assert_named("receiver/otlp/LogsReceived")
        .assert_child_of(&request_span);
}

#[test]
fn test_long_lived_operation_is_linked_root() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc")
        .long_lived()
        .build(&spans);
    let stream_cx = spans.caller_context("grpc stream");
    let stream_span = stream_cx.span().span_context().clone();

    let op = receiver.start_traces_op(&stream_cx);
    receiver.end_traces_op(op, "protobuf", 6, None);

    // Only the batch span has ended; the stream span is still open.
    spans
        .single_span()
        .assert_named("receiver/otlp/TraceDataReceived")
        .assert_root_linked_to(&stream_span)
        .assert_attr_i64(ACCEPTED_SPANS_KEY, 6);

    stream_cx.span().end();
    assert_eq!(spans.finished_spans().len(), 2);
    assert_eq!(spans.spans_named("grpc stream").len(), 1);
}

#[test]
fn test_long_lived_without_caller_span_has_no_link() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc")
        .long_lived()
        .build(&spans);

    let op = receiver.start_logs_op(&Context::new());
    receiver.end_logs_op(op, "protobuf", 1, None);

    let span = spans.single_span();
    assert!(span.links.links.is_empty());
}

#[test]
fn test_concurrent_long_lived_operations_are_independent() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc")
        .long_lived()
        .build(&spans);
    let stream_cx = spans.caller_context("grpc stream");
    let stream_span = stream_cx.span().span_context().clone();

    std::thread::scope(|scope| {
        for (count, fail) in [(3_u64, false), (4_u64, true)] {
            let receiver = &receiver;
            let stream_cx = &stream_cx;
            scope.spawn(move || {
                let op = receiver.start_logs_op(stream_cx);
                let err = downstream_error();
                let err = fail.then_some(&err as &dyn std::error::Error);
                receiver.end_logs_op(op, "protobuf", count, err);
            });
        }
    });

    let batches = spans.spans_named("receiver/otlp/LogsReceived");
    assert_eq!(batches.len(), 2);
    for batch in &batches {
        batch.assert_root_linked_to(&stream_span);
    }
    assert_ne!(
        batches[0].span_context.trace_id(),
        batches[1].span_context.trace_id()
    );

    let mut accepted: Vec<_> = batches
        .iter()
        .map(|b| {
            (
                i64_attr(b, ACCEPTED_LOG_RECORDS_KEY),
                i64_attr(b, REFUSED_LOG_RECORDS_KEY),
            )
        })
        .collect();
    accepted.sort_unstable();
    assert_eq!(accepted, vec![(0, 4), (3, 0)]);

    assert!(
        spans.spans_named("grpc stream").is_empty(),
        "stream span must stay open"
    );
}

#[test]
fn test_non_recording_spans_are_not_exported() {
    let spans = SpanHarness::non_recording();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    let op = receiver.start_traces_op(&Context::new());
    assert!(!op.context().span().is_recording());
    let err = downstream_error();
    receiver.end_traces_op(op, "protobuf", 9, Some(&err));

    assert!(spans.finished_spans().is_empty());
}

#[test]
fn test_non_recording_span_is_ended_once() {
    let counter = SpanCounter::non_recording();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build_with_tracer(counter.clone());

    let op = receiver.start_logs_op(&Context::new());
    assert!(!op.context().span().is_recording());
    receiver.end_logs_op(op, "protobuf", 2, None);

    counter.assert_balanced(1);
}

#[test]
fn test_non_recording_error_path_ends_span_once() {
    let counter = SpanCounter::non_recording();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build_with_tracer(counter.clone());
    let err = downstream_error();

    let op = receiver.start_traces_op(&Context::new());
    receiver.end_traces_op(op, "protobuf", 9, Some(&err));

    counter.assert_balanced(1);
    assert_eq!(counter.errors(), 0, "non-recording span gets no status");
}

#[test]
fn test_recording_error_path_ends_span_once() {
    let counter = SpanCounter::recording();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build_with_tracer(counter.clone());
    let err = downstream_error();

    let op = receiver.start_metrics_op(&Context::new());
    receiver.end_metrics_op(op, "protobuf", 4, Some(&err));

    counter.assert_balanced(1);
    assert_eq!(counter.errors(), 1);
}

#[test]
fn test_level_none_ends_every_span_once() {
    for backend in [MetricsBackend::Legacy, MetricsBackend::Otel] {
        for counter in [SpanCounter::recording(), SpanCounter::non_recording()] {
            let receiver = TestReceiverBuilder::new("otlp", "grpc")
                .level(TelemetryLevel::None)
                .backend(backend)
                .build_with_tracer(counter.clone());
            let err = downstream_error();

            let op = receiver.start_logs_op(&Context::new());
            receiver.end_logs_op(op, "protobuf", 3, None);
            let op = receiver.start_logs_op(&Context::new());
            receiver.end_logs_op(op, "protobuf", 3, Some(&err));

            counter.assert_balanced(2);
        }
    }
}

#[test]
fn test_long_lived_operations_end_once_each() {
    let counter = SpanCounter::non_recording();
    let receiver = TestReceiverBuilder::new("otlp", "grpc")
        .long_lived()
        .build_with_tracer(counter.clone());
    let cx = Context::new();

    for count in 1..=3_u64 {
        let op = receiver.start_op(&cx, DataType::Traces);
        receiver.end_op(op, "protobuf", count, None);
    }

    counter.assert_balanced(3);
}

#[test]
fn test_repeated_cycles_end_every_span_once() {
    let spans = SpanHarness::new();
    let receiver = TestReceiverBuilder::new("otlp", "grpc").build(&spans);

    for count in 1..=5_u64 {
        let op = receiver.start_metrics_op(&Context::new());
        receiver.end_metrics_op(op, "protobuf", count, None);
    }

    let finished = spans.spans_named("receiver/otlp/MetricsReceived");
    assert_eq!(finished.len(), 5);
    let mut ids: Vec<_> = finished.iter().map(|s| s.span_context.span_id()).collect();
    ids.sort_by_key(|id| id.to_bytes());
    ids.dedup();
    assert_eq!(ids.len(), 5);
}
