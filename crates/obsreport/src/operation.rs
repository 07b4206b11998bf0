//! Span lifecycle of a single receive operation.
//!
//! A start call produces a [`ReceiveOperation`]; the matching end call
//! consumes it, so an operation cannot be ended twice.
//!
//! # Parenting
//!
//! - Short-lived contexts: the operation span is a child of the span active
//!   in the caller's context.
//! - Long-lived contexts (e.g. a gRPC stream): the operation span is a new
//!   root carrying a link to the caller's span. The stream span is never the
//!   structural parent of its batches, so ending a batch leaves the stream
//!   span untouched and the stream span does not appear to last forever.

use crate::names::{item_names, FORMAT_KEY, RECEIVER_PREFIX, TRANSPORT_KEY};
use crate::recorder::TagSet;
use crate::settings::SpanStarter;
use common::types::{ComponentId, DataType};
use opentelemetry::trace::{Link, SpanBuilder, Status, TraceContextExt};
use opentelemetry::{Context, KeyValue};
use std::error::Error;
use std::sync::Arc;

/// Split of an operation's item count into accepted and refused items.
///
/// All-or-nothing: a failed operation refuses every item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    /// Items pushed into the pipeline.
    pub accepted: u64,
    /// Items that could not be pushed.
    pub refused: u64,
}

impl Outcome {
    /// Outcome of `item_count` items, all refused when `failed`.
    #[must_use]
    pub const fn new(item_count: u64, failed: bool) -> Self {
        if failed {
            Self {
                accepted: 0,
                refused: item_count,
            }
        } else {
            Self {
                accepted: item_count,
                refused: 0,
            }
        }
    }

    /// Outcome for an operation that ended with `err`.
    #[must_use]
    pub fn from_error(item_count: u64, err: Option<&dyn Error>) -> Self {
        Self::new(item_count, err.is_some())
    }
}

/// An in-flight receive operation.
///
/// Holds the caller's context augmented with the operation span, plus the
/// dimensional tags applied at start. Pass [`context`](Self::context) to
/// downstream calls that should be traced under this operation, then hand
/// the operation back to the matching end call.
#[derive(Debug)]
#[must_use = "a receive operation must be ended with the matching end call"]
pub struct ReceiveOperation {
    cx: Context,
    tags: TagSet,
    data_type: DataType,
}

impl ReceiveOperation {
    /// Context carrying the operation span as its active span.
    pub fn context(&self) -> &Context {
        &self.cx
    }

    /// Dimensional tags applied to this operation.
    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Data type the operation was started for.
    pub fn data_type(&self) -> DataType {
        self.data_type
    }
}

/// Creates and finishes operation spans for one receiver.
#[derive(Clone)]
pub(crate) struct OperationTracker {
    tracer: Arc<dyn SpanStarter>,
    span_name_prefix: String,
    transport: String,
    long_lived_ctx: bool,
    tags: TagSet,
}

impl OperationTracker {
    pub(crate) fn new(
        tracer: Arc<dyn SpanStarter>,
        receiver_id: &ComponentId,
        transport: &str,
        long_lived_ctx: bool,
    ) -> Self {
        Self {
            tracer,
            span_name_prefix: format!("{RECEIVER_PREFIX}{receiver_id}"),
            transport: transport.to_string(),
            long_lived_ctx,
            tags: TagSet::new(receiver_id, transport),
        }
    }

    pub(crate) fn span_name(&self, data_type: DataType) -> String {
        format!(
            "{}{}",
            self.span_name_prefix,
            item_names(data_type).operation_suffix
        )
    }

    pub(crate) fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Start the operation span for `data_type` relative to `parent_cx`.
    pub(crate) fn start(&self, parent_cx: &Context, data_type: DataType) -> ReceiveOperation {
        let mut builder = SpanBuilder::from_name(self.span_name(data_type));
        if !self.transport.is_empty() {
            builder = builder.with_attributes(vec![KeyValue::new(
                TRANSPORT_KEY,
                self.transport.clone(),
            )]);
        }

        let cx = if self.long_lived_ctx {
            let parent_span_context = parent_cx.span().span_context().clone();
            if parent_span_context.is_valid() {
                builder = builder.with_links(vec![Link::with_context(parent_span_context)]);
            }
            // Root span: built against an empty context, attached to the caller's.
            self.tracer.start_span(builder, &Context::new(), parent_cx)
        } else {
            self.tracer.start_span(builder, parent_cx, parent_cx)
        };

        ReceiveOperation {
            cx,
            tags: self.tags.clone(),
            data_type,
        }
    }

    /// Annotate the operation span with its outcome and end it.
    pub(crate) fn finish(
        &self,
        operation: ReceiveOperation,
        data_type: DataType,
        format: &str,
        outcome: Outcome,
        err: Option<&dyn Error>,
    ) {
        let span = operation.cx.span();

        if span.is_recording() {
            let names = item_names(data_type);
            span.set_attributes([
                KeyValue::new(FORMAT_KEY, format.to_string()),
                KeyValue::new(names.accepted_key, saturating_i64(outcome.accepted)),
                KeyValue::new(names.refused_key, saturating_i64(outcome.refused)),
            ]);

            if let Some(err) = err {
                span.record_error(err);
                span.set_status(Status::error(err.to_string()));
            }
        }

        span.end();
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
