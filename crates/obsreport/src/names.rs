//! Instrument, attribute and span names used by receiver instrumentation.
//!
//! Counters follow the `receiver/<outcome>_<items>` convention:
//!
//! | Metric | Labels | Purpose |
//! |--------|--------|---------|
//! | `receiver/accepted_spans` | `receiver`, `transport` | Spans pushed into the pipeline |
//! | `receiver/refused_spans` | `receiver`, `transport` | Spans that could not be pushed |
//! | `receiver/accepted_metric_points` | `receiver`, `transport` | Metric points pushed into the pipeline |
//! | `receiver/refused_metric_points` | `receiver`, `transport` | Metric points that could not be pushed |
//! | `receiver/accepted_log_records` | `receiver`, `transport` | Log records pushed into the pipeline |
//! | `receiver/refused_log_records` | `receiver`, `transport` | Log records that could not be pushed |
//!
//! # Cardinality
//!
//! Labels are bounded by deployment shape: one `receiver` value per
//! configured receiver and a handful of `transport` values (grpc, http, ...).

use common::types::DataType;

/// Label/attribute key carrying the receiver's component id.
pub const RECEIVER_KEY: &str = "receiver";

/// Label/attribute key carrying the receiver's transport.
pub const TRANSPORT_KEY: &str = "transport";

/// Span attribute carrying the caller-supplied data format.
pub const FORMAT_KEY: &str = "format";

/// Prefix shared by receiver span names and metric names.
pub const RECEIVER_PREFIX: &str = "receiver/";

/// Instrumentation scope of the meter that owns the receiver counters.
pub const RECEIVER_METER_SCOPE: &str = "obsreport/receiver";

/// Span attribute key for spans accepted by a trace operation.
pub const ACCEPTED_SPANS_KEY: &str = "accepted_spans";
/// Span attribute key for spans refused by a trace operation.
pub const REFUSED_SPANS_KEY: &str = "refused_spans";
/// Span attribute key for metric points accepted by a metrics operation.
pub const ACCEPTED_METRIC_POINTS_KEY: &str = "accepted_metric_points";
/// Span attribute key for metric points refused by a metrics operation.
pub const REFUSED_METRIC_POINTS_KEY: &str = "refused_metric_points";
/// Span attribute key for log records accepted by a logs operation.
pub const ACCEPTED_LOG_RECORDS_KEY: &str = "accepted_log_records";
/// Span attribute key for log records refused by a logs operation.
pub const REFUSED_LOG_RECORDS_KEY: &str = "refused_log_records";

/// Span name suffix for a trace receive operation.
pub const RECEIVE_TRACE_DATA_OPERATION_SUFFIX: &str = "/TraceDataReceived";

/// Span name suffix for a metrics receive operation.
pub const RECEIVE_METRICS_OPERATION_SUFFIX: &str = "/MetricsReceived";

/// Span name suffix for a logs receive operation.
pub const RECEIVE_LOGS_OPERATION_SUFFIX: &str = "/LogsReceived";

/// Names and descriptions tied to one data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemNames {
    /// Span attribute key (and metric name suffix) for accepted items.
    pub accepted_key: &'static str,
    /// Span attribute key (and metric name suffix) for refused items.
    pub refused_key: &'static str,
    /// Full metric name of the accepted counter.
    pub accepted_metric: &'static str,
    /// Full metric name of the refused counter.
    pub refused_metric: &'static str,
    /// Description of the accepted counter.
    pub accepted_description: &'static str,
    /// Description of the refused counter.
    pub refused_description: &'static str,
    /// Span name suffix of the receive operation.
    pub operation_suffix: &'static str,
}

const TRACES: ItemNames = ItemNames {
    accepted_key: ACCEPTED_SPANS_KEY,
    refused_key: REFUSED_SPANS_KEY,
    accepted_metric: "receiver/accepted_spans",
    refused_metric: "receiver/refused_spans",
    accepted_description: "Number of spans successfully pushed into the pipeline.",
    refused_description: "Number of spans that could not be pushed into the pipeline.",
    operation_suffix: RECEIVE_TRACE_DATA_OPERATION_SUFFIX,
};

const METRICS: ItemNames = ItemNames {
    accepted_key: ACCEPTED_METRIC_POINTS_KEY,
    refused_key: REFUSED_METRIC_POINTS_KEY,
    accepted_metric: "receiver/accepted_metric_points",
    refused_metric: "receiver/refused_metric_points",
    accepted_description: "Number of metric points successfully pushed into the pipeline.",
    refused_description: "Number of metric points that could not be pushed into the pipeline.",
    operation_suffix: RECEIVE_METRICS_OPERATION_SUFFIX,
};

const LOGS: ItemNames = ItemNames {
    accepted_key: ACCEPTED_LOG_RECORDS_KEY,
    refused_key: REFUSED_LOG_RECORDS_KEY,
    accepted_metric: "receiver/accepted_log_records",
    refused_metric: "receiver/refused_log_records",
    accepted_description: "Number of log records successfully pushed into the pipeline.",
    refused_description: "Number of log records that could not be pushed into the pipeline.",
    operation_suffix: RECEIVE_LOGS_OPERATION_SUFFIX,
};

/// Look up the names used for `data_type`.
#[must_use]
pub const fn item_names(data_type: DataType) -> &'static ItemNames {
    match data_type {
        DataType::Traces => &TRACES,
        DataType::Metrics => &METRICS,
        DataType::Logs => &LOGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_are_prefixed_keys() {
        for data_type in DataType::ALL {
            let names = item_names(data_type);
            assert_eq!(
                names.accepted_metric,
                format!("{RECEIVER_PREFIX}{}", names.accepted_key)
            );
            assert_eq!(
                names.refused_metric,
                format!("{RECEIVER_PREFIX}{}", names.refused_key)
            );
        }
    }

    #[test]
    fn test_names_are_distinct_per_data_type() {
        let mut seen = std::collections::HashSet::new();
        for data_type in DataType::ALL {
            let names = item_names(data_type);
            assert!(seen.insert(names.accepted_metric));
            assert!(seen.insert(names.refused_metric));
            assert!(seen.insert(names.operation_suffix));
        }
    }
}
