//! Pre-bound OpenTelemetry counters with a fixed attribute set.

use crate::error::{InstrumentFailure, ObsReportError};
use crate::names::item_names;
use common::types::DataType;
use opentelemetry::metrics::{Counter, Meter, MetricsError};
use opentelemetry::KeyValue;
use std::fmt;
use tracing::warn;

/// Unit of every receiver counter.
const COUNTER_UNIT: &str = "1";

/// Accepted and refused counters for one data type.
#[derive(Clone)]
pub struct CounterPair {
    /// Items pushed into the pipeline.
    pub accepted: Counter<u64>,
    /// Items that could not be pushed into the pipeline.
    pub refused: Counter<u64>,
}

/// The six receiver counters, one pair per data type.
#[derive(Clone)]
pub struct ReceiverCounters {
    traces: CounterPair,
    metrics: CounterPair,
    logs: CounterPair,
}

/// Result of creating one instrument.
pub struct InstrumentOutcome {
    /// Metric name of the instrument.
    pub name: &'static str,
    /// Counter returned by the meter, or the reason it was rejected.
    pub result: Result<Counter<u64>, MetricsError>,
}

impl ReceiverCounters {
    /// Create all six counters on `meter`.
    ///
    /// Every creation is attempted; failures are collected and folded into a
    /// single error. Instrument-name errors are tolerated (see
    /// [`is_tolerated`]) and leave a counter with the same description and
    /// unit in place.
    ///
    /// # Errors
    ///
    /// Returns `ObsReportError::InstrumentCreation` listing every
    /// non-tolerated failure.
    pub fn create(meter: &Meter) -> Result<Self, ObsReportError> {
        let mut outcomes = Vec::with_capacity(6);
        let traces = create_pair(meter, DataType::Traces, &mut outcomes);
        let metrics = create_pair(meter, DataType::Metrics, &mut outcomes);
        let logs = create_pair(meter, DataType::Logs, &mut outcomes);

        // A missing pair always has a non-tolerated failure among the outcomes.
        let failures = non_tolerated_failures(outcomes);
        match (traces, metrics, logs) {
            (Some(traces), Some(metrics), Some(logs)) if failures.is_empty() => Ok(Self {
                traces,
                metrics,
                logs,
            }),
            _ => Err(ObsReportError::InstrumentCreation(failures)),
        }
    }

    /// Counter pair for `data_type`.
    #[must_use]
    pub fn pair(&self, data_type: DataType) -> &CounterPair {
        match data_type {
            DataType::Traces => &self.traces,
            DataType::Metrics => &self.metrics,
            DataType::Logs => &self.logs,
        }
    }

    /// Add both values to the pair for `data_type`. Zero values are still
    /// added so every series exists from the first operation on.
    pub fn record(&self, attrs: &[KeyValue], data_type: DataType, accepted: u64, refused: u64) {
        let pair = self.pair(data_type);
        pair.accepted.add(accepted, attrs);
        pair.refused.add(refused, attrs);
    }
}

impl fmt::Debug for ReceiverCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReceiverCounters")
            .field("instruments", &6)
            .finish_non_exhaustive()
    }
}

fn create_pair(
    meter: &Meter,
    data_type: DataType,
    outcomes: &mut Vec<InstrumentOutcome>,
) -> Option<CounterPair> {
    let names = item_names(data_type);
    let accepted = create_counter(
        meter,
        names.accepted_metric,
        names.accepted_description,
        outcomes,
    );
    let refused = create_counter(
        meter,
        names.refused_metric,
        names.refused_description,
        outcomes,
    );
    Some(CounterPair {
        accepted: accepted?,
        refused: refused?,
    })
}

fn create_counter(
    meter: &Meter,
    name: &'static str,
    description: &'static str,
    outcomes: &mut Vec<InstrumentOutcome>,
) -> Option<Counter<u64>> {
    let build = || {
        meter
            .u64_counter(name)
            .with_description(description)
            .with_unit(COUNTER_UNIT)
    };

    let result = build().try_init();
    let counter = resolve_counter(&result, || build().init());
    outcomes.push(InstrumentOutcome { name, result });
    counter
}

/// Counter to keep for a creation `result`.
///
/// Tolerated errors get a counter from `fallback`; other errors get none.
/// The SDK routes name errors to its global error handler instead of
/// returning them, so the fallback is only taken with meters that do return
/// the error.
fn resolve_counter(
    result: &Result<Counter<u64>, MetricsError>,
    fallback: impl FnOnce() -> Counter<u64>,
) -> Option<Counter<u64>> {
    match result {
        Ok(counter) => Some(counter.clone()),
        Err(error) if is_tolerated(error) => Some(fallback()),
        Err(_) => None,
    }
}

/// Whether an instrument creation error is tolerated.
///
/// Name validation errors are expected when several receivers register the
/// same instruments on a shared meter whose SDK rejects the `receiver/`
/// naming scheme; they must not prevent the receiver from starting.
#[must_use]
pub fn is_tolerated(error: &MetricsError) -> bool {
    match error {
        MetricsError::InvalidInstrumentConfiguration(reason) => {
            reason.to_ascii_lowercase().contains("name")
        }
        _ => false,
    }
}

/// Fold per-instrument outcomes into a single result.
///
/// # Errors
///
/// Returns `ObsReportError::InstrumentCreation` if any outcome failed with a
/// non-tolerated error.
pub fn fold_outcomes(outcomes: Vec<InstrumentOutcome>) -> Result<(), ObsReportError> {
    let failures = non_tolerated_failures(outcomes);
    if failures.is_empty() {
        Ok(())
    } else {
        Err(ObsReportError::InstrumentCreation(failures))
    }
}

fn non_tolerated_failures(outcomes: Vec<InstrumentOutcome>) -> Vec<InstrumentFailure> {
    let mut failures = Vec::new();
    for outcome in outcomes {
        let Err(error) = outcome.result else {
            continue;
        };
        if is_tolerated(&error) {
            warn!(
                instrument = outcome.name,
                error = %error,
                "Ignoring receiver instrument name error"
            );
            continue;
        }
        failures.push(InstrumentFailure {
            name: outcome.name,
            error,
        });
    }
    failures
}
