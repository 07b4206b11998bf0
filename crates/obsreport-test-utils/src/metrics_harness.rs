//! Counter capture for both metrics backends.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use opentelemetry::Value;
use opentelemetry_sdk::metrics::data::Sum;
use opentelemetry_sdk::metrics::{PeriodicReader, SdkMeterProvider};
use opentelemetry_sdk::runtime;
use opentelemetry_sdk::testing::metrics::InMemoryMetricsExporter;
use std::collections::BTreeMap;

/// One counter series as seen by a harness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterPoint {
    pub name: String,
    /// Unit reported with the series; empty when none was registered.
    pub unit: String,
    /// Description reported with the series; empty when none was registered.
    pub description: String,
    pub attributes: BTreeMap<String, String>,
    pub value: u64,
}

impl CounterPoint {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

fn find_value(points: &[CounterPoint], name: &str) -> Option<u64> {
    let matching: Vec<_> = points.iter().filter(|p| p.name == name).collect();
    if matching.is_empty() {
        None
    } else {
        Some(matching.iter().map(|p| p.value).sum())
    }
}

/// Captures OpenTelemetry counters through an in-memory exporter.
///
/// The periodic reader runs on Tokio: create and use the harness from a
/// multi-threaded runtime (`#[tokio::test(flavor = "multi_thread")]`).
#[derive(Clone)]
pub struct OtelMetricsHarness {
    exporter: InMemoryMetricsExporter,
    provider: SdkMeterProvider,
}

impl OtelMetricsHarness {
    pub fn new() -> Self {
        let exporter = InMemoryMetricsExporter::default();
        let reader = PeriodicReader::builder(exporter.clone(), runtime::Tokio).build();
        let provider = SdkMeterProvider::builder().with_reader(reader).build();
        Self { exporter, provider }
    }

    /// Meter provider to hand to `TelemetrySettings`.
    pub fn provider(&self) -> SdkMeterProvider {
        self.provider.clone()
    }

    /// Flush and return every `u64` sum point from the latest export.
    ///
    /// Counters are cumulative, so the latest export holds the totals.
    pub fn collect(&self) -> Vec<CounterPoint> {
        self.provider
            .force_flush()
            .expect("meter provider should flush");
        let exports = self
            .exporter
            .get_finished_metrics()
            .expect("in-memory exporter should return metrics");

        let Some(latest) = exports.last() else {
            return Vec::new();
        };

        let mut points = Vec::new();
        for scope in &latest.scope_metrics {
            for metric in &scope.metrics {
                let Some(sum) = metric.data.as_any().downcast_ref::<Sum<u64>>() else {
                    continue;
                };
                for data_point in &sum.data_points {
                    points.push(CounterPoint {
                        name: metric.name.to_string(),
                        unit: metric.unit.to_string(),
                        description: metric.description.to_string(),
                        attributes: data_point
                            .attributes
                            .iter()
                            .map(|kv| (kv.key.as_str().to_string(), value_to_string(&kv.value)))
                            .collect(),
                        value: data_point.value,
                    });
                }
            }
        }
        points
    }

    /// Total of all series of the named counter, or `None` if it was never
    /// recorded.
    pub fn counter_value(&self, name: &str) -> Option<u64> {
        find_value(&self.collect(), name)
    }

    /// Series of the named counter.
    pub fn counter_points(&self, name: &str) -> Vec<CounterPoint> {
        self.collect()
            .into_iter()
            .filter(|p| p.name == name)
            .collect()
    }
}

impl Default for OtelMetricsHarness {
    fn default() -> Self {
        Self::new()
    }
}

fn value_to_string(value: &Value) -> String {
    value.as_str().to_string()
}

/// Captures `metrics` facade counters with a thread-local
/// `DebuggingRecorder`.
///
/// Only code run inside [`run`](Self::run) is captured, so tests using this
/// harness can run in parallel.
pub struct LegacyMetricsHarness {
    recorder: DebuggingRecorder,
    snapshotter: Snapshotter,
}

impl LegacyMetricsHarness {
    pub fn new() -> Self {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        Self {
            recorder,
            snapshotter,
        }
    }

    /// Run `f` with this harness as the current thread's recorder.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        metrics::with_local_recorder(&self.recorder, f)
    }

    /// Every counter series recorded so far.
    pub fn collect(&self) -> Vec<CounterPoint> {
        self.snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter_map(|(key, unit, description, value)| {
                let DebugValue::Counter(value) = value else {
                    return None;
                };
                let key = key.key();
                Some(CounterPoint {
                    name: key.name().to_string(),
                    unit: unit.map(|u| u.as_str().to_string()).unwrap_or_default(),
                    description: description.map(|d| d.to_string()).unwrap_or_default(),
                    attributes: key
                        .labels()
                        .map(|l| (l.key().to_string(), l.value().to_string()))
                        .collect(),
                    value,
                })
            })
            .collect()
    }

    /// Total of all series of the named counter, or `None` if it was never
    /// recorded.
    pub fn counter_value(&self, name: &str) -> Option<u64> {
        find_value(&self.collect(), name)
    }

    /// Series of the named counter.
    pub fn counter_points(&self, name: &str) -> Vec<CounterPoint> {
        self.collect()
            .into_iter()
            .filter(|p| p.name == name)
            .collect()
    }
}

impl Default for LegacyMetricsHarness {
    fn default() -> Self {
        Self::new()
    }
}
