//! Dimensional, label-based recording through the `metrics` facade.
//!
//! Counts land on whatever recorder the process installed (Prometheus
//! exporter in production, `DebuggingRecorder` in tests). With no recorder
//! installed every call is a no-op.

use crate::names::{item_names, RECEIVER_KEY, TRANSPORT_KEY};
use common::types::{ComponentId, DataType};
use metrics::{counter, describe_counter, Label, Unit};
use std::sync::Arc;

/// Dimensional tags (`receiver`, `transport`) applied to an operation.
///
/// Resolved once per receiver; each operation holds a cheap clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSet {
    labels: Arc<[Label]>,
}

impl TagSet {
    /// Tags for one receiver: its id and transport.
    pub fn new(receiver_id: &ComponentId, transport: &str) -> Self {
        let labels: Vec<Label> = vec![
            Label::new(RECEIVER_KEY, receiver_id.to_string()),
            Label::new(TRANSPORT_KEY, transport.to_string()),
        ];
        Self {
            labels: labels.into(),
        }
    }

    /// Labels in key order `receiver`, `transport`.
    #[must_use]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Value of the tag named `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|label| label.key() == key)
            .map(Label::value)
    }
}

/// Record one operation's accepted/refused pair under the operation's tags.
///
/// The label set is resolved once and shared by both series so they always
/// update under the same dimensions.
pub fn record(tags: &TagSet, data_type: DataType, accepted: u64, refused: u64) {
    let names = item_names(data_type);
    let labels = tags.labels().to_vec();

    counter!(names.accepted_metric, labels.clone()).increment(accepted);
    counter!(names.refused_metric, labels).increment(refused);
}

/// Register descriptions and units for the six receiver series with the
/// installed recorder.
///
/// Optional; exporters that support metadata (e.g. Prometheus `# HELP`)
/// pick it up.
pub fn describe_legacy_metrics() {
    for data_type in DataType::ALL {
        let names = item_names(data_type);
        describe_counter!(names.accepted_metric, Unit::Count, names.accepted_description);
        describe_counter!(names.refused_metric, Unit::Count, names.refused_description);
    }
}
