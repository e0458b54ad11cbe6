//! Per-command performance results
//!
//! These types describe what the performance computation produces, and what
//! is persisted as a snapshot for later range queries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trace::{Command, GroupId};

/// Metric identifier
pub type MetricId = u32;

/// Id of the "GPU Time" metric
pub const GPU_TIME_METRIC_ID: MetricId = 0;

/// Id of the "GPU Wall Time" metric
pub const GPU_WALL_TIME_METRIC_ID: MetricId = 1;

/// First id handed out to counter metrics
pub const COUNTER_METRIC_ID_OFFSET: MetricId = 2;

/// Value of a counter metric for a group no counter sample overlaps
pub const NO_COVERAGE: f64 = -1.0;

/// How values of a metric are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregationKind {
    Sum,
    TimeWeightedAvg,
    Average,
    Min,
    Max,
}

impl std::fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AggregationKind::Sum => "sum",
            AggregationKind::TimeWeightedAvg => "time-weighted-avg",
            AggregationKind::Average => "average",
            AggregationKind::Min => "min",
            AggregationKind::Max => "max",
        };
        f.write_str(s)
    }
}

/// Descriptor of one published metric
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    pub id: MetricId,
    pub name: String,
    pub unit: String,
    pub kind: AggregationKind,
}

/// Catalog of metrics computed for a capture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceMetadata {
    pub metrics: Vec<MetricDescriptor>,
}

impl PerformanceMetadata {
    /// Look up a metric by id
    pub fn metric(&self, id: MetricId) -> Option<&MetricDescriptor> {
        self.metrics.iter().find(|m| m.id == id)
    }
}

/// Metric values of one group (or one command range)
///
/// A missing key means the metric was not computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GpuPerformance {
    pub result: BTreeMap<MetricId, f64>,
}

impl GpuPerformance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: MetricId) -> Option<f64> {
        self.result.get(&id).copied()
    }

    pub fn set(&mut self, id: MetricId, value: f64) {
        self.result.insert(id, value);
    }
}

/// Full per-group result bundle
///
/// `group_ids`, `commands` and `perfs` are parallel and index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrudePerformance {
    pub metadata: PerformanceMetadata,
    pub group_ids: Vec<GroupId>,
    pub commands: Vec<Command>,
    pub perfs: Vec<GpuPerformance>,
}

impl CrudePerformance {
    /// Number of groups in the bundle
    pub fn len(&self) -> usize {
        self.group_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.group_ids.is_empty()
    }

    /// Iterate over `(group id, command, performance)` rows
    pub fn rows(&self) -> impl Iterator<Item = (GroupId, &Command, &GpuPerformance)> {
        self.group_ids
            .iter()
            .zip(self.commands.iter())
            .zip(self.perfs.iter())
            .map(|((id, cmd), perf)| (*id, cmd, perf))
    }

    /// Performance of a group, if present
    pub fn group(&self, group_id: GroupId) -> Option<&GpuPerformance> {
        self.group_ids
            .iter()
            .position(|&id| id == group_id)
            .map(|i| &self.perfs[i])
    }
}
