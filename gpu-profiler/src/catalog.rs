//! Metric catalog
//!
//! Metric ids are positional and stable: 0 is GPU time, 1 is GPU wall time,
//! and the counter at input index `i` gets id `2 + i`.

use vantage_shared::types::performance::{
    AggregationKind, MetricDescriptor, MetricId, PerformanceMetadata, COUNTER_METRIC_ID_OFFSET,
    GPU_TIME_METRIC_ID, GPU_WALL_TIME_METRIC_ID,
};
use vantage_shared::types::trace::Counter;

/// Unit of the time metrics
pub const TIME_UNIT: &str = "ns";

/// Chooses how a counter's values are aggregated
pub type AggregationPolicy = fn(&Counter) -> AggregationKind;

/// Aggregate every counter by time-weighted average.
///
/// Counter semantics are not known, so there is nothing better to pick per
/// counter yet.
pub fn time_weighted_policy(_counter: &Counter) -> AggregationKind {
    AggregationKind::TimeWeightedAvg
}

/// Descriptors of the two time metrics
pub fn time_metrics() -> [MetricDescriptor; 2] {
    [
        MetricDescriptor {
            id: GPU_TIME_METRIC_ID,
            name: "GPU Time".to_string(),
            unit: TIME_UNIT.to_string(),
            kind: AggregationKind::Sum,
        },
        MetricDescriptor {
            id: GPU_WALL_TIME_METRIC_ID,
            name: "GPU Wall Time".to_string(),
            unit: TIME_UNIT.to_string(),
            kind: AggregationKind::Sum,
        },
    ]
}

/// Metric id of the counter at `index` in the input
pub fn counter_metric_id(index: usize) -> MetricId {
    COUNTER_METRIC_ID_OFFSET + index as MetricId
}

/// Descriptor of the counter at `index`
pub fn counter_metric(index: usize, counter: &Counter, policy: AggregationPolicy) -> MetricDescriptor {
    MetricDescriptor {
        id: counter_metric_id(index),
        name: counter.name.clone(),
        unit: counter.unit.clone(),
        kind: policy(counter),
    }
}

/// Full catalog for a set of counters, in input order
pub fn build_catalog(counters: &[Counter], policy: AggregationPolicy) -> PerformanceMetadata {
    let mut metrics = Vec::with_capacity(2 + counters.len());
    metrics.extend(time_metrics());
    metrics.extend(
        counters
            .iter()
            .enumerate()
            .map(|(i, counter)| counter_metric(i, counter, policy)),
    );
    PerformanceMetadata { metrics }
}
