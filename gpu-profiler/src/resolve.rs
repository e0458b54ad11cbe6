//! Range queries over a stored snapshot
//!
//! Folds the per-group values of a crude performance snapshot into one value
//! per metric for all commands in an inclusive command range.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vantage_shared::types::performance::{
    AggregationKind, CrudePerformance, GpuPerformance, MetricId, PerformanceMetadata,
    GPU_TIME_METRIC_ID, NO_COVERAGE,
};
use vantage_shared::types::trace::CommandRange;
use vantage_store::{SnapshotId, SnapshotStore};

/// Sum a metric over the groups whose command is in `range`.
pub fn aggregate_by_sum(crude: &CrudePerformance, range: &CommandRange, metric_id: MetricId) -> f64 {
    crude
        .rows()
        .filter(|(_, command, _)| range.contains(command))
        .filter_map(|(_, _, perf)| perf.get(metric_id))
        .sum()
}

/// Average a metric over the groups whose command is in `range`, weighting
/// each group by its GPU time.
///
/// Groups without a value, or with no counter coverage, are skipped rather
/// than averaged in as 0 or -1, so a range only partly covered by a counter
/// reports the average over its covered groups. Returns [`NO_COVERAGE`] when
/// nothing in range carries any weight.
pub fn aggregate_by_time_weighted_avg(
    crude: &CrudePerformance,
    range: &CommandRange,
    metric_id: MetricId,
) -> f64 {
    let mut accumulated_time = 0f64;
    let mut accumulated_weighted_value = 0f64;
    for (_, _, perf) in crude.rows().filter(|(_, command, _)| range.contains(command)) {
        let (Some(gpu_time), Some(value)) = (perf.get(GPU_TIME_METRIC_ID), perf.get(metric_id))
        else {
            continue;
        };
        if value == NO_COVERAGE {
            continue;
        }
        accumulated_time += gpu_time;
        accumulated_weighted_value += gpu_time * value;
    }

    if accumulated_time == 0.0 {
        NO_COVERAGE
    } else {
        accumulated_weighted_value / accumulated_time
    }
}

/// Aggregate every metric of the snapshot over `range`.
///
/// Metrics whose kind has no range aggregation are left out.
pub fn aggregate_range(crude: &CrudePerformance, range: &CommandRange) -> GpuPerformance {
    let mut result = GpuPerformance::new();
    for metric in &crude.metadata.metrics {
        let value = match metric.kind {
            AggregationKind::Sum => aggregate_by_sum(crude, range, metric.id),
            AggregationKind::TimeWeightedAvg => {
                aggregate_by_time_weighted_avg(crude, range, metric.id)
            }
            AggregationKind::Average | AggregationKind::Min | AggregationKind::Max => {
                debug!("Skipping metric {} with unsupported kind {}", metric.id, metric.kind);
                continue;
            }
        };
        result.set(metric.id, value);
    }
    result
}

/// Performance of a command range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePerformance {
    /// Catalog of the snapshot the range was resolved from
    pub metadata: PerformanceMetadata,

    /// Number of groups whose command is in range
    pub group_count: usize,

    pub perf: GpuPerformance,
}

/// Load snapshot `id` from `store` and aggregate it over `range`.
pub fn resolve_performance(
    store: &dyn SnapshotStore,
    id: &SnapshotId,
    range: &CommandRange,
) -> Result<RangePerformance> {
    if !id.is_valid() {
        warn!("Resolving performance for an invalid snapshot id");
    }
    let crude = store
        .resolve(id)
        .with_context(|| format!("Error resolving command GPU performance {}", id))?;

    let group_count = crude
        .rows()
        .filter(|(_, command, _)| range.contains(command))
        .count();
    debug!("{} of {} groups in range {}..={}", group_count, crude.len(), range.from, range.to);

    let perf = aggregate_range(&crude, range);
    Ok(RangePerformance {
        metadata: crude.metadata,
        group_count,
        perf,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_shared::types::performance::{MetricDescriptor, PerformanceMetadata};
    use vantage_shared::types::trace::Command;
    use vantage_store::MemoryStore;

    fn metric(id: MetricId, kind: AggregationKind) -> MetricDescriptor {
        MetricDescriptor {
            id,
            name: format!("metric {}", id),
            unit: String::new(),
            kind,
        }
    }

    fn perf(values: &[(MetricId, f64)]) -> GpuPerformance {
        let mut perf = GpuPerformance::new();
        for &(id, value) in values {
            perf.set(id, value);
        }
        perf
    }

    /// Three draws under command buffer 0.0, one under 0.1.
    fn snapshot() -> CrudePerformance {
        CrudePerformance {
            metadata: PerformanceMetadata {
                metrics: vec![
                    metric(0, AggregationKind::Sum),
                    metric(1, AggregationKind::Sum),
                    metric(2, AggregationKind::TimeWeightedAvg),
                    metric(3, AggregationKind::Max),
                ],
            },
            group_ids: vec![10, 11, 12, 13],
            commands: vec![
                Command::new(vec![0, 0, 0]),
                Command::new(vec![0, 0, 1]),
                Command::new(vec![0, 0, 2]),
                Command::new(vec![0, 1, 0]),
            ],
            perfs: vec![
                perf(&[(0, 10.0), (1, 8.0), (2, 4.0)]),
                perf(&[(0, 30.0), (1, 30.0), (2, 8.0)]),
                perf(&[(0, 5.0), (1, 5.0), (2, NO_COVERAGE)]),
                perf(&[(0, 100.0), (1, 50.0), (2, 1.0)]),
            ],
        }
    }

    fn range(from: &[u64], to: &[u64]) -> CommandRange {
        CommandRange::new(Command::new(from.to_vec()), Command::new(to.to_vec()))
    }

    #[test]
    fn test_sum_over_command_buffer() {
        let result = aggregate_range(&snapshot(), &range(&[0, 0], &[0, 0]));
        assert_eq!(result.get(0), Some(45.0));
        assert_eq!(result.get(1), Some(43.0));
    }

    #[test]
    fn test_time_weighted_average_skips_uncovered_groups() {
        let result = aggregate_range(&snapshot(), &range(&[0, 0], &[0, 0]));
        // (10 * 4 + 30 * 8) / 40; group 12 has no coverage.
        assert_eq!(result.get(2), Some(7.0));
    }

    #[test]
    fn test_unsupported_kind_omitted() {
        let result = aggregate_range(&snapshot(), &range(&[0], &[0]));
        assert_eq!(result.get(3), None);
        assert_eq!(result.get(0), Some(145.0));
    }

    #[test]
    fn test_empty_range() {
        let result = aggregate_range(&snapshot(), &range(&[5], &[6]));
        assert_eq!(result.get(0), Some(0.0));
        assert_eq!(result.get(2), Some(NO_COVERAGE));
    }

    #[test]
    fn test_resolve_from_store() {
        let store = MemoryStore::new();
        let id = store.store(&snapshot()).unwrap();
        let result = resolve_performance(&store, &id, &range(&[0, 0, 1], &[0, 1, 0])).unwrap();
        assert_eq!(result.group_count, 3);
        assert_eq!(result.perf.get(0), Some(135.0));
        assert_eq!(result.metadata.metrics.len(), 4);
    }

    #[test]
    fn test_resolve_unknown_snapshot_fails() {
        let store = MemoryStore::new();
        let result = resolve_performance(&store, &SnapshotId::INVALID, &range(&[0], &[1]));
        assert!(result.is_err());
    }
}
