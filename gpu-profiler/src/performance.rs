//! Per-command performance computation
//!
//! Filters the captured slices down to top-level work of linked groups,
//! computes time and counter metrics for every group and hands the result to
//! the snapshot store.

use std::collections::HashMap;
use tracing::{debug, error, info};
use vantage_shared::types::performance::{
    CrudePerformance, GpuPerformance, PerformanceMetadata, COUNTER_METRIC_ID_OFFSET,
    GPU_TIME_METRIC_ID, GPU_WALL_TIME_METRIC_ID,
};
use vantage_shared::types::trace::{
    Command, Counter, GpuSlices, GroupId, Slice, TraceData, TraceError,
};
use vantage_store::{SnapshotId, SnapshotStore};

use crate::catalog::{build_catalog, time_weighted_policy, AggregationPolicy};
use crate::counters::counter_aggregator;
use crate::interval::gpu_time_for_group;

/// Slices of each linked group, sorted by start time
///
/// `groups[i]` owns `slices[i]`. Groups are ordered by their earliest slice.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedSlices {
    pub groups: Vec<(GroupId, Command)>,
    pub slices: Vec<Vec<Slice>>,
}

impl GroupedSlices {
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Keep depth-0 slices of groups linked to a command, sort them by start
/// time and partition them per group.
pub fn group_slices(gpu_slices: &GpuSlices) -> GroupedSlices {
    let links: HashMap<GroupId, &Command> = gpu_slices
        .groups
        .iter()
        .filter_map(|g| g.link.as_ref().map(|link| (g.id, link)))
        .collect();

    let mut filtered: Vec<Slice> = gpu_slices
        .slices
        .iter()
        .filter(|s| s.depth == 0 && links.contains_key(&s.group_id))
        .copied()
        .collect();
    filtered.sort_by_key(|s| s.ts);

    let mut grouped = GroupedSlices::default();
    let mut index: HashMap<GroupId, usize> = HashMap::new();
    for slice in filtered {
        let i = *index.entry(slice.group_id).or_insert_with(|| {
            grouped
                .groups
                .push((slice.group_id, links[&slice.group_id].clone()));
            grouped.slices.push(Vec::new());
            grouped.slices.len() - 1
        });
        grouped.slices[i].push(slice);
    }

    grouped
}

/// Compute the crude performance bundle for a capture.
pub fn compute_performances(
    gpu_slices: &GpuSlices,
    counters: &[Counter],
    policy: AggregationPolicy,
) -> CrudePerformance {
    let grouped = group_slices(gpu_slices);
    let metadata = build_catalog(counters, policy);
    let mut perfs = vec![GpuPerformance::new(); grouped.len()];

    set_time_metrics(&grouped, &mut perfs);
    set_counter_metrics(&metadata, &grouped, &mut perfs, counters);

    let (group_ids, commands): (Vec<GroupId>, Vec<Command>) = grouped.groups.into_iter().unzip();
    CrudePerformance {
        metadata,
        group_ids,
        commands,
        perfs,
    }
}

fn set_time_metrics(grouped: &GroupedSlices, perfs: &mut [GpuPerformance]) {
    for ((group, slices), perf) in grouped.groups.iter().zip(&grouped.slices).zip(perfs) {
        let time = gpu_time_for_group(slices);
        debug!(
            "Group {}: {} slices, gpu time {}ns, wall time {}ns",
            group.0,
            slices.len(),
            time.gpu_time,
            time.wall_time
        );
        perf.set(GPU_TIME_METRIC_ID, time.gpu_time as f64);
        perf.set(GPU_WALL_TIME_METRIC_ID, time.wall_time as f64);
    }
}

fn set_counter_metrics(
    metadata: &PerformanceMetadata,
    grouped: &GroupedSlices,
    perfs: &mut [GpuPerformance],
    counters: &[Counter],
) {
    let counter_metrics = metadata
        .metrics
        .iter()
        .skip(COUNTER_METRIC_ID_OFFSET as usize);

    for (counter, metric) in counters.iter().zip(counter_metrics) {
        let Some(aggregate) = counter_aggregator(metric.kind) else {
            error!(
                "Counter aggregation method not implemented yet: metric {} ({}) uses {}",
                metric.id, metric.name, metric.kind
            );
            continue;
        };
        for (slices, perf) in grouped.slices.iter().zip(perfs.iter_mut()) {
            perf.set(metric.id, aggregate(slices, counter));
        }
    }
}

/// Outcome of a performance computation
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPerformance {
    /// Catalog plus per-group results
    pub crude: CrudePerformance,

    /// Id of the stored snapshot, [`SnapshotId::INVALID`] if storing failed
    pub snapshot_id: SnapshotId,
}

impl ProcessedPerformance {
    pub fn metadata(&self) -> &PerformanceMetadata {
        &self.crude.metadata
    }

    /// Whether a durable snapshot is available
    pub fn is_persisted(&self) -> bool {
        self.snapshot_id.is_valid()
    }
}

/// Computes per-command performance and persists the result
pub struct PerformanceProcessor<'a> {
    store: &'a dyn SnapshotStore,
    policy: AggregationPolicy,
}

impl<'a> PerformanceProcessor<'a> {
    /// Create a processor persisting into `store`, aggregating every counter
    /// by time-weighted average.
    pub fn new(store: &'a dyn SnapshotStore) -> Self {
        Self {
            store,
            policy: time_weighted_policy,
        }
    }

    /// Replace the counter aggregation policy
    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Validate a trace and process it.
    pub fn process_trace(&self, trace: &TraceData) -> Result<ProcessedPerformance, TraceError> {
        trace.validate()?;
        Ok(self.process(&trace.gpu_slices, &trace.counters))
    }

    /// Compute performance and store the snapshot.
    ///
    /// A storage failure is logged and reported through an invalid snapshot
    /// id; the computed data is returned either way.
    pub fn process(&self, gpu_slices: &GpuSlices, counters: &[Counter]) -> ProcessedPerformance {
        let crude = compute_performances(gpu_slices, counters, self.policy);
        info!(
            "Computed {} metrics for {} groups from {} slices and {} counters",
            crude.metadata.metrics.len(),
            crude.len(),
            gpu_slices.slices.len(),
            counters.len()
        );

        let snapshot_id = match self.store.store(&crude) {
            Ok(id) => {
                info!("Stored crude GPU performance snapshot {}", id);
                id
            }
            Err(e) => {
                error!("Failed to store crude GPU performance data: {}", e);
                SnapshotId::INVALID
            }
        };

        ProcessedPerformance { crude, snapshot_id }
    }
}

/// Process with the default policy.
pub fn process_performances(
    gpu_slices: &GpuSlices,
    counters: &[Counter],
    store: &dyn SnapshotStore,
) -> ProcessedPerformance {
    PerformanceProcessor::new(store).process(gpu_slices, counters)
}
