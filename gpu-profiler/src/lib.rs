//! GPU Performance
//!
//! Computes per-command GPU performance from a captured trace:
//! - busy and wall time of every command's slices
//! - time-weighted hardware counter values over those slices
//! - range queries over persisted snapshots

pub mod catalog;
pub mod counters;
pub mod interval;
pub mod performance;
pub mod resolve;

pub use catalog::{build_catalog, time_weighted_policy, AggregationPolicy};
pub use counters::{counter_aggregator, CounterAggregator};
pub use interval::{gpu_time_for_group, GroupTime};
pub use performance::{
    compute_performances, group_slices, process_performances, GroupedSlices,
    PerformanceProcessor, ProcessedPerformance,
};
pub use resolve::{aggregate_range, resolve_performance, RangePerformance};
