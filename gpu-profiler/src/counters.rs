//! Counter aggregation over a group's slices
//!
//! A counter is a step function: `values[i]` holds over
//! `(timestamps[i-1], timestamps[i]]`, and `values[0]` is assumed to have held
//! since before the first sample. Each sample contributes to a group in
//! proportion to the time its interval overlaps the group's slices.

use vantage_shared::types::performance::{AggregationKind, NO_COVERAGE};
use vantage_shared::types::trace::{Counter, Slice, Timestamp};

/// Computes one value of a counter for a group's sorted slices
pub type CounterAggregator = fn(&[Slice], &Counter) -> f64;

/// Aggregator implementing `kind` for counter metrics, if there is one.
///
/// Only the time-weighted average is implemented; the other kinds are
/// declared so catalogs can carry them, but produce no values.
pub fn counter_aggregator(kind: AggregationKind) -> Option<CounterAggregator> {
    match kind {
        AggregationKind::TimeWeightedAvg => Some(time_weighted_counter_perf),
        AggregationKind::Sum
        | AggregationKind::Average
        | AggregationKind::Min
        | AggregationKind::Max => None,
    }
}

/// The contiguous run of a counter's samples that can overlap a group
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CounterWindow<'a> {
    timestamps: &'a [Timestamp],
    values: &'a [f64],
}

impl<'a> CounterWindow<'a> {
    pub fn timestamps(&self) -> &'a [Timestamp] {
        self.timestamps
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}

/// Select the samples of `counter` whose implicit interval can collide with
/// the envelope `[min start, max end]` of `slices`.
///
/// Keeps samples after the envelope start, up to and including the first
/// sample past the envelope end. Returns `None` when nothing is left.
pub fn extract_window<'a>(slices: &[Slice], counter: &'a Counter) -> Option<CounterWindow<'a>> {
    let (mut range_start, mut range_end) = (u64::MAX, 0u64);
    for slice in slices {
        range_start = range_start.min(slice.ts);
        range_end = range_end.max(slice.end());
    }

    let ts = &counter.timestamps;
    let len = ts.len().min(counter.values.len());
    let mut first = None;
    let mut last = 0;
    for i in 0..len {
        if i > 0 && ts[i - 1] > range_end {
            break;
        }
        if ts[i] > range_start {
            first.get_or_insert(i);
            last = i + 1;
        }
    }

    let first = first?;
    Some(CounterWindow {
        timestamps: &ts[first..last],
        values: &counter.values[first..last],
    })
}

/// Average the window's values over the time they overlap `slices`.
///
/// Returns 0 when the samples overlap the slices for no time at all.
pub fn time_weighted_average(slices: &[Slice], window: &CounterWindow<'_>) -> f64 {
    let (ts, vs) = (window.timestamps, window.values);
    let (Some(&first_ts), Some(&first_value)) = (ts.first(), vs.first()) else {
        return 0.0;
    };

    // Contribution time: overlap between a sample's interval and a slice.
    let mut ct_sum = 0u64;
    let mut weighted_sum = 0f64;
    for slice in slices {
        let (s_start, s_end) = (slice.ts, slice.end());

        if first_ts > s_start {
            let ct = first_ts.min(s_end) - s_start;
            ct_sum = ct_sum.saturating_add(ct);
            weighted_sum += ct as f64 * first_value;
        }

        for i in 1..ts.len() {
            let (c_start, c_end) = (ts[i - 1], ts[i]);
            // Out-of-order samples cover no time.
            if c_end <= c_start || c_end < s_start {
                continue;
            } else if c_end < s_end {
                let ct = c_end.saturating_sub(c_start.max(s_start));
                ct_sum = ct_sum.saturating_add(ct);
                weighted_sum += ct as f64 * vs[i];
            } else {
                // Later samples start after this slice ends.
                let ct = s_end.saturating_sub(c_start);
                ct_sum = ct_sum.saturating_add(ct);
                weighted_sum += ct as f64 * vs[i];
                break;
            }
        }
    }

    if ct_sum == 0 {
        0.0
    } else {
        weighted_sum / ct_sum as f64
    }
}

/// Time-weighted value of `counter` for a group, or [`NO_COVERAGE`] when no
/// sample can overlap the group.
pub fn time_weighted_counter_perf(slices: &[Slice], counter: &Counter) -> f64 {
    match extract_window(slices, counter) {
        Some(window) => time_weighted_average(slices, &window),
        None => NO_COVERAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slices(spans: &[(u64, u64)]) -> Vec<Slice> {
        spans
            .iter()
            .map(|&(ts, dur)| Slice::new(1, 0, ts, dur))
            .collect()
    }

    fn counter(timestamps: &[u64], values: &[f64]) -> Counter {
        Counter::new("test", "%").with_samples(timestamps.to_vec(), values.to_vec())
    }

    #[test]
    fn test_single_sample_after_slice_start() {
        let c = counter(&[5], &[42.0]);
        let group = slices(&[(0, 10)]);
        let window = extract_window(&group, &c).unwrap();
        assert_eq!(window.timestamps(), &[5]);
        assert_eq!(window.values(), &[42.0]);
        assert_eq!(time_weighted_average(&group, &window), 42.0);
    }

    #[test]
    fn test_no_sample_after_range_start() {
        let c = counter(&[0], &[42.0]);
        let group = slices(&[(0, 10)]);
        assert!(extract_window(&group, &c).is_none());
        assert_eq!(time_weighted_counter_perf(&group, &c), NO_COVERAGE);
    }

    #[test]
    fn test_empty_counter_has_no_coverage() {
        let c = counter(&[], &[]);
        assert_eq!(time_weighted_counter_perf(&slices(&[(0, 10)]), &c), NO_COVERAGE);
    }

    #[test]
    fn test_window_stops_after_first_sample_past_range_end() {
        let c = counter(&[1, 5, 12, 20, 30], &[1.0, 2.0, 3.0, 4.0, 5.0]);
        let group = slices(&[(3, 7)]);
        let window = extract_window(&group, &c).unwrap();
        // 1 is before the range start; 12 closes the interval covering [10, 12);
        // 20 and later cannot overlap.
        assert_eq!(window.timestamps(), &[5, 12]);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_window_uses_loose_envelope() {
        // The sample at 50 sits in the gap between the two slices.
        let c = counter(&[50, 200], &[9.0, 1.0]);
        let group = slices(&[(0, 10), (100, 10)]);
        let window = extract_window(&group, &c).unwrap();
        assert_eq!(window.timestamps(), &[50, 200]);
    }

    #[test]
    fn test_weighting_across_boundaries() {
        // [0, 10) sees 2.0 until 4, then 6.0 until 10.
        let c = counter(&[4, 16], &[2.0, 6.0]);
        let group = slices(&[(0, 10)]);
        let value = time_weighted_counter_perf(&group, &c);
        assert!((value - (4.0 * 2.0 + 6.0 * 6.0) / 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_sample_weighted_from_its_start() {
        let c = counter(&[50, 200], &[9.0, 1.0]);
        let group = slices(&[(0, 10), (100, 10)]);
        // First slice: the leading segment holds 9.0 for 10ns.
        // Second slice: (50, 200] ends past the slice, weighted from its own
        // start: 110 - 50 = 60ns of 1.0.
        let expected = (10.0 * 9.0 + 60.0 * 1.0) / 70.0;
        assert!((time_weighted_counter_perf(&group, &c) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_sample_ending_inside_slice() {
        let c = counter(&[2, 6, 20], &[100.0, 10.0, 30.0]);
        let group = slices(&[(4, 8)]);
        // (2, 6] → 10.0 for 2ns, (6, 20] → 30.0 for 6ns.
        let expected = (2.0 * 10.0 + 6.0 * 30.0) / 8.0;
        assert!((time_weighted_counter_perf(&group, &c) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_constant_value_is_preserved() {
        let group = slices(&[(0, 7), (3, 11), (40, 5), (60, 13)]);
        let spacings: &[&[u64]] = &[&[1], &[2, 3, 4, 90], &[7, 33, 41, 42, 43, 70], &[45, 61]];
        for timestamps in spacings {
            let values = vec![0.5; timestamps.len()];
            let c = counter(timestamps, &values);
            assert_eq!(time_weighted_counter_perf(&group, &c), 0.5, "{:?}", timestamps);
        }
    }

    #[test]
    fn test_zero_contribution_is_zero_not_sentinel() {
        let c = counter(&[5, 9], &[3.0, 4.0]);
        // Zero-length slice: envelope admits samples but nothing overlaps.
        let group = slices(&[(4, 0)]);
        assert_eq!(time_weighted_counter_perf(&group, &c), 0.0);
    }

    #[test]
    fn test_first_sample_past_slice_end() {
        // Only the first sample survives extraction and covers the whole slice.
        let c = counter(&[20, 30], &[3.0, 4.0]);
        let group = slices(&[(0, 10)]);
        assert_eq!(time_weighted_counter_perf(&group, &c), 3.0);
    }

    #[test]
    fn test_out_of_order_samples_are_ignored() {
        let c = counter(&[8, 3], &[1.0, 2.0]);
        let group = slices(&[(0, 10)]);
        // Only the leading segment (0, 8] carries weight.
        assert_eq!(time_weighted_counter_perf(&group, &c), 1.0);
    }

    #[test]
    fn test_huge_slices_saturate_contribution_time() {
        let half = u64::MAX / 2 + 1;
        let c = counter(&[u64::MAX - 1], &[2.0]);
        let group = slices(&[(0, half), (1, half)]);
        assert_eq!(time_weighted_counter_perf(&group, &c), 2.0);
    }

    #[test]
    fn test_dispatch_table() {
        assert!(counter_aggregator(AggregationKind::TimeWeightedAvg).is_some());
        for kind in [
            AggregationKind::Sum,
            AggregationKind::Average,
            AggregationKind::Min,
            AggregationKind::Max,
        ] {
            assert!(counter_aggregator(kind).is_none(), "{}", kind);
        }
    }
}
