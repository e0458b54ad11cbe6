//! Busy and wall time of a group of GPU slices

use vantage_shared::types::trace::Slice;

/// Time a group occupied the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GroupTime {
    /// Sum of slice durations; overlapping slices are counted once each.
    /// Clamped to `u64::MAX`.
    pub gpu_time: u64,

    /// Length of the union of the slices
    pub wall_time: u64,
}

/// Compute busy and wall time of a group.
///
/// `slices` must be sorted ascending by start timestamp.
pub fn gpu_time_for_group(slices: &[Slice]) -> GroupTime {
    let mut time = GroupTime::default();
    let mut last_end = 0u64;

    for slice in slices {
        let end = slice.end();
        time.gpu_time = time.gpu_time.saturating_add(slice.dur);

        let mut duration = slice.dur;
        if slice.ts < last_end {
            if end <= last_end {
                // Contained in what has already been counted.
                continue;
            }
            duration -= last_end - slice.ts;
        }
        time.wall_time = time.wall_time.saturating_add(duration);
        last_end = end;
    }

    time
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

    #[test]
    fn test_single_slice() {
        let time = gpu_time_for_group(&slices(&[(0, 10)]));
        assert_eq!(time, GroupTime { gpu_time: 10, wall_time: 10 });
    }

    #[test]
    fn test_contained_slice_adds_no_wall_time() {
        let time = gpu_time_for_group(&slices(&[(0, 10), (5, 3)]));
        assert_eq!(time.gpu_time, 13);
        assert_eq!(time.wall_time, 10);
    }

    #[test]
    fn test_partial_overlap_adds_tail() {
        let time = gpu_time_for_group(&slices(&[(0, 10), (5, 3), (8, 5)]));
        assert_eq!(time.gpu_time, 18);
        assert_eq!(time.wall_time, 13);
    }

    #[test]
    fn test_disjoint_slices_wall_equals_busy() {
        let time = gpu_time_for_group(&slices(&[(0, 10), (10, 5), (100, 1)]));
        assert_eq!(time.gpu_time, 16);
        assert_eq!(time.wall_time, 16);
    }

    #[test]
    fn test_contained_slice_keeps_last_end() {
        // (2, 3) ends at 5, which must not pull last_end back from 10.
        let time = gpu_time_for_group(&slices(&[(0, 10), (2, 3), (9, 4)]));
        assert_eq!(time.gpu_time, 17);
        assert_eq!(time.wall_time, 13);
    }

    #[test]
    fn test_empty_and_zero_length() {
        assert_eq!(gpu_time_for_group(&[]), GroupTime::default());
        let time = gpu_time_for_group(&slices(&[(5, 0), (5, 0)]));
        assert_eq!(time, GroupTime::default());
    }

    #[test]
    fn test_busy_time_saturates() {
        let half = u64::MAX / 2 + 1;
        let time = gpu_time_for_group(&slices(&[(0, half), (0, half)]));
        assert_eq!(time.gpu_time, u64::MAX);
        assert_eq!(time.wall_time, half);
    }

    #[test]
    fn test_wall_never_exceeds_busy() {
        let cases: &[&[(u64, u64)]] = &[
            &[(0, 4), (1, 1), (2, 8), (3, 2), (20, 5), (22, 1)],
            &[(0, 100), (0, 100), (0, 100)],
            &[(10, 5), (12, 7), (30, 2), (31, 10), (35, 1)],
        ];
        for spans in cases {
            let time = gpu_time_for_group(&slices(spans));
            assert!(time.wall_time <= time.gpu_time, "{:?}", spans);
            assert!(time.wall_time < time.gpu_time, "overlap in {:?}", spans);
        }
    }
}
