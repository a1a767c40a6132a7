use std::collections::BTreeMap;

/// Limits for inter-onset tempo estimation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TempoParams {
    /// Intervals at or below this many seconds are ignored.
    pub min_ioi: f32,
    /// Folding range `[min_bpm, max_bpm)`.
    pub min_bpm: f32,
    pub max_bpm: f32,
}

impl Default for TempoParams {
    fn default() -> Self {
        Self {
            min_ioi: 0.02,
            min_bpm: 60.0,
            max_bpm: 180.0,
        }
    }
}

/// Differences between consecutive onset times.
pub fn inter_onset_intervals(times: &[f32]) -> Vec<f32> {
    times.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Doubles or halves `bpm` until it lies in `[min_bpm, max_bpm)`.
///
/// Returns `bpm` unchanged when it is not positive and finite, or when the
/// range does not span at least an octave, since no doubling reaches it.
pub fn fold_bpm(bpm: f32, min_bpm: f32, max_bpm: f32) -> f32 {
    if !(bpm.is_finite() && bpm > 0.0) || !(min_bpm > 0.0 && max_bpm >= 2.0 * min_bpm) {
        return bpm;
    }
    let mut b = bpm;
    while b < min_bpm {
        b *= 2.0;
    }
    while b >= max_bpm {
        b /= 2.0;
    }
    b
}

/// Most frequent folded tempo (rounded to whole BPM) among `intervals`.
///
/// Returns `None` with fewer than two intervals or when every interval is
/// too short to count. Ties go to the slowest tempo.
pub fn estimate_bpm(intervals: &[f32], params: &TempoParams) -> Option<u32> {
    if intervals.len() < 2 {
        return None;
    }

    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for &dt in intervals {
        if dt <= params.min_ioi || dt <= 0.0 || !dt.is_finite() {
            continue;
        }
        let bpm = fold_bpm(60.0 / dt, params.min_bpm, params.max_bpm);
        *counts.entry(bpm.round() as u32).or_insert(0) += 1;
    }

    let mut best: Option<(u32, usize)> = None;
    for (bpm, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((bpm, count));
        }
    }
    best.map(|(bpm, _)| bpm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folded_tempo_stays_in_range() {
        let mut dt = 0.001f32;
        while dt < 60.0 {
            let b = fold_bpm(60.0 / dt, 60.0, 180.0);
            assert!((60.0..180.0).contains(&b), "dt={} folded to {}", dt, b);
            dt *= 1.07;
        }
    }

    #[test]
    fn folding_preserves_in_range_values() {
        assert_eq!(fold_bpm(120.0, 60.0, 180.0), 120.0);
        assert_eq!(fold_bpm(240.0, 60.0, 180.0), 120.0);
        assert_eq!(fold_bpm(30.0, 60.0, 180.0), 60.0);
        assert_eq!(fold_bpm(180.0, 60.0, 180.0), 90.0);
    }

    #[test]
    fn degenerate_tempo_input_is_left_alone() {
        assert_eq!(fold_bpm(0.0, 60.0, 180.0), 0.0);
        assert_eq!(fold_bpm(-90.0, 60.0, 180.0), -90.0);
        assert_eq!(fold_bpm(f32::INFINITY, 60.0, 180.0), f32::INFINITY);
        assert!(fold_bpm(f32::NAN, 60.0, 180.0).is_nan());
        assert_eq!(fold_bpm(100.0, 0.0, 180.0), 100.0);
        assert_eq!(fold_bpm(100.0, 60.0, 100.0), 100.0);

        let params = TempoParams {
            min_ioi: 0.0,
            ..TempoParams::default()
        };
        assert_eq!(estimate_bpm(&[0.0, 0.0], &params), None);
        assert_eq!(estimate_bpm(&[-0.5, f32::NAN, f32::INFINITY], &params), None);
        assert_eq!(estimate_bpm(&[0.0, 0.5, 0.5], &params), Some(120));
    }

    #[test]
    fn octave_related_intervals_agree() {
        // Quarter notes and eighth notes at 120 BPM.
        let intervals = [0.5, 0.25, 0.5, 1.0];
        assert_eq!(estimate_bpm(&intervals, &TempoParams::default()), Some(120));
    }

    #[test]
    fn most_common_tempo_wins() {
        let intervals = [0.5, 0.5, 0.6, 0.5];
        assert_eq!(estimate_bpm(&intervals, &TempoParams::default()), Some(120));
    }

    #[test]
    fn ties_go_to_the_slowest_tempo() {
        let intervals = [0.6, 0.5];
        assert_eq!(estimate_bpm(&intervals, &TempoParams::default()), Some(100));
    }

    #[test]
    fn insufficient_data_has_no_tempo() {
        let params = TempoParams::default();
        assert_eq!(estimate_bpm(&[], &params), None);
        assert_eq!(estimate_bpm(&[0.5], &params), None);
        assert_eq!(estimate_bpm(&[0.01, 0.02], &params), None);
    }

    #[test]
    fn intervals_from_times() {
        assert_eq!(inter_onset_intervals(&[0.0, 0.5, 1.5]), vec![0.5, 1.0]);
        assert!(inter_onset_intervals(&[1.0]).is_empty());
    }
}
