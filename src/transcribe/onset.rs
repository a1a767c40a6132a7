use super::spectrum::SpectrumFrame;

/// A frame whose spectral novelty peaked above the onset threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OnsetCandidate {
    /// Frame start in seconds.
    pub time: f32,
    /// Index of the frame's first sample.
    pub sample: usize,
}

/// Half-wave rectified spectral flux per frame. Entry 0 is always zero.
pub fn spectral_flux(frames: &[SpectrumFrame]) -> Vec<f32> {
    let mut flux = vec![0.0f32; frames.len()];
    for i in 1..frames.len() {
        flux[i] = frames[i]
            .magnitudes
            .iter()
            .zip(frames[i - 1].magnitudes.iter())
            .map(|(cur, prev)| (cur - prev).max(0.0))
            .sum();
    }
    flux
}

/// Scales `values` so the maximum becomes 1.0. All-zero input is left as is.
pub fn normalize_peak(values: &mut [f32]) {
    let max = values.iter().copied().fold(0.0f32, f32::max);
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

/// Spectral flux normalized to a peak of 1.0.
pub fn novelty_curve(frames: &[SpectrumFrame]) -> Vec<f32> {
    let mut novelty = spectral_flux(frames);
    normalize_peak(&mut novelty);
    novelty
}

/// Indices `i` in `2..len-2` whose novelty exceeds `threshold` and is a local
/// maximum. Equal neighbours resolve to the earlier index: the comparison
/// with `i-1` is strict, the one with `i+1` is not.
pub fn pick_peaks(novelty: &[f32], threshold: f32) -> Vec<usize> {
    let end = novelty.len().saturating_sub(2);
    (2..end)
        .filter(|&i| {
            novelty[i] > threshold && novelty[i] > novelty[i - 1] && novelty[i] >= novelty[i + 1]
        })
        .collect()
}

/// Onset candidates in chronological order.
pub fn detect_onsets(frames: &[SpectrumFrame], threshold: f32) -> Vec<OnsetCandidate> {
    let novelty = novelty_curve(frames);
    let peaks = pick_peaks(&novelty, threshold);
    log::debug!(
        "Onset detection: {} frames, {} peaks above {:.2}",
        frames.len(),
        peaks.len(),
        threshold
    );
    peaks
        .into_iter()
        .map(|i| OnsetCandidate {
            time: frames[i].time,
            sample: frames[i].start,
        })
        .collect()
}
