/// Hann window coefficients, `0.5 * (1 - cos(2πi / (size - 1)))`.
///
/// `size` must be at least 2.
pub fn hann_window(size: usize) -> Vec<f32> {
    debug_assert!(size >= 2, "Hann window needs at least two points");
    (0..size)
        .map(|i| {
            0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / (size - 1) as f32).cos())
        })
        .collect()
}

/// Returns a copy of `frame` scaled by `window`.
pub fn apply_window(frame: &[f32], window: &[f32]) -> Vec<f32> {
    frame.iter().zip(window).map(|(s, w)| s * w).collect()
}

/// Returns a Hann-windowed copy of `frame`.
pub fn apply_hann(frame: &[f32]) -> Vec<f32> {
    apply_window(frame, &hann_window(frame.len()))
}
