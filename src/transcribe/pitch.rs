/// Bounds and gates for autocorrelation pitch estimation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PitchParams {
    pub silence_rms: f32,
    /// Lowest frequency searched; sets the longest lag.
    pub max_lag_hz: f32,
    /// Highest frequency searched; sets the shortest lag.
    pub min_lag_hz: f32,
    /// Accepted frequencies lie strictly between these bounds.
    pub min_pitch_hz: f32,
    pub max_pitch_hz: f32,
}

impl Default for PitchParams {
    fn default() -> Self {
        Self {
            silence_rms: 0.002,
            max_lag_hz: 80.0,
            min_lag_hz: 1000.0,
            min_pitch_hz: 80.0,
            max_pitch_hz: 2000.0,
        }
    }
}

pub fn rms(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    (window.iter().map(|s| s * s).sum::<f32>() / window.len() as f32).sqrt()
}

/// Fundamental frequency of `window` in Hz, or `None` when the window is
/// too quiet or has no positively correlated lag in range.
pub fn detect_frequency(window: &[f32], sample_rate: u32, params: &PitchParams) -> Option<f32> {
    if rms(window) < params.silence_rms {
        return None;
    }

    let sr = sample_rate as f32;
    let min_lag = ((sr / params.min_lag_hz).floor() as usize).max(1);
    let max_lag = (sr / params.max_lag_hz).floor() as usize;

    let mut best_lag = None;
    let mut best_corr = 0.0f32;
    for lag in min_lag..=max_lag {
        if lag >= window.len() {
            break;
        }
        let corr: f32 = window[..window.len() - lag]
            .iter()
            .zip(&window[lag..])
            .map(|(a, b)| a * b)
            .sum();
        if corr > best_corr {
            best_corr = corr;
            best_lag = Some(lag);
        }
    }

    best_lag.map(|lag| sr / lag as f32)
}

/// Nearest equal-tempered note number, A4 = 440 Hz = 69.
pub fn freq_to_midi(freq: f32) -> i32 {
    (69.0 + 12.0 * (freq / 440.0).log2()).round() as i32
}

/// Estimated note number of `window`, if it holds a plausible pitch.
pub fn estimate_pitch(window: &[f32], sample_rate: u32, params: &PitchParams) -> Option<i32> {
    let freq = detect_frequency(window, sample_rate, params)?;
    if freq > params.min_pitch_hz && freq < params.max_pitch_hz {
        Some(freq_to_midi(freq))
    } else {
        None
    }
}

/// Slice of `samples` of at most `len` samples centered on `center`,
/// clamped to the start of the buffer.
pub fn centered_window(samples: &[f32], center: usize, len: usize) -> &[f32] {
    let start = center.saturating_sub(len / 2).min(samples.len());
    let end = (start + len).min(samples.len());
    &samples[start..end]
}
