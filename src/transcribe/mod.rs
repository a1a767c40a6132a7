//! Audio-to-note transcription.
//!
//! Waveform → Hann-windowed frames → magnitude spectra → spectral-flux
//! onsets → autocorrelation pitch per onset → dedup → tempo from
//! inter-onset intervals → sixteenth-note quantization.

pub mod dedup;
pub mod note;
pub mod onset;
pub mod pitch;
pub mod quantize;
pub mod spectrum;
pub mod tempo;
pub mod window;

use rayon::prelude::*;
use serde::Serialize;

use crate::config::{PitchAnchor, TranscribeConfig};
use crate::error::TranscribeError;
use note::{PitchedNote, QuantizedNote};
use onset::OnsetCandidate;
use pitch::PitchParams;
use tempo::TempoParams;

/// Tempo used for quantization.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Tempo {
    pub bpm: f32,
    /// False when there were too few onsets and the fallback was used.
    pub estimated: bool,
}

/// Full result of one pipeline run, including intermediate stages.
#[derive(Clone, Debug)]
pub struct Transcription {
    pub frame_count: usize,
    pub onsets: Vec<OnsetCandidate>,
    /// Onsets that produced a pitch, before deduplication.
    pub pitched: Vec<PitchedNote>,
    pub deduplicated: Vec<PitchedNote>,
    pub tempo: Tempo,
    /// Grid step in seconds.
    pub step: f32,
    pub notes: Vec<QuantizedNote>,
}

impl From<&TranscribeConfig> for PitchParams {
    fn from(config: &TranscribeConfig) -> Self {
        Self {
            silence_rms: config.silence_rms,
            max_lag_hz: config.max_lag_hz,
            min_lag_hz: config.min_lag_hz,
            min_pitch_hz: config.min_pitch_hz,
            max_pitch_hz: config.max_pitch_hz,
        }
    }
}

impl From<&TranscribeConfig> for TempoParams {
    fn from(config: &TranscribeConfig) -> Self {
        Self {
            min_ioi: config.min_ioi,
            min_bpm: config.min_bpm,
            max_bpm: config.max_bpm,
        }
    }
}

/// Transcribes a mono waveform into a chronological, tempo-quantized note
/// sequence.
pub fn transcribe(
    samples: &[f32],
    sample_rate: u32,
    config: &TranscribeConfig,
) -> Result<Vec<QuantizedNote>, TranscribeError> {
    analyze(samples, sample_rate, config).map(|t| t.notes)
}

/// Runs the whole pipeline and keeps every intermediate result.
pub fn analyze(
    samples: &[f32],
    sample_rate: u32,
    config: &TranscribeConfig,
) -> Result<Transcription, TranscribeError> {
    validate_input(samples, sample_rate)?;
    config.validate()?;

    log::debug!(
        "Transcribing {} samples at {} Hz (frame={}, hop={}, spectrum={:?})",
        samples.len(),
        sample_rate,
        config.frame_size,
        config.hop_size,
        config.spectrum
    );

    let frames = spectrum::spectrogram(
        samples,
        sample_rate,
        config.frame_size,
        config.hop_size,
        config.spectrum,
    );
    let onsets = onset::detect_onsets(&frames, config.onset_threshold);

    let pitched = pitch_onsets(samples, sample_rate, &onsets, config);
    log::debug!("{} of {} onsets have a pitch", pitched.len(), onsets.len());

    let deduplicated = dedup::dedup_notes(&pitched, config.min_gap);

    let times: Vec<f32> = deduplicated.iter().map(|n| n.time).collect();
    let intervals = tempo::inter_onset_intervals(&times);
    let tempo = match tempo::estimate_bpm(&intervals, &TempoParams::from(config)) {
        Some(bpm) => Tempo {
            bpm: bpm as f32,
            estimated: true,
        },
        None => {
            log::debug!(
                "Not enough onsets for a tempo estimate, using {} BPM",
                config.fallback_bpm
            );
            Tempo {
                bpm: config.fallback_bpm,
                estimated: false,
            }
        }
    };

    let notes = quantize::quantize_notes(&deduplicated, tempo.bpm, config.collapse_epsilon);
    log::info!("Estimated tempo {} BPM, {} notes", tempo.bpm, notes.len());

    Ok(Transcription {
        frame_count: frames.len(),
        onsets,
        pitched,
        deduplicated,
        tempo,
        step: quantize::step_duration(tempo.bpm),
        notes,
    })
}

fn validate_input(samples: &[f32], sample_rate: u32) -> Result<(), TranscribeError> {
    if sample_rate == 0 {
        return Err(TranscribeError::InvalidSampleRate(sample_rate));
    }
    if let Some((index, &value)) = samples.iter().enumerate().find(|(_, s)| !s.is_finite()) {
        return Err(TranscribeError::NonFiniteSample { index, value });
    }
    Ok(())
}

/// Estimates a pitch for every onset in parallel, dropping unvoiced ones.
fn pitch_onsets(
    samples: &[f32],
    sample_rate: u32,
    onsets: &[OnsetCandidate],
    config: &TranscribeConfig,
) -> Vec<PitchedNote> {
    let params = PitchParams::from(config);
    let window_len = config.pitch_window_len();

    onsets
        .par_iter()
        .filter_map(|onset| {
            let center = match config.pitch_anchor {
                PitchAnchor::FrameCenter => onset.sample + config.frame_size / 2,
                PitchAnchor::Onset => onset.sample,
            };
            let window = pitch::centered_window(samples, center, window_len);
            pitch::estimate_pitch(window, sample_rate, &params).map(|pitch| PitchedNote {
                time: onset.time,
                pitch,
            })
        })
        .collect()
}
