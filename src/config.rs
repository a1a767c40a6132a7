use clap::ValueEnum;
use serde::Deserialize;
use std::path::Path;

use crate::error::TranscribeError;

/// How each frame's magnitude spectrum is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SpectrumMethod {
    /// Full-resolution FFT, `frame_size / 2` bins.
    #[default]
    Fft,
    /// 512-bin DFT over every 4th sample. Cheaper and coarser.
    Subsampled,
}

/// Where the pitch window is centered relative to an onset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PitchAnchor {
    /// The onset time itself, i.e. the start of the frame that produced it.
    #[default]
    Onset,
    /// Middle of that analysis frame.
    FrameCenter,
}

/// Parameters of the transcription pipeline.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TranscribeConfig {
    #[serde(default = "default_frame_size")]
    pub frame_size: usize,
    #[serde(default = "default_hop_size")]
    pub hop_size: usize,
    #[serde(default)]
    pub spectrum: SpectrumMethod,

    /// Normalized novelty a frame must exceed to become an onset.
    #[serde(default = "default_onset_threshold")]
    pub onset_threshold: f32,

    /// Pitch window length in samples. `None` uses `frame_size`.
    #[serde(default)]
    pub pitch_window: Option<usize>,
    #[serde(default)]
    pub pitch_anchor: PitchAnchor,
    #[serde(default = "default_silence_rms")]
    pub silence_rms: f32,
    /// Lowest frequency the lag search reaches (sets the longest lag).
    #[serde(default = "default_max_lag_hz")]
    pub max_lag_hz: f32,
    /// Highest frequency the lag search reaches (sets the shortest lag).
    #[serde(default = "default_min_lag_hz")]
    pub min_lag_hz: f32,
    #[serde(default = "default_min_pitch_hz")]
    pub min_pitch_hz: f32,
    #[serde(default = "default_max_pitch_hz")]
    pub max_pitch_hz: f32,

    /// Seconds within which a later note is merged into the previous one.
    #[serde(default = "default_min_gap")]
    pub min_gap: f32,

    #[serde(default = "default_min_ioi")]
    pub min_ioi: f32,
    #[serde(default = "default_min_bpm")]
    pub min_bpm: f32,
    #[serde(default = "default_max_bpm")]
    pub max_bpm: f32,
    #[serde(default = "default_fallback_bpm")]
    pub fallback_bpm: f32,

    #[serde(default = "default_collapse_epsilon")]
    pub collapse_epsilon: f32,
}

impl Default for TranscribeConfig {
    fn default() -> Self {
        Self {
            frame_size: default_frame_size(),
            hop_size: default_hop_size(),
            spectrum: SpectrumMethod::default(),
            onset_threshold: default_onset_threshold(),
            pitch_window: None,
            pitch_anchor: PitchAnchor::default(),
            silence_rms: default_silence_rms(),
            max_lag_hz: default_max_lag_hz(),
            min_lag_hz: default_min_lag_hz(),
            min_pitch_hz: default_min_pitch_hz(),
            max_pitch_hz: default_max_pitch_hz(),
            min_gap: default_min_gap(),
            min_ioi: default_min_ioi(),
            min_bpm: default_min_bpm(),
            max_bpm: default_max_bpm(),
            fallback_bpm: default_fallback_bpm(),
            collapse_epsilon: default_collapse_epsilon(),
        }
    }
}

impl TranscribeConfig {
    pub fn pitch_window_len(&self) -> usize {
        self.pitch_window.unwrap_or(self.frame_size)
    }

    pub fn validate(&self) -> Result<(), TranscribeError> {
        let invalid = |msg: String| Err(TranscribeError::InvalidConfig(msg));

        if self.frame_size < 2 {
            return invalid(format!("frame_size must be at least 2, got {}", self.frame_size));
        }
        if self.hop_size == 0 {
            return invalid("hop_size must be positive".into());
        }
        if self.pitch_window_len() == 0 {
            return invalid("pitch_window must be positive".into());
        }

        let positive = [
            ("silence_rms", self.silence_rms),
            ("max_lag_hz", self.max_lag_hz),
            ("min_lag_hz", self.min_lag_hz),
            ("min_pitch_hz", self.min_pitch_hz),
            ("max_pitch_hz", self.max_pitch_hz),
            ("min_bpm", self.min_bpm),
            ("max_bpm", self.max_bpm),
            ("fallback_bpm", self.fallback_bpm),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return invalid(format!("{} must be positive and finite, got {}", name, value));
            }
        }

        let non_negative = [
            ("onset_threshold", self.onset_threshold),
            ("min_gap", self.min_gap),
            ("min_ioi", self.min_ioi),
            ("collapse_epsilon", self.collapse_epsilon),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return invalid(format!("{} must be non-negative and finite, got {}", name, value));
            }
        }

        if self.min_lag_hz <= self.max_lag_hz {
            return invalid(format!(
                "min_lag_hz ({}) must be above max_lag_hz ({})",
                self.min_lag_hz, self.max_lag_hz
            ));
        }
        if self.min_pitch_hz >= self.max_pitch_hz {
            return invalid(format!(
                "pitch band is empty: {}..{} Hz",
                self.min_pitch_hz, self.max_pitch_hz
            ));
        }
        // Folding by doubling/halving needs at least one octave of room.
        if self.max_bpm < 2.0 * self.min_bpm {
            return invalid(format!(
                "tempo range {}..{} BPM is narrower than an octave",
                self.min_bpm, self.max_bpm
            ));
        }

        Ok(())
    }
}

fn default_frame_size() -> usize { 2048 }
fn default_hop_size() -> usize { 512 }
fn default_onset_threshold() -> f32 { 0.2 }
fn default_silence_rms() -> f32 { 0.002 }
fn default_max_lag_hz() -> f32 { 80.0 }
fn default_min_lag_hz() -> f32 { 1000.0 }
fn default_min_pitch_hz() -> f32 { 80.0 }
fn default_max_pitch_hz() -> f32 { 2000.0 }
fn default_min_gap() -> f32 { 0.08 }
fn default_min_ioi() -> f32 { 0.02 }
fn default_min_bpm() -> f32 { 60.0 }
fn default_max_bpm() -> f32 { 180.0 }
fn default_fallback_bpm() -> f32 { 120.0 }
fn default_collapse_epsilon() -> f32 { 1e-4 }

/// Output document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Tsv,
}

#[derive(Debug, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default)]
    pub lanes: Option<u32>,
}

/// Contents of a `notefall.toml` file.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transcription: TranscribeConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
