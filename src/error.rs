use thiserror::Error;

/// Input rejected at the boundary of the transcription pipeline.
///
/// Silence, unvoiced onsets and too few onsets for a tempo are not errors;
/// they show up as empty or fallback results instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TranscribeError {
    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("non-finite sample {value} at index {index}")]
    NonFiniteSample { index: usize, value: f32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
