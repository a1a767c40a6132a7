//! # notefall
//!
//! Approximate transcription of a mono recording into a note sequence:
//! spectral-flux onsets, autocorrelation pitch per onset, and start times
//! quantized to a sixteenth-note grid at an estimated tempo.
//!
//! ```no_run
//! use notefall::{transcribe, TranscribeConfig};
//!
//! let samples: Vec<f32> = vec![]; // mono PCM
//! let notes = transcribe(&samples, 44100, &TranscribeConfig::default())?;
//! for note in &notes {
//!     println!("{:.3}s  {}", note.start_time, note.pitch);
//! }
//! # Ok::<(), notefall::TranscribeError>(())
//! ```

pub mod audio;
pub mod config;
pub mod error;
pub mod output;
pub mod transcribe;

pub use config::{PitchAnchor, SpectrumMethod, TranscribeConfig};
pub use error::TranscribeError;
pub use transcribe::note::{PitchedNote, QuantizedNote};
pub use transcribe::{analyze, transcribe, Tempo, Transcription};
