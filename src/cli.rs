use clap::Parser;
use std::path::PathBuf;

use notefall::config::{OutputFormat, PitchAnchor, SpectrumMethod};

#[derive(Parser, Debug)]
#[command(name = "notefall", about = "Approximate note transcription of audio files")]
pub struct Cli {
    /// Input audio files (WAV, MP3, FLAC, OGG)
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (single input only). Defaults to stdout.
    #[arg(short, long, conflicts_with = "output_dir")]
    pub output: Option<PathBuf>,

    /// Directory receiving one `<input stem>.<format>` file per input
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Config file (TOML). Defaults to ./notefall.toml or the user config dir.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Assign each note to one of N display lanes
    #[arg(long)]
    pub lanes: Option<u32>,

    /// Analysis frame size in samples
    #[arg(long)]
    pub frame_size: Option<usize>,

    /// Hop between frames in samples
    #[arg(long)]
    pub hop_size: Option<usize>,

    /// Normalized onset threshold (0.0-1.0)
    #[arg(long)]
    pub threshold: Option<f32>,

    /// Minimum gap between notes in seconds
    #[arg(long)]
    pub min_gap: Option<f32>,

    /// Tempo used when too few onsets are found
    #[arg(long)]
    pub fallback_bpm: Option<f32>,

    /// Spectrum estimator
    #[arg(long, value_enum)]
    pub spectrum: Option<SpectrumMethod>,

    /// Where pitch windows are centered
    #[arg(long, value_enum)]
    pub pitch_anchor: Option<PitchAnchor>,
}
