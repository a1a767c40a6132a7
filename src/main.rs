mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use cli::Cli;
use notefall::audio::decode::decode_audio;
use notefall::config::{self, Config, OutputFormat};
use notefall::output::NoteDocument;
use notefall::transcribe::analyze;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    let mut cfg = match find_config_path(cli.config.as_ref()) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) if cli.config.is_some() => {
                return Err(err.context(format!("Failed to load config from {}", path.display())));
            }
            Err(err) => {
                log::warn!("Ignoring config {}: {}", path.display(), err);
                Config::default()
            }
        },
        None => Config::default(),
    };
    apply_overrides(&cli, &mut cfg);
    cfg.transcription
        .validate()
        .context("Invalid transcription settings")?;

    if cli.output.is_some() && cli.inputs.len() > 1 {
        anyhow::bail!("--output takes a single input; use --output-dir for several");
    }
    if let Some(ref dir) = cli.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let pb = if cli.inputs.len() > 1 {
        let pb = ProgressBar::new(cli.inputs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files {msg}")
                .context("Invalid progress bar template")?
                .progress_chars("=>-"),
        );
        Some(pb)
    } else {
        None
    };

    for input in &cli.inputs {
        if let Some(ref pb) = pb {
            pb.set_message(input.display().to_string());
        }
        process_file(input, &cli, &cfg)?;
        if let Some(ref pb) = pb {
            pb.inc(1);
        }
    }

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }
    Ok(())
}

/// Explicit `--config` path, else `./notefall.toml`, else the user config dir.
fn find_config_path(explicit: Option<&PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.clone());
    }
    let local = PathBuf::from("notefall.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("notefall").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("notefall").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}

/// Flags given on the command line win over the config file.
fn apply_overrides(cli: &Cli, cfg: &mut Config) {
    let t = &mut cfg.transcription;
    if let Some(frame_size) = cli.frame_size {
        t.frame_size = frame_size;
    }
    if let Some(hop_size) = cli.hop_size {
        t.hop_size = hop_size;
    }
    if let Some(threshold) = cli.threshold {
        t.onset_threshold = threshold;
    }
    if let Some(min_gap) = cli.min_gap {
        t.min_gap = min_gap;
    }
    if let Some(bpm) = cli.fallback_bpm {
        t.fallback_bpm = bpm;
    }
    if let Some(spectrum) = cli.spectrum {
        t.spectrum = spectrum;
    }
    if let Some(anchor) = cli.pitch_anchor {
        t.pitch_anchor = anchor;
    }

    if let Some(format) = cli.format {
        cfg.output.format = format;
    }
    if cli.lanes.is_some() {
        cfg.output.lanes = cli.lanes;
    }
}

fn process_file(input: &Path, cli: &Cli, cfg: &Config) -> Result<()> {
    let audio = decode_audio(input)?;

    let transcription = analyze(&audio.samples, audio.sample_rate, &cfg.transcription)
        .with_context(|| format!("Failed to transcribe {}", input.display()))?;
    log::info!(
        "{}: {} onsets, {} notes at {} BPM{}",
        input.display(),
        transcription.onsets.len(),
        transcription.notes.len(),
        transcription.tempo.bpm,
        if transcription.tempo.estimated { "" } else { " (fallback)" }
    );

    let doc = NoteDocument::new(
        &input.display().to_string(),
        audio.sample_rate,
        audio.duration(),
        &transcription,
        cfg.output.lanes,
    );

    let format = cfg.output.format;
    match output_path(input, cli, format) {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            doc.write(&mut writer, format)?;
            writer.flush()?;
            log::info!("Wrote {}", path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            doc.write(&mut lock, format)?;
        }
    }
    Ok(())
}

fn output_path(input: &Path, cli: &Cli, format: OutputFormat) -> Option<PathBuf> {
    if let Some(ref path) = cli.output {
        return Some(path.clone());
    }
    let dir = cli.output_dir.as_ref()?;
    let stem = input.file_stem().map_or_else(
        || "notes".to_string(),
        |s| s.to_string_lossy().into_owned(),
    );
    let ext = match format {
        OutputFormat::Json => "json",
        OutputFormat::Tsv => "tsv",
    };
    Some(dir.join(format!("{}.{}", stem, ext)))
}
