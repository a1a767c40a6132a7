use anyhow::{Context, Result};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Decoded mono PCM.
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioData {
    pub fn duration(&self) -> f32 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f32 / self.sample_rate as f32
    }
}

pub fn decode_audio(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let audio = decode_source(Box::new(file), &hint)?;
    log::info!(
        "Decoded {}: {} samples, {}Hz, {:.1}s",
        path.display(),
        audio.samples.len(),
        audio.sample_rate,
        audio.duration()
    );
    Ok(audio)
}

/// Decodes the first audio track of `source` and averages its channels.
pub fn decode_source(source: Box<dyn MediaSource>, hint: &Hint) -> Result<AudioData> {
    let mut track = TrackReader::open(source, hint)?;
    let mut samples = Vec::new();
    while track.read_block(&mut samples)? {}

    if track.skipped > 0 {
        log::warn!("Skipped {} undecodable packets", track.skipped);
    }
    Ok(AudioData {
        samples,
        sample_rate: track.sample_rate,
    })
}

/// Packet-by-packet reader over one audio track, yielding mono blocks.
struct TrackReader {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    buffer: Option<SampleBuffer<f32>>,
    skipped: usize,
}

impl TrackReader {
    fn open(source: Box<dyn MediaSource>, hint: &Hint) -> Result<Self> {
        let stream = MediaSourceStream::new(source, Default::default());
        let probed = symphonia::default::get_probe()
            .format(hint, stream, &FormatOptions::default(), &MetadataOptions::default())
            .context("Failed to probe audio format")?;
        let format = probed.format;

        let (track_id, codec_params) = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .map(|t| (t.id, t.codec_params.clone()))
            .context("No audio tracks found")?;
        let sample_rate = codec_params.sample_rate.context("Unknown sample rate")?;

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .context("Failed to create audio decoder")?;

        Ok(Self {
            format,
            decoder,
            track_id,
            sample_rate,
            buffer: None,
            skipped: 0,
        })
    }

    /// Decodes the next packet of the track and appends its mono samples to
    /// `out`. Returns `false` once the stream is exhausted.
    fn read_block(&mut self, out: &mut Vec<f32>) -> Result<bool> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(false);
                }
                Err(e) => return Err(e).context("Failed to read audio packet"),
            };
            if packet.track_id() != self.track_id {
                continue;
            }

            let decoded = match self.decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(err)) => {
                    log::debug!("Undecodable packet at ts {}: {}", packet.ts(), err);
                    self.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e).context("Failed to decode audio packet"),
            };

            let spec = *decoded.spec();
            let needed = decoded.frames() * spec.channels.count();
            let buffer = match self.buffer.take() {
                Some(buffer) if buffer.capacity() >= needed => buffer,
                _ => SampleBuffer::new(decoded.capacity() as u64, spec),
            };
            let buffer = self.buffer.insert(buffer);
            buffer.copy_interleaved_ref(decoded);
            downmix_into(buffer.samples(), spec.channels.count(), out);
            return Ok(true);
        }
    }
}

/// Appends the per-frame channel average of `interleaved` to `out`.
pub fn downmix_into(interleaved: &[f32], channels: usize, out: &mut Vec<f32>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
    } else {
        out.extend(
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }
}
