use serde::Serialize;
use std::io::Write;

use crate::config::OutputFormat;
use crate::transcribe::Transcription;

/// Pitch range spread across the lanes of a falling-note display.
pub const LANE_MIN_PITCH: i32 = 40;
pub const LANE_MAX_PITCH: i32 = 88;

/// Maps a note number to one of `lanes` columns, clamping to the
/// [`LANE_MIN_PITCH`, `LANE_MAX_PITCH`] range first.
pub fn pitch_to_lane(pitch: i32, lanes: u32) -> u32 {
    if lanes <= 1 {
        return 0;
    }
    let clamped = pitch.clamp(LANE_MIN_PITCH, LANE_MAX_PITCH);
    let t = (clamped - LANE_MIN_PITCH) as f32 / (LANE_MAX_PITCH - LANE_MIN_PITCH) as f32;
    (t * (lanes - 1) as f32).floor() as u32
}

#[derive(Debug, Serialize)]
pub struct NoteRecord {
    pub start_time: f32,
    pub pitch: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lane: Option<u32>,
}

/// Everything written for one transcribed input.
#[derive(Debug, Serialize)]
pub struct NoteDocument {
    pub source: String,
    pub sample_rate: u32,
    pub duration: f32,
    pub bpm: f32,
    pub tempo_estimated: bool,
    pub step: f32,
    pub notes: Vec<NoteRecord>,
}

impl NoteDocument {
    pub fn new(
        source: &str,
        sample_rate: u32,
        duration: f32,
        transcription: &Transcription,
        lanes: Option<u32>,
    ) -> Self {
        let notes = transcription
            .notes
            .iter()
            .map(|n| NoteRecord {
                start_time: n.start_time,
                pitch: n.pitch,
                lane: lanes.map(|l| pitch_to_lane(n.pitch, l)),
            })
            .collect();

        Self {
            source: source.to_string(),
            sample_rate,
            duration,
            bpm: transcription.tempo.bpm,
            tempo_estimated: transcription.tempo.estimated,
            step: transcription.step,
            notes,
        }
    }

    pub fn write<W: Write>(&self, writer: &mut W, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, self)?;
                writeln!(writer)?;
            }
            OutputFormat::Tsv => {
                for note in &self.notes {
                    match note.lane {
                        Some(lane) => {
                            writeln!(writer, "{:.4}\t{}\t{}", note.start_time, note.pitch, lane)?
                        }
                        None => writeln!(writer, "{:.4}\t{}", note.start_time, note.pitch)?,
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcribe::note::QuantizedNote;
    use crate::transcribe::Tempo;

    fn transcription() -> Transcription {
        Transcription {
            frame_count: 10,
            onsets: vec![],
            pitched: vec![],
            deduplicated: vec![],
            tempo: Tempo {
                bpm: 120.0,
                estimated: true,
            },
            step: 0.125,
            notes: vec![
                QuantizedNote { start_time: 0.25, pitch: 69 },
                QuantizedNote { start_time: 0.75, pitch: 30 },
            ],
        }
    }

    #[test]
    fn lanes_span_clamped_range() {
        assert_eq!(pitch_to_lane(40, 8), 0);
        assert_eq!(pitch_to_lane(20, 8), 0);
        assert_eq!(pitch_to_lane(88, 8), 7);
        assert_eq!(pitch_to_lane(127, 8), 7);
        assert_eq!(pitch_to_lane(64, 8), 3);
        assert_eq!(pitch_to_lane(64, 1), 0);
    }

    #[test]
    fn json_document_has_notes_and_tempo() {
        let doc = NoteDocument::new("a.wav", 44100, 2.0, &transcription(), None);
        let mut buf = Vec::new();
        doc.write(&mut buf, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["bpm"], 120.0);
        assert_eq!(value["tempo_estimated"], true);
        assert_eq!(value["notes"][0]["pitch"], 69);
        assert_eq!(value["notes"][1]["start_time"], 0.75);
        assert!(value["notes"][0].get("lane").is_none());
    }

    #[test]
    fn tsv_lists_one_note_per_line() {
        let doc = NoteDocument::new("a.wav", 44100, 2.0, &transcription(), Some(8));
        let mut buf = Vec::new();
        doc.write(&mut buf, OutputFormat::Tsv).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "0.2500\t69\t4\n0.7500\t30\t0\n");
    }
}
