use super::note::{PitchedNote, QuantizedNote};

/// Grid subdivisions per beat (sixteenth notes).
pub const STEPS_PER_BEAT: f32 = 4.0;

/// Length of one grid step in seconds at `bpm`.
pub fn step_duration(bpm: f32) -> f32 {
    60.0 / bpm / STEPS_PER_BEAT
}

pub fn snap(time: f32, step: f32) -> f32 {
    (time / step).round() * step
}

/// Snaps each note start to the grid, then drops any note landing within
/// `epsilon` of the previously kept one.
pub fn quantize_notes(notes: &[PitchedNote], bpm: f32, epsilon: f32) -> Vec<QuantizedNote> {
    let step = step_duration(bpm);
    let mut out: Vec<QuantizedNote> = Vec::with_capacity(notes.len());
    for note in notes {
        let start_time = snap(note.time, step);
        let distinct = out
            .last()
            .map_or(true, |last| (start_time - last.start_time).abs() > epsilon);
        if distinct {
            out.push(QuantizedNote {
                start_time,
                pitch: note.pitch,
            });
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn note(time: f32, pitch: i32) -> PitchedNote {
        PitchedNote { time, pitch }
    }

    #[test]
    fn sixteenth_grid_at_120() {
        assert_eq!(step_duration(120.0), 0.125);
        assert_eq!(step_duration(60.0), 0.25);
    }

    #[test]
    fn snaps_to_nearest_step() {
        let notes = [note(0.01, 60), note(0.49, 62), note(0.93, 64)];
        let q = quantize_notes(&notes, 120.0, 1e-4);
        let times: Vec<f32> = q.iter().map(|n| n.start_time).collect();
        assert_eq!(times, vec![0.0, 0.5, 0.875]);
        assert_eq!(q[1].pitch, 62);
    }

    #[test]
    fn collisions_keep_the_first_note() {
        let notes = [note(0.49, 60), note(0.52, 67), note(0.74, 64)];
        let q = quantize_notes(&notes, 120.0, 1e-4);
        assert_eq!(
            q,
            vec![
                QuantizedNote { start_time: 0.5, pitch: 60 },
                QuantizedNote { start_time: 0.75, pitch: 64 },
            ]
        );
    }

    #[test]
    fn quantizing_twice_is_stable() {
        let notes: Vec<PitchedNote> = (0..40)
            .map(|i| note(i as f32 * 0.173 + 0.011, 50 + i % 12))
            .collect();
        for bpm in [97.0, 120.0, 143.0] {
            let once = quantize_notes(&notes, bpm, 1e-4);
            let again: Vec<PitchedNote> = once
                .iter()
                .map(|n| note(n.start_time, n.pitch))
                .collect();
            assert_eq!(quantize_notes(&again, bpm, 1e-4), once);
        }
    }

    #[test]
    fn empty_input() {
        assert!(quantize_notes(&[], 120.0, 1e-4).is_empty());
    }
}
