use super::note::PitchedNote;

/// Greedy forward merge: a note is kept only if it starts more than
/// `min_gap` seconds after the last kept note. Input must be sorted by time.
pub fn dedup_notes(notes: &[PitchedNote], min_gap: f32) -> Vec<PitchedNote> {
    let mut kept: Vec<PitchedNote> = Vec::with_capacity(notes.len());
    for note in notes {
        let far_enough = kept.last().map_or(true, |last| note.time - last.time > min_gap);
        if far_enough {
            kept.push(*note);
        }
    }
    kept
}
