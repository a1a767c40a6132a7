use serde::Serialize;

/// An onset paired with its estimated pitch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PitchedNote {
    /// Onset time in seconds.
    pub time: f32,
    pub pitch: i32,
}

/// A note snapped to the tempo grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct QuantizedNote {
    pub start_time: f32,
    pub pitch: i32,
}
