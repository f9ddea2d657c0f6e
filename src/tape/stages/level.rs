use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, db_to_lin};

pub const MIN_OUTPUT_GAIN_DB: f32 = -24.0;
pub const MAX_OUTPUT_GAIN_DB: f32 = 12.0;

/// Post-filter gain staging ahead of the clipper.
pub struct LevelStage {
    gain: f32,
}

impl LevelStage {
    pub fn new(gain: f32) -> Self {
        let mut stage = Self { gain: 1.0 };
        stage.set_gain(gain);
        stage
    }

    pub fn from_db(db: f32) -> Self {
        Self::new(gain_from_db(db))
    }

    /// Linear gain, held to the [-24, +12] dB range.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = clamp_finite(
            gain,
            db_to_lin(MIN_OUTPUT_GAIN_DB),
            db_to_lin(MAX_OUTPUT_GAIN_DB),
        );
    }

    pub const fn gain(&self) -> f32 {
        self.gain
    }
}

/// Clamp an output gain to [-24, +12] dB and convert it to linear.
pub fn gain_from_db(db: f32) -> f32 {
    db_to_lin(clamp_finite(db, MIN_OUTPUT_GAIN_DB, MAX_OUTPUT_GAIN_DB))
}

impl Stage for LevelStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        input * self.gain
    }
}
