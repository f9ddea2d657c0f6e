use crate::tape::stages::Stage;
use crate::tape::stages::common::clamp_finite;

pub const MIN_RESAMPLE_RATE: f32 = 0.1;
pub const MAX_RESAMPLE_RATE: f32 = 1.0;

/// Zero-order hold sample-rate reduction.
///
/// A new input is latched every `1 / rate` samples (the downsample factor),
/// tracked with a fractional phase counter so non-integer factors dither
/// between neighbouring hold lengths. Aliasing is intended. The hold and
/// counter carry over between blocks.
pub struct ResamplerStage {
    rate: f32,
    counter: f32,
    held: f32,
}

impl ResamplerStage {
    pub fn new(rate: f32) -> Self {
        let mut stage = Self {
            rate: MAX_RESAMPLE_RATE,
            counter: 1.0,
            held: 0.0,
        };
        stage.set_rate(rate);
        stage
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = clamp_finite(rate, MIN_RESAMPLE_RATE, MAX_RESAMPLE_RATE);
    }

    pub const fn rate(&self) -> f32 {
        self.rate
    }

    pub fn downsample_factor(&self) -> f32 {
        1.0 / self.rate
    }
}

impl Stage for ResamplerStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        // Counter starts primed so the first sample after a reset latches
        if self.counter >= 1.0 {
            self.held = input;
            self.counter -= 1.0;
        }
        self.counter += self.rate;
        self.held
    }

    fn reset(&mut self) {
        self.counter = 1.0;
        self.held = 0.0;
    }
}
