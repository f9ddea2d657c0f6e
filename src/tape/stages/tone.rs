use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, soft_knee};

const TAPE_GAIN_RANGE: f32 = 0.5;
const SATURATION_THRESHOLD: f32 = 0.5;
const SATURATION_HARDNESS: f32 = 2.0;
const DIRECT_WEIGHT: f32 = 0.7;
const ROLLOFF_WEIGHT: f32 = 0.3;

/// Tape-style compression with a one-sample high-frequency roll-off.
///
/// The roll-off couples each sample to the previous output of the same block;
/// the first sample of every block is left uncoupled.
pub struct ToneStage {
    amount: f32, // 0..1
    tape_gain: f32,
}

impl ToneStage {
    pub fn new(amount: f32) -> Self {
        let mut stage = Self {
            amount: 0.0,
            tape_gain: 1.0,
        };
        stage.set_amount(amount);
        stage
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = clamp_finite(amount, 0.0, 1.0);
        self.tape_gain = 1.0 + TAPE_GAIN_RANGE * self.amount;
    }

    pub const fn amount(&self) -> f32 {
        self.amount
    }

    #[inline]
    fn saturate(&self, input: f32) -> f32 {
        let sample = input * self.tape_gain;
        let abs = sample.abs();
        if abs > SATURATION_THRESHOLD {
            soft_knee(abs, SATURATION_THRESHOLD, SATURATION_HARDNESS, 1.0).copysign(sample)
        } else {
            sample
        }
    }
}

impl Stage for ToneStage {
    fn process(&mut self, input: f32) -> f32 {
        self.saturate(input)
    }

    fn process_block(&mut self, input: &mut [f32]) {
        let mut previous: Option<f32> = None;

        for sample in input.iter_mut() {
            let mut out = self.saturate(*sample);
            if let Some(prev) = previous {
                out = out * DIRECT_WEIGHT + prev * ROLLOFF_WEIGHT * self.amount;
            }
            *sample = out;
            previous = Some(out);
        }
    }
}
