use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, db_to_lin};

const MIN_NOISE_DB: f32 = -90.0;
const MAX_NOISE_DB: f32 = -45.0;
const NOISE_SEED: u32 = 0x1234_5678;
const RANDOM_MASK: u32 = 0x7F_FFFF;

/// Noise gain for an amount in [0, 1]; the dB level rises with the square of
/// the amount, from -90 dB to -45 dB. Zero amount is silent.
pub fn noise_gain(amount: f32) -> f32 {
    let amount = clamp_finite(amount, 0.0, 1.0);
    if amount > 0.0 {
        db_to_lin(MIN_NOISE_DB + (MAX_NOISE_DB - MIN_NOISE_DB) * amount * amount)
    } else {
        0.0
    }
}

/// Tape hiss: triangular (TPDF) noise from a fixed-seed LCG, added after the
/// low-pass so it stays broadband. Output is clamped to [-1, 1].
pub struct NoiseStage {
    amount: f32, // 0..1
    gain: f32,
    seed: u32,
}

impl NoiseStage {
    pub fn new(amount: f32) -> Self {
        let mut stage = Self {
            amount: 0.0,
            gain: 0.0,
            seed: NOISE_SEED,
        };
        stage.set_amount(amount);
        stage
    }

    pub fn set_amount(&mut self, amount: f32) {
        let amount = clamp_finite(amount, 0.0, 1.0);
        if amount != self.amount {
            self.amount = amount;
            self.gain = noise_gain(amount);
        }
    }

    pub const fn amount(&self) -> f32 {
        self.amount
    }

    pub const fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    fn next_uniform(&mut self) -> f32 {
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        ((self.seed >> 9) & RANDOM_MASK) as f32 / RANDOM_MASK as f32
    }
}

impl Stage for NoiseStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if self.gain <= 0.0 {
            return input;
        }
        let tpdf = self.next_uniform() - self.next_uniform();
        tpdf.mul_add(self.gain, input).clamp(-1.0, 1.0)
    }

    fn reset(&mut self) {
        self.seed = NOISE_SEED;
    }
}
