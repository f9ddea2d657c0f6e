use crate::tape::stages::Stage;
use crate::tape::stages::common::clamp_finite;

pub const MIN_BIT_DEPTH: u32 = 4;
pub const MAX_BIT_DEPTH: u32 = 16;

/// Round and clamp a caller-supplied bit depth onto [4, 16].
pub fn sanitize_bit_depth(bits: f32) -> u32 {
    clamp_finite(bits, MIN_BIT_DEPTH as f32, MAX_BIT_DEPTH as f32).round() as u32
}

/// Sampler-style bit reduction: uniform quantisation over [-1, 1].
pub struct BitcrusherStage {
    bit_depth: u32,
    step: f32,
}

impl BitcrusherStage {
    pub fn new(bit_depth: u32) -> Self {
        let mut stage = Self {
            bit_depth: MAX_BIT_DEPTH,
            step: 0.0,
        };
        stage.set_bit_depth(bit_depth);
        stage
    }

    pub fn set_bit_depth(&mut self, bit_depth: u32) {
        self.bit_depth = bit_depth.clamp(MIN_BIT_DEPTH, MAX_BIT_DEPTH);
        let levels = (1u32 << self.bit_depth) as f32;
        self.step = 2.0 / levels;
    }

    pub const fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    pub const fn step(&self) -> f32 {
        self.step
    }
}

impl Stage for BitcrusherStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        ((input / self.step).round() * self.step).clamp(-1.0, 1.0)
    }
}
