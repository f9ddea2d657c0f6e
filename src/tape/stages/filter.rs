use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, one_pole_coefficient};

pub const MIN_CUTOFF_HZ: f32 = 200.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;

const ANTI_ALIAS_MAX_CUTOFF_HZ: f32 = 12_000.0;
const ANTI_ALIAS_NYQUIST_RATIO: f32 = 0.45;

/// One-pole low-pass: `y[n] = (1 - a)·x[n] + a·y[n-1]`.
///
/// The coefficient uses the cutoff normalised to Nyquist,
/// `a = exp(-2π · cutoff / (fs / 2))`. Filter memory persists across blocks.
pub struct LowPassStage {
    cutoff: f32,
    alpha: f32,
    prev_output: f32,
    sample_rate: f32,
}

impl LowPassStage {
    fn compute_alpha(cutoff: f32, sample_rate: f32) -> f32 {
        one_pole_coefficient(cutoff, sample_rate / 2.0)
    }

    pub fn new(cutoff: f32, sample_rate: f32) -> Self {
        let cutoff = clamp_finite(cutoff, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);

        Self {
            cutoff,
            alpha: Self::compute_alpha(cutoff, sample_rate),
            prev_output: 0.0,
            sample_rate,
        }
    }

    pub fn set_cutoff(&mut self, cutoff: f32) {
        let cutoff = clamp_finite(cutoff, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        // Parameters are pushed every block; skip the exp() when unchanged
        if cutoff != self.cutoff {
            self.cutoff = cutoff;
            self.alpha = Self::compute_alpha(cutoff, self.sample_rate);
        }
    }

    pub const fn cutoff(&self) -> f32 {
        self.cutoff
    }
}

impl Stage for LowPassStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let output = self.alpha.mul_add(self.prev_output, (1.0 - self.alpha) * input);
        self.prev_output = output;
        output
    }

    fn reset(&mut self) {
        self.prev_output = 0.0;
    }
}

/// Optional post-chain smoothing that tames high-frequency folding.
///
/// Cutoff is `min(12 kHz, 0.45 · fs)`. While bypassed the memory tracks the
/// last output sample so that re-enabling continues from the current signal.
pub struct AntiAliasFilter {
    alpha: f32,
    state: f32,
}

impl AntiAliasFilter {
    pub fn new(sample_rate: f32) -> Self {
        let cutoff = ANTI_ALIAS_MAX_CUTOFF_HZ.min(sample_rate * ANTI_ALIAS_NYQUIST_RATIO);

        Self {
            alpha: one_pole_coefficient(cutoff, sample_rate),
            state: 0.0,
        }
    }

    pub const fn alpha(&self) -> f32 {
        self.alpha
    }

    pub const fn state(&self) -> f32 {
        self.state
    }

    /// Follow the signal while bypassed.
    pub fn track(&mut self, block: &[f32]) {
        if let Some(&last) = block.last() {
            self.state = last;
        }
    }
}

impl Stage for AntiAliasFilter {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        self.state = self.alpha.mul_add(self.state, (1.0 - self.alpha) * input);
        self.state
    }

    fn reset(&mut self) {
        self.state = 0.0;
    }
}
