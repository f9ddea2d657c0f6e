use crate::tape::stages::Stage;
use crate::tape::stages::common::clamp_finite;
use std::f32::consts::TAU;

const WOW_RATE_HZ: f32 = 0.5;
const WOW_MAX_DEPTH: f32 = 0.002;
const FLUTTER_RATE_HZ: f32 = 8.0;
const FLUTTER_MAX_DEPTH: f32 = 0.001;

/// Tape-transport pitch modulation (wow or flutter).
///
/// A sine LFO scales the read position inside the current block:
/// `read = i · (1 + sin(phase) · depth)`, linearly interpolated. Reads that
/// fall outside the block pass the dry sample through, so the modulation does
/// not span block boundaries. The LFO phase does.
///
/// The dry copy lives in a scratch buffer that is grown by [`reserve`] outside
/// the audio callback.
///
/// [`reserve`]: ModulationStage::reserve
pub struct ModulationStage {
    amount: f32, // 0..1
    max_depth: f32,
    depth: f32,
    phase: f32,
    phase_increment: f32,
    scratch: Vec<f32>,
}

impl ModulationStage {
    pub fn new(rate_hz: f32, max_depth: f32, sample_rate: f32) -> Self {
        Self {
            amount: 0.0,
            max_depth,
            depth: 0.0,
            phase: 0.0,
            phase_increment: TAU * rate_hz / sample_rate,
            scratch: Vec::new(),
        }
    }

    /// Slow wobble: 0.5 Hz, up to ±0.2%.
    pub fn wow(sample_rate: f32) -> Self {
        Self::new(WOW_RATE_HZ, WOW_MAX_DEPTH, sample_rate)
    }

    /// Fast wobble: 8 Hz, up to ±0.1%.
    pub fn flutter(sample_rate: f32) -> Self {
        Self::new(FLUTTER_RATE_HZ, FLUTTER_MAX_DEPTH, sample_rate)
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = clamp_finite(amount, 0.0, 1.0);
        self.depth = self.amount * self.max_depth;
    }

    pub const fn amount(&self) -> f32 {
        self.amount
    }

    pub const fn depth(&self) -> f32 {
        self.depth
    }

    pub const fn phase(&self) -> f32 {
        self.phase
    }

    /// Make sure blocks of up to `max_block_size` samples never allocate.
    pub fn reserve(&mut self, max_block_size: usize) {
        if self.scratch.len() < max_block_size {
            self.scratch.resize(max_block_size, 0.0);
        }
    }

    #[inline]
    fn advance_phase(phase: f32, increment: f32) -> f32 {
        (phase + increment).rem_euclid(TAU)
    }
}

impl Stage for ModulationStage {
    // A one-sample block can only read its own sample.
    fn process(&mut self, input: f32) -> f32 {
        self.phase = Self::advance_phase(self.phase, self.phase_increment);
        input
    }

    fn process_block(&mut self, input: &mut [f32]) {
        let len = input.len();
        self.reserve(len);

        let dry = &mut self.scratch[..len];
        dry.copy_from_slice(input);

        let mut phase = self.phase;
        for (i, out) in input.iter_mut().enumerate() {
            phase = Self::advance_phase(phase, self.phase_increment);

            let modulation = phase.sin() * self.depth;
            let read_pos = i as f32 * (1.0 + modulation);
            let read_floor = read_pos.floor();

            if read_floor >= 0.0 && (read_floor as usize) + 1 < len {
                let index = read_floor as usize;
                let frac = read_pos - read_floor;
                *out = dry[index] * (1.0 - frac) + dry[index + 1] * frac;
            } else {
                *out = dry[i];
            }
        }
        self.phase = phase;
    }

    fn reset(&mut self) {
        self.phase = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 44_100.0;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32).collect()
    }

    #[test]
    fn zero_amount_is_identity() {
        let mut wow = ModulationStage::wow(SAMPLE_RATE);
        let input = ramp(512);
        let mut block = input.clone();
        wow.process_block(&mut block);
        assert_eq!(block, input);
    }

    #[test]
    fn phase_advances_and_wraps() {
        // 8 Hz at 16 Hz sample rate: half a cycle per sample
        let mut stage = ModulationStage::new(8.0, 0.001, 16.0);
        let mut block = [0.0; 5];
        stage.process_block(&mut block);

        assert!(stage.phase() >= 0.0 && stage.phase() < TAU);
        assert!((stage.phase() - std::f32::consts::PI).abs() < 1e-4);
    }

    #[test]
    fn phase_wraps_when_increment_exceeds_a_cycle() {
        // 8 Hz at 4 Hz sample rate: two cycles per sample
        let mut stage = ModulationStage::new(8.0, 0.001, 4.0);
        stage.set_amount(1.0);
        let mut block = [0.1; 3];
        stage.process_block(&mut block);
        assert!(stage.phase() >= 0.0 && stage.phase() < TAU);

        stage.process(0.0);
        assert!(stage.phase() >= 0.0 && stage.phase() < TAU);
    }

    #[test]
    fn phase_stays_in_range_over_long_runs() {
        let mut flutter = ModulationStage::flutter(SAMPLE_RATE);
        flutter.set_amount(1.0);
        let mut block = vec![0.1; 1024];
        for _ in 0..200 {
            flutter.process_block(&mut block);
            assert!(flutter.phase() >= 0.0 && flutter.phase() < TAU);
        }
    }

    #[test]
    fn modulated_reads_interpolate_within_block() {
        let mut wow = ModulationStage::wow(SAMPLE_RATE);
        wow.set_amount(1.0);
        assert_eq!(wow.depth(), 0.002);

        let input = ramp(4096);
        let mut block = input.clone();
        wow.process_block(&mut block);

        // Early in the LFO cycle the read head runs slightly ahead
        assert!(block[4000] > input[4000]);
        // A ramp interpolated stays inside its own range
        assert!(block.iter().all(|&s| (0.0..1.0).contains(&s)));
        // Last sample can't interpolate forward and passes through
        assert_eq!(block[4095], input[4095]);
    }

    #[test]
    fn single_sample_process_passes_through() {
        let mut flutter = ModulationStage::flutter(SAMPLE_RATE);
        flutter.set_amount(1.0);
        assert_eq!(flutter.process(0.42), 0.42);
        assert!(flutter.phase() > 0.0);
    }
}
