use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, soft_knee};
use std::f32::consts::PI;

const DRIVE_RANGE: f32 = 9.0;
const KNEE_THRESHOLD: f32 = 0.7;
const KNEE_SLOPE: f32 = 0.3;
const KNEE_HARDNESS: f32 = 3.0;
const HARMONIC_AMOUNT: f32 = 0.05;
const METER_DECAY: f32 = 0.95;

/// Transformer-style saturation with a soft knee and even-harmonic colour.
///
/// Also owns the VU meter: a peak follower with instant attack that decays by
/// 5% per sample, fed from this stage's output.
pub struct DriveStage {
    amount: f32, // 0..1
    pre_gain: f32,
    meter: f32,
}

impl DriveStage {
    pub fn new(amount: f32) -> Self {
        let mut stage = Self {
            amount: 0.0,
            pre_gain: 1.0,
            meter: 0.0,
        };
        stage.set_amount(amount);
        stage
    }

    pub fn set_amount(&mut self, amount: f32) {
        self.amount = clamp_finite(amount, 0.0, 1.0);
        self.pre_gain = 1.0 + DRIVE_RANGE * self.amount;
    }

    pub const fn amount(&self) -> f32 {
        self.amount
    }

    pub const fn meter_level(&self) -> f32 {
        self.meter
    }
}

impl Stage for DriveStage {
    fn process(&mut self, input: f32) -> f32 {
        let mut sample = input * self.pre_gain;

        let abs = sample.abs();
        if abs > KNEE_THRESHOLD {
            sample = soft_knee(abs, KNEE_THRESHOLD, KNEE_HARDNESS, KNEE_SLOPE).copysign(sample);
        }

        sample += (sample * PI).sin() * HARMONIC_AMOUNT * self.amount;

        self.meter = (self.meter * METER_DECAY).max(sample.abs());
        sample
    }

    fn reset(&mut self) {
        self.meter = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_below_knee_when_amount_is_zero() {
        let mut stage = DriveStage::new(0.0);
        for &x in &[0.0, 0.25, -0.5, 0.69] {
            assert_eq!(stage.process(x), x);
        }
    }

    #[test]
    fn full_drive_matches_knee_formula() {
        let mut stage = DriveStage::new(1.0);
        let out = stage.process(0.9);

        let s: f32 = 0.9 * 10.0;
        let knee = 0.7 + (s - 0.7) * 0.3 * (3.0 * (s - 0.7)).tanh();
        let expected = knee + (knee * PI).sin() * 0.05 * 1.0;

        assert_eq!(out, expected);
        assert!(out > 0.7, "output should sit above the knee: {out}");
    }

    #[test]
    fn output_is_bounded_for_unit_input() {
        // Largest possible knee output: pre-gain 10, input 1.0
        let bound = 0.7 + (10.0 - 0.7) * 0.3 + HARMONIC_AMOUNT;

        for step in 0..=10 {
            let mut stage = DriveStage::new(step as f32 / 10.0);
            for i in -100..=100 {
                let x = i as f32 / 100.0;
                let y = stage.process(x);
                assert!(y.is_finite());
                assert!(y.abs() <= bound, "drive {step}: |{y}| exceeds {bound}");
            }
        }
    }

    #[test]
    fn meter_decays_geometrically() {
        let mut stage = DriveStage::new(0.0);
        stage.process(1.0);

        // The knee shapes the impulse even at zero drive
        let peak = stage.meter_level();
        let knee = 0.7 + 0.3 * 0.3 * (3.0f32 * 0.3).tanh();
        assert!((peak - knee).abs() < 1e-6);

        for n in 1..=10 {
            stage.process(0.0);
            let expected = peak * 0.95f32.powi(n);
            assert!(
                (stage.meter_level() - expected).abs() < 1e-6,
                "n={n}: {} vs {expected}",
                stage.meter_level()
            );
        }
    }

    #[test]
    fn amount_is_clamped() {
        let mut stage = DriveStage::new(3.0);
        assert_eq!(stage.amount(), 1.0);
        stage.set_amount(-1.0);
        assert_eq!(stage.amount(), 0.0);
        stage.set_amount(f32::NAN);
        assert_eq!(stage.amount(), 0.0);
    }
}
