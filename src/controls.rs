//! Host/GUI adapter: normalized 0–100 controls to physical parameters.
//!
//! The GUI shell only deals in knob positions. This module owns the mapping
//! from those positions to the processor's units (bits, Hz, dB, modes).

use serde::{Deserialize, Serialize};

use crate::audio::processor::ProcessorHandle;
use crate::tape::stages::bitcrusher::{MAX_BIT_DEPTH, MIN_BIT_DEPTH};
use crate::tape::stages::clipper::ClipperMode;
use crate::tape::stages::common::map_exponential;
use crate::tape::stages::filter::{MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::tape::stages::level::{MAX_OUTPUT_GAIN_DB, MIN_OUTPUT_GAIN_DB};

pub const CONTROL_MIN: f32 = 0.0;
pub const CONTROL_MAX: f32 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Control {
    Drive,
    Tone,
    Mpc,
    Wow,
    Flutter,
    Resampler,
    LowPass,
    Noise,
    OutputGain,
    ClipperMode,
}

impl Control {
    pub const ALL: [Self; 10] = [
        Self::Drive,
        Self::Tone,
        Self::Mpc,
        Self::Wow,
        Self::Flutter,
        Self::Resampler,
        Self::LowPass,
        Self::Noise,
        Self::OutputGain,
        Self::ClipperMode,
    ];
}

impl std::fmt::Display for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Drive => write!(f, "Drive"),
            Self::Tone => write!(f, "Tone"),
            Self::Mpc => write!(f, "MPC"),
            Self::Wow => write!(f, "Wow"),
            Self::Flutter => write!(f, "Flutter"),
            Self::Resampler => write!(f, "Resampler"),
            Self::LowPass => write!(f, "Low Pass"),
            Self::Noise => write!(f, "Noise"),
            Self::OutputGain => write!(f, "Output"),
            Self::ClipperMode => write!(f, "Clipper Mode"),
        }
    }
}

/// Clamp a control value to [0, 100]; NaN reads as 0.
pub fn clamp_param(value: f32) -> f32 {
    if value.is_nan() {
        CONTROL_MIN
    } else {
        value.clamp(CONTROL_MIN, CONTROL_MAX)
    }
}

fn normalized(value: f32) -> f32 {
    clamp_param(value) / CONTROL_MAX
}

/// Drive, Tone, Wow, Flutter, Resampler and Noise: straight 0..1 scaling.
pub fn control_to_amount(value: f32) -> f32 {
    normalized(value)
}

/// MPC: 0 → 16 bits, 100 → 4 bits.
pub fn mpc_to_bit_depth(value: f32) -> f32 {
    let span = (MAX_BIT_DEPTH - MIN_BIT_DEPTH) as f32;
    (MAX_BIT_DEPTH as f32 - normalized(value) * span).round()
}

/// Low-pass: exponential sweep from 200 Hz to 20 kHz.
pub fn low_pass_to_hz(value: f32) -> f32 {
    map_exponential(normalized(value), MIN_CUTOFF_HZ, MAX_CUTOFF_HZ)
}

/// Output: linear sweep from -24 dB to +12 dB.
pub fn output_gain_to_db(value: f32) -> f32 {
    MIN_OUTPUT_GAIN_DB + normalized(value) * (MAX_OUTPUT_GAIN_DB - MIN_OUTPUT_GAIN_DB)
}

/// Clipper mode knob split into thirds: soft, medium, hard.
pub fn clipper_mode_from_control(value: f32) -> ClipperMode {
    let value = clamp_param(value);
    if value < CONTROL_MAX / 3.0 {
        ClipperMode::Soft
    } else if value < CONTROL_MAX * 2.0 / 3.0 {
        ClipperMode::Medium
    } else {
        ClipperMode::Hard
    }
}

/// Route one control value to the matching processor setter.
pub fn apply_control(handle: &ProcessorHandle, control: Control, value: f32) {
    match control {
        Control::Drive => handle.set_drive(control_to_amount(value)),
        Control::Tone => handle.set_tone(control_to_amount(value)),
        Control::Mpc => handle.set_bit_depth(mpc_to_bit_depth(value)),
        Control::Wow => handle.set_wow(control_to_amount(value)),
        Control::Flutter => handle.set_flutter(control_to_amount(value)),
        Control::Resampler => handle.set_resample_rate(control_to_amount(value)),
        Control::LowPass => handle.set_low_pass(low_pass_to_hz(value)),
        Control::Noise => handle.set_noise(control_to_amount(value)),
        Control::OutputGain => handle.set_output_gain_db(output_gain_to_db(value)),
        Control::ClipperMode => handle.set_clipper_mode(clipper_mode_from_control(value)),
    }
}

pub fn format_hz(value: f32) -> String {
    let hz = if value.is_finite() { value.max(0.0) } else { 0.0 };
    format!("{} Hz", hz.round())
}

pub fn format_low_pass(value: f32) -> String {
    format_hz(low_pass_to_hz(value))
}

/// Knob positions and switches as the GUI shell holds them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlState {
    pub drive: f32,
    pub tone: f32,
    pub mpc: f32,
    pub wow: f32,
    pub flutter: f32,
    pub resampler: f32,
    pub low_pass: f32,
    pub noise: f32,
    pub output_gain: f32,
    pub clipper_mode: f32,
    pub clipper_enabled: bool,
    pub anti_alias: bool,
    pub power: bool,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            drive: 0.0,
            tone: 0.0,
            mpc: 0.0,
            wow: 0.0,
            flutter: 0.0,
            resampler: 100.0,
            low_pass: 100.0,
            noise: 0.0,
            output_gain: 67.0,
            clipper_mode: 50.0,
            clipper_enabled: false,
            anti_alias: false,
            power: true,
        }
    }
}

impl std::fmt::Display for ControlState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for control in Control::ALL {
            writeln!(f, "{}: {}", control, self.value(control))?;
        }
        writeln!(f, "Clipper Enabled: {}", self.clipper_enabled)?;
        writeln!(f, "Anti-Alias: {}", self.anti_alias)?;
        writeln!(f, "Power: {}", self.power)?;
        Ok(())
    }
}

impl ControlState {
    pub const fn value(&self, control: Control) -> f32 {
        match control {
            Control::Drive => self.drive,
            Control::Tone => self.tone,
            Control::Mpc => self.mpc,
            Control::Wow => self.wow,
            Control::Flutter => self.flutter,
            Control::Resampler => self.resampler,
            Control::LowPass => self.low_pass,
            Control::Noise => self.noise,
            Control::OutputGain => self.output_gain,
            Control::ClipperMode => self.clipper_mode,
        }
    }

    pub fn set_value(&mut self, control: Control, value: f32) {
        let value = clamp_param(value);
        match control {
            Control::Drive => self.drive = value,
            Control::Tone => self.tone = value,
            Control::Mpc => self.mpc = value,
            Control::Wow => self.wow = value,
            Control::Flutter => self.flutter = value,
            Control::Resampler => self.resampler = value,
            Control::LowPass => self.low_pass = value,
            Control::Noise => self.noise = value,
            Control::OutputGain => self.output_gain = value,
            Control::ClipperMode => self.clipper_mode = value,
        }
    }

    /// Push every control and switch to the processor.
    pub fn apply_to(&self, handle: &ProcessorHandle) {
        for control in Control::ALL {
            apply_control(handle, control, self.value(control));
        }
        handle.set_clipper_enabled(self.clipper_enabled);
        handle.set_anti_alias_enabled(self.anti_alias);
        handle.set_power(self.power);
    }
}
