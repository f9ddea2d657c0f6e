//! Lock-free parameter storage shared between the UI and audio threads.
//!
//! Every parameter is an independent scalar stored with relaxed ordering.
//! Values are clamped on write, so the audio thread never sees an
//! out-of-range setting. The audio thread takes one [`ParamSnapshot`] per
//! block.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

use crate::tape::stages::bitcrusher::{MAX_BIT_DEPTH, sanitize_bit_depth};
use crate::tape::stages::clipper::{
    ClipperMode, DEFAULT_CLIPPER_THRESHOLD, MAX_CLIPPER_THRESHOLD, MIN_CLIPPER_THRESHOLD,
};
use crate::tape::stages::common::clamp_finite;
use crate::tape::stages::filter::{MAX_CUTOFF_HZ, MIN_CUTOFF_HZ};
use crate::tape::stages::level::{MAX_OUTPUT_GAIN_DB, MIN_OUTPUT_GAIN_DB, gain_from_db};
use crate::tape::stages::resampler::{MAX_RESAMPLE_RATE, MIN_RESAMPLE_RATE};

/// An `f32` stored as its bit pattern in an `AtomicU32`.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// Plain copy of every parameter, taken once at the start of a block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub drive: f32,
    pub tone: f32,
    pub bit_depth: u32,
    pub resample_rate: f32,
    pub wow: f32,
    pub flutter: f32,
    pub low_pass_hz: f32,
    pub noise: f32,
    pub output_gain: f32,
    pub clipper_mode: ClipperMode,
    pub clipper_threshold: f32,
    pub clipper_enabled: bool,
    pub anti_alias_enabled: bool,
    pub power: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            drive: 0.0,
            tone: 0.0,
            bit_depth: MAX_BIT_DEPTH,
            resample_rate: MAX_RESAMPLE_RATE,
            wow: 0.0,
            flutter: 0.0,
            low_pass_hz: MAX_CUTOFF_HZ,
            noise: 0.0,
            output_gain: 1.0,
            clipper_mode: ClipperMode::Soft,
            clipper_threshold: DEFAULT_CLIPPER_THRESHOLD,
            clipper_enabled: false,
            anti_alias_enabled: false,
            power: true,
        }
    }
}

#[derive(Debug)]
pub struct Parameters {
    drive: AtomicF32,
    tone: AtomicF32,
    bit_depth: AtomicU32,
    resample_rate: AtomicF32,
    wow: AtomicF32,
    flutter: AtomicF32,
    low_pass_hz: AtomicF32,
    noise: AtomicF32,
    output_gain_db: AtomicF32,
    output_gain: AtomicF32,
    clipper_mode: AtomicU8,
    clipper_threshold: AtomicF32,
    clipper_enabled: AtomicBool,
    anti_alias_enabled: AtomicBool,
    power: AtomicBool,
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

impl Parameters {
    pub fn new() -> Self {
        let defaults = ParamSnapshot::default();

        Self {
            drive: AtomicF32::new(defaults.drive),
            tone: AtomicF32::new(defaults.tone),
            bit_depth: AtomicU32::new(defaults.bit_depth),
            resample_rate: AtomicF32::new(defaults.resample_rate),
            wow: AtomicF32::new(defaults.wow),
            flutter: AtomicF32::new(defaults.flutter),
            low_pass_hz: AtomicF32::new(defaults.low_pass_hz),
            noise: AtomicF32::new(defaults.noise),
            output_gain_db: AtomicF32::new(0.0),
            output_gain: AtomicF32::new(defaults.output_gain),
            clipper_mode: AtomicU8::new(defaults.clipper_mode.index()),
            clipper_threshold: AtomicF32::new(defaults.clipper_threshold),
            clipper_enabled: AtomicBool::new(defaults.clipper_enabled),
            anti_alias_enabled: AtomicBool::new(defaults.anti_alias_enabled),
            power: AtomicBool::new(defaults.power),
        }
    }

    // --- Setters (clamp, then store) ---

    pub fn set_drive(&self, amount: f32) {
        self.drive.store(clamp_finite(amount, 0.0, 1.0));
    }

    pub fn set_tone(&self, amount: f32) {
        self.tone.store(clamp_finite(amount, 0.0, 1.0));
    }

    pub fn set_bit_depth(&self, bits: f32) {
        self.bit_depth
            .store(sanitize_bit_depth(bits), Ordering::Relaxed);
    }

    pub fn set_resample_rate(&self, rate: f32) {
        self.resample_rate
            .store(clamp_finite(rate, MIN_RESAMPLE_RATE, MAX_RESAMPLE_RATE));
    }

    pub fn set_wow(&self, amount: f32) {
        self.wow.store(clamp_finite(amount, 0.0, 1.0));
    }

    pub fn set_flutter(&self, amount: f32) {
        self.flutter.store(clamp_finite(amount, 0.0, 1.0));
    }

    pub fn set_low_pass(&self, hz: f32) {
        self.low_pass_hz
            .store(clamp_finite(hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ));
    }

    pub fn set_noise(&self, amount: f32) {
        self.noise.store(clamp_finite(amount, 0.0, 1.0));
    }

    pub fn set_output_gain_db(&self, db: f32) {
        self.output_gain_db
            .store(clamp_finite(db, MIN_OUTPUT_GAIN_DB, MAX_OUTPUT_GAIN_DB));
        self.output_gain.store(gain_from_db(db));
    }

    pub fn set_clipper_mode(&self, mode: ClipperMode) {
        self.clipper_mode.store(mode.index(), Ordering::Relaxed);
    }

    pub fn set_clipper_threshold(&self, threshold: f32) {
        self.clipper_threshold.store(clamp_finite(
            threshold,
            MIN_CLIPPER_THRESHOLD,
            MAX_CLIPPER_THRESHOLD,
        ));
    }

    pub fn set_clipper_enabled(&self, enabled: bool) {
        self.clipper_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_anti_alias_enabled(&self, enabled: bool) {
        self.anti_alias_enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn set_power(&self, on: bool) {
        self.power.store(on, Ordering::Relaxed);
    }

    // --- Getters ---

    pub fn drive(&self) -> f32 {
        self.drive.load()
    }

    pub fn tone(&self) -> f32 {
        self.tone.load()
    }

    pub fn bit_depth(&self) -> u32 {
        self.bit_depth.load(Ordering::Relaxed)
    }

    pub fn resample_rate(&self) -> f32 {
        self.resample_rate.load()
    }

    pub fn wow(&self) -> f32 {
        self.wow.load()
    }

    pub fn flutter(&self) -> f32 {
        self.flutter.load()
    }

    pub fn low_pass_hz(&self) -> f32 {
        self.low_pass_hz.load()
    }

    pub fn noise(&self) -> f32 {
        self.noise.load()
    }

    pub fn output_gain_db(&self) -> f32 {
        self.output_gain_db.load()
    }

    pub fn output_gain(&self) -> f32 {
        self.output_gain.load()
    }

    pub fn clipper_mode(&self) -> ClipperMode {
        ClipperMode::from_index(self.clipper_mode.load(Ordering::Relaxed))
    }

    pub fn clipper_threshold(&self) -> f32 {
        self.clipper_threshold.load()
    }

    pub fn clipper_enabled(&self) -> bool {
        self.clipper_enabled.load(Ordering::Relaxed)
    }

    pub fn anti_alias_enabled(&self) -> bool {
        self.anti_alias_enabled.load(Ordering::Relaxed)
    }

    pub fn power(&self) -> bool {
        self.power.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            drive: self.drive(),
            tone: self.tone(),
            bit_depth: self.bit_depth(),
            resample_rate: self.resample_rate(),
            wow: self.wow(),
            flutter: self.flutter(),
            low_pass_hz: self.low_pass_hz(),
            noise: self.noise(),
            output_gain: self.output_gain(),
            clipper_mode: self.clipper_mode(),
            clipper_threshold: self.clipper_threshold(),
            clipper_enabled: self.clipper_enabled(),
            anti_alias_enabled: self.anti_alias_enabled(),
            power: self.power(),
        }
    }
}
