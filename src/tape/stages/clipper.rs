use crate::tape::stages::Stage;
use crate::tape::stages::common::{clamp_finite, soft_knee};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub const MIN_CLIPPER_THRESHOLD: f32 = 0.1;
pub const MAX_CLIPPER_THRESHOLD: f32 = 1.0;
pub const DEFAULT_CLIPPER_THRESHOLD: f32 = 0.8;

const HARD_CEILING: f32 = 1.1;

#[derive(ValueEnum, Copy, Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum ClipperMode {
    #[default]
    Soft, // Gentle knee, half slope above threshold
    Medium, // Firmer knee, 30% slope
    Hard,   // Ceiling at 110% of threshold
}

impl std::fmt::Display for ClipperMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Soft => write!(f, "Soft"),
            Self::Medium => write!(f, "Medium"),
            Self::Hard => write!(f, "Hard"),
        }
    }
}

impl ClipperMode {
    /// Parse a mode name ("soft", "Medium", "HARD").
    pub fn from_name(name: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(name.trim(), true).ok()
    }

    pub const fn from_index(index: u8) -> Self {
        match index {
            0 => Self::Soft,
            1 => Self::Medium,
            _ => Self::Hard,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Shape a magnitude that exceeds `threshold`.
    #[inline]
    pub fn shape(self, abs: f32, threshold: f32) -> f32 {
        match self {
            Self::Soft => soft_knee(abs, threshold, 2.0, 0.5),
            Self::Medium => soft_knee(abs, threshold, 4.0, 0.3),
            Self::Hard => abs.min(threshold * HARD_CEILING),
        }
    }
}

/// Final-stage clipper with three curves and a bypass.
///
/// Records whether any input in the current block exceeded the threshold;
/// the flag is only raised while the clipper is engaged.
pub struct ClipperStage {
    mode: ClipperMode,
    threshold: f32,
    enabled: bool,
    clipped: bool,
}

impl ClipperStage {
    pub fn new(mode: ClipperMode, threshold: f32, enabled: bool) -> Self {
        Self {
            mode,
            threshold: clamp_finite(threshold, MIN_CLIPPER_THRESHOLD, MAX_CLIPPER_THRESHOLD),
            enabled,
            clipped: false,
        }
    }

    pub const fn set_mode(&mut self, mode: ClipperMode) {
        self.mode = mode;
    }

    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = clamp_finite(threshold, MIN_CLIPPER_THRESHOLD, MAX_CLIPPER_THRESHOLD);
    }

    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub const fn mode(&self) -> ClipperMode {
        self.mode
    }

    pub const fn threshold(&self) -> f32 {
        self.threshold
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub const fn clipped(&self) -> bool {
        self.clipped
    }

    pub const fn clear_clipped(&mut self) {
        self.clipped = false;
    }
}

impl Stage for ClipperStage {
    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        if !self.enabled {
            return input;
        }

        let abs = input.abs();
        if abs > self.threshold {
            self.clipped = true;
            self.mode.shape(abs, self.threshold).copysign(input)
        } else {
            input
        }
    }

    fn reset(&mut self) {
        self.clipped = false;
    }
}
