use std::sync::atomic::{AtomicBool, Ordering};

use crate::tape::params::AtomicF32;
use crate::tape::stages::common::lin_to_db;

/// Meter readings published by the audio thread after every block.
pub struct SharedMeter {
    vu_level: AtomicF32,
    is_clipping: AtomicBool,
}

/// Display readback. `vu_level` is held to [0, 1] even when the drive stage
/// peaks above full scale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeterInfo {
    pub vu_level: f32,
    pub vu_db: f32,
    pub is_clipping: bool,
}

impl MeterInfo {
    pub fn from_level(level: f32, is_clipping: bool) -> Self {
        let vu_level = if level.is_finite() { level.clamp(0.0, 1.0) } else { 1.0 };

        Self {
            vu_level,
            vu_db: lin_to_db(vu_level),
            is_clipping,
        }
    }
}

impl Default for SharedMeter {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedMeter {
    pub fn new() -> Self {
        Self {
            vu_level: AtomicF32::new(0.0),
            is_clipping: AtomicBool::new(false),
        }
    }

    #[inline]
    pub fn publish(&self, vu_level: f32, is_clipping: bool) {
        self.vu_level.store(vu_level);
        self.is_clipping.store(is_clipping, Ordering::Relaxed);
    }

    pub fn vu_level(&self) -> f32 {
        self.vu_level.load()
    }

    pub fn is_clipping(&self) -> bool {
        self.is_clipping.load(Ordering::Relaxed)
    }

    pub fn info(&self) -> MeterInfo {
        MeterInfo::from_level(self.vu_level(), self.is_clipping())
    }

    pub fn reset(&self) {
        self.publish(0.0, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meter_publishes_levels() {
        let meter = SharedMeter::new();

        let info = meter.info();
        assert_eq!(info.vu_level, 0.0);
        assert_eq!(info.vu_db, -100.0);
        assert!(!info.is_clipping);

        meter.publish(0.5, true);
        let info = meter.info();
        assert_eq!(info.vu_level, 0.5);
        assert!((info.vu_db + 6.02).abs() < 0.01);
        assert!(info.is_clipping);

        // Hot drive peaks read as full scale
        meter.publish(3.2, false);
        let info = meter.info();
        assert_eq!(meter.vu_level(), 3.2);
        assert_eq!(info.vu_level, 1.0);
        assert_eq!(info.vu_db, 0.0);

        meter.reset();
        assert_eq!(meter.info(), MeterInfo {
            vu_level: 0.0,
            vu_db: -100.0,
            is_clipping: false,
        });
    }
}
