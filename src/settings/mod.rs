use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::processor::{
    DEFAULT_MAX_BLOCK_SIZE, DEFAULT_SAMPLE_RATE, Processor, ProcessorHandle,
};
use crate::controls::ControlState;
use crate::tape::stages::clipper::DEFAULT_CLIPPER_THRESHOLD;

const SETTINGS_FILENAME: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub sample_rate: u32,
    pub max_block_size: usize,
    pub clipper_threshold: f32,
    pub controls: ControlState,
}

impl std::fmt::Display for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "------------------------------")?;

        writeln!(f, "Processor Settings:")?;
        writeln!(f, "Sample Rate: {}", self.sample_rate)?;
        writeln!(f, "Max Block Size: {}", self.max_block_size)?;
        writeln!(f, "Clipper Threshold: {}", self.clipper_threshold)?;
        writeln!(f)?;

        writeln!(f, "Controls:")?;
        write!(f, "{}", self.controls)?;
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE as u32,
            max_block_size: DEFAULT_MAX_BLOCK_SIZE,
            clipper_threshold: DEFAULT_CLIPPER_THRESHOLD,
            controls: ControlState::default(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path).context("Failed to read settings file")?;
            let settings: Self =
                serde_json::from_str(&contents).context("Failed to parse settings")?;
            debug!("Loaded settings from {}", path.display());
            Ok(settings)
        } else {
            info!("No settings file found, using defaults");
            let settings = Self::default();
            // Try to save defaults, but don't fail if we can't
            if let Err(e) = settings.save(path) {
                warn!("Could not write default settings: {e:#}");
            }
            Ok(settings)
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;

        fs::write(path, json).context("Failed to write settings file")?;

        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// `$XDG_CONFIG_HOME/lofi-tape/settings.json`, then `~/.config`, then `.`.
    pub fn default_path() -> PathBuf {
        if let Ok(config_dir) = std::env::var("XDG_CONFIG_HOME") {
            PathBuf::from(config_dir)
                .join("lofi-tape")
                .join(SETTINGS_FILENAME)
        } else if let Ok(home) = std::env::var("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("lofi-tape")
                .join(SETTINGS_FILENAME)
        } else {
            PathBuf::from(".").join(SETTINGS_FILENAME)
        }
    }

    /// Build a prepared processor with these settings applied.
    pub fn build_processor(&self) -> (Processor, ProcessorHandle) {
        let (mut processor, handle) = Processor::new(self.sample_rate as f32);
        processor.prepare(self.max_block_size);

        handle.set_clipper_threshold(self.clipper_threshold);
        self.controls.apply_to(&handle);

        info!(
            "Processor ready: {} Hz, blocks up to {} samples",
            processor.sample_rate(),
            processor.max_block_size()
        );
        (processor, handle)
    }
}
