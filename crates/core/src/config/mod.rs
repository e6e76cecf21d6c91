use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{LimboError, Permutation, Result};

/// Top-level configuration structure for the application.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub display: DisplayConfig,
    pub assets: AssetConfig,
    pub audio: AudioConfig,
    pub show: ShowConfig,
}

impl AppConfig {
    /// Reads a JSON configuration file. Missing sections fall back to defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.display.width <= 0.0 || self.display.height <= 0.0 {
            return Err(LimboError::Config("screen size must be positive".into()));
        }
        if self.display.slot_pitch <= 0.0 || self.display.key_size <= 0.0 {
            return Err(LimboError::Config("key size and slot pitch must be positive".into()));
        }
        if self.audio.bpm <= 0.0 {
            return Err(LimboError::Config("tempo must be positive".into()));
        }
        if self.show.flash_count == 0 {
            return Err(LimboError::Config("flash count must be at least 1".into()));
        }
        if matches!(self.show.tracked_key, Some(key) if key >= crate::KEY_COUNT) {
            return Err(LimboError::Config("tracked key must be in 0..8".into()));
        }
        Ok(())
    }
}

/// Screen and board geometry, in pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: f32,
    pub height: f32,
    pub key_size: f32,
    /// Distance between neighbouring slot centres, both axes.
    pub slot_pitch: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920.0,
            height: 1080.0,
            key_size: 200.0,
            slot_pitch: 260.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub key_main: String,
    pub key_highlight: String,
    pub key_shadow: String,
    pub key_outline: String,
    pub atlas: Option<String>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            key_main: "assets/keymain.png".to_string(),
            key_highlight: "assets/keyhigh.png".to_string(),
            key_shadow: "assets/keyshadow.png".to_string(),
            key_outline: "assets/keyoutline.png".to_string(),
            atlas: None,
        }
    }
}

/// Configuration specific to the audio subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub bpm: f32,
    pub music: String,
    pub tick: String,
    pub go: String,
    pub reveal: String,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000,
            bpm: 120.0,
            music: "assets/limbo.ogg".to_string(),
            tick: "assets/tick.wav".to_string(),
            go: "assets/go.wav".to_string(),
            reveal: "assets/reveal.wav".to_string(),
        }
    }
}

/// Knobs for the authored show.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    /// Seed for the starting permutation and the tracked key. Random when absent.
    pub seed: Option<u64>,
    /// Delay before the very first effect starts moving, in seconds.
    pub lead_in: f32,
    pub flash_count: u32,
    pub tracked_key: Option<usize>,
    /// Extra shuffles appended to the authored sequence.
    pub extra_shuffles: Vec<Permutation>,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            seed: None,
            lead_in: 1.0 / 60.0,
            flash_count: 3,
            tracked_key: None,
            extra_shuffles: Vec::new(),
        }
    }
}
