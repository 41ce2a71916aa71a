//! Configuration loading from TOML files.
//!
//! Every section and field is optional; anything left out takes the default.
//!
//! ```toml
//! [detector]
//! confidence_threshold = 0.35
//! person_class_id = 0
//!
//! [tracker]
//! iou_threshold = 0.25
//! max_age = 40
//! min_hits = 2
//! matching = "greedy"
//!
//! [alarm]
//! cooldown_secs = 3.0
//!
//! [zones]
//! file = "restricted_zones.json"
//!
//! [pipeline]
//! detect_every_n_frames = 2
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::alarm::AlarmConfig;
use crate::error::ConfigError;
use crate::integration::DetectionFilter;
use crate::tracker::TrackerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZonesConfig {
    /// JSON document holding the restricted zones
    pub file: PathBuf,
}

impl Default for ZonesConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("restricted_zones.json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Run the detector on every Nth frame; other frames reuse the last tracks
    pub detect_every_n_frames: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            detect_every_n_frames: 2,
        }
    }
}

/// Process-wide settings, fixed for the lifetime of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub detector: DetectionFilter,
    pub tracker: TrackerConfig,
    pub alarm: AlarmConfig,
    pub zones: ZonesConfig,
    pub pipeline: PipelineConfig,
}

impl Settings {
    /// Load and validate settings from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &raw)
    }

    /// Like [`Settings::from_file`], but an unreadable file falls back to the
    /// defaults with a warning. Invalid contents are still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::from_file(path.as_ref()) {
            Err(ConfigError::Read { path, source }) => {
                warn!(path = %path.display(), error = %source, "config not readable, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    fn parse(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tracker.validate()?;
        self.alarm.cooldown()?;
        if self.pipeline.detect_every_n_frames == 0 {
            return Err(ConfigError::InvalidFrameStride);
        }
        Ok(())
    }
}
