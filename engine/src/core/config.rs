//! Simulation configuration, loadable from TOML.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! target_refresh_hz = 120.0
//! fixed_step = 0.01
//!
//! [quality]
//! evaluation_interval = 30
//! initial_level = "medium"
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use thiserror::Error;

use crate::core::{
    display::DEFAULT_REFRESH_HZ,
    quality::QualityLevel,
    time::{DEFAULT_FIXED_STEP, DEFAULT_MAX_FIXED_STEPS},
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Top-level simulation settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Display refresh rate the loop targets, in hertz. Also the quality controller's target FPS.
    pub target_refresh_hz: f64,
    /// Fixed simulation step, in seconds.
    pub fixed_step: f64,
    /// Maximum fixed steps owed after one frame; bounds catch-up after a stall.
    pub max_fixed_steps: u32,
    /// Length of the FPS measurement window, in seconds.
    pub fps_window: f64,
    pub quality: QualityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target_refresh_hz: DEFAULT_REFRESH_HZ,
            fixed_step: DEFAULT_FIXED_STEP,
            max_fixed_steps: DEFAULT_MAX_FIXED_STEPS,
            fps_window: 1.0,
            quality: QualityConfig::default(),
        }
    }
}

/// Adaptive quality settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QualityConfig {
    /// Number of frame times kept for averaging.
    pub history_capacity: usize,
    /// Distance from the target FPS, in frames per second, before quality moves.
    pub fps_margin: f64,
    /// Frames between frame-rate evaluations.
    pub evaluation_interval: u32,
    pub initial_level: QualityLevel,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            history_capacity: 60,
            fps_margin: 5.0,
            evaluation_interval: 60,
            initial_level: QualityLevel::High,
        }
    }
}

impl Config {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(value: f64) -> bool {
            value.is_finite() && value > 0.0
        }

        if !positive(self.target_refresh_hz) {
            return Err(ConfigError::Invalid("target_refresh_hz must be positive"));
        }
        if !positive(self.fixed_step) {
            return Err(ConfigError::Invalid("fixed_step must be positive"));
        }
        if self.max_fixed_steps == 0 {
            return Err(ConfigError::Invalid("max_fixed_steps must be at least 1"));
        }
        if !positive(self.fps_window) {
            return Err(ConfigError::Invalid("fps_window must be positive"));
        }
        if self.quality.history_capacity == 0 {
            return Err(ConfigError::Invalid(
                "quality.history_capacity must be at least 1",
            ));
        }
        if self.quality.evaluation_interval == 0 {
            return Err(ConfigError::Invalid(
                "quality.evaluation_interval must be at least 1",
            ));
        }
        if !(self.quality.fps_margin.is_finite() && self.quality.fps_margin >= 0.0) {
            return Err(ConfigError::Invalid("quality.fps_margin must not be negative"));
        }
        Ok(())
    }
}
