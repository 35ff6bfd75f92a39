//! Configuration file (`~/.gesture_control/config.toml`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use gesture_core::{
    DEFAULT_COOLDOWN, DEFAULT_DISPATCH_CONFIDENCE, DEFAULT_MATCH_THRESHOLD, DEFAULT_MOVE_DISTANCE,
};

use crate::Error;

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub dispatch:    DispatchConfig,
    #[serde(default)]
    pub training:    TrainingConfig,
    #[serde(default)]
    pub library:     LibraryConfig,
    #[serde(default)]
    pub source:      SourceConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Score below which a gesture counts as matched.
    pub threshold: f64,
    /// Actions fire only when confidence is strictly above this (0–100).
    pub dispatch_confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Minimum seconds between two fired actions.
    pub cooldown_secs: f64,
    /// Pointer travel for `mouse_move` actions.
    pub move_distance: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Samples recorded per gesture.
    pub required_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Delay between replayed frames.
    pub frame_interval_ms: u64,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            threshold:           DEFAULT_MATCH_THRESHOLD,
            dispatch_confidence: DEFAULT_DISPATCH_CONFIDENCE,
        }
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: DEFAULT_COOLDOWN.as_secs_f64(),
            move_distance: DEFAULT_MOVE_DISTANCE,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self { required_samples: 30 }
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self { path: PathBuf::from("gestures").join("gestures.json") }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { frame_interval_ms: 10 }
    }
}

impl DispatchConfig {
    /// Saturates at [`Duration::MAX`]; a negative or NaN value means no
    /// cooldown.  [`Config::validate`] rejects both before they get here.
    pub fn cooldown(&self) -> Duration {
        match Duration::try_from_secs_f64(self.cooldown_secs) {
            Ok(d) => d,
            Err(_) if self.cooldown_secs > 0.0 => Duration::MAX,
            Err(_) => Duration::ZERO,
        }
    }
}

impl Config {
    /// Check every value is in range; reports the first bad field.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.recognition.threshold > 0.0 && self.recognition.threshold.is_finite()) {
            return Err(Error::Config(format!(
                "recognition.threshold must be a positive number, got {}", self.recognition.threshold
            )));
        }
        if self.recognition.dispatch_confidence > 100 {
            return Err(Error::Config(format!(
                "recognition.dispatch_confidence must be in [0, 100], got {}",
                self.recognition.dispatch_confidence
            )));
        }
        if Duration::try_from_secs_f64(self.dispatch.cooldown_secs).is_err() {
            return Err(Error::Config(format!(
                "dispatch.cooldown_secs must be >= 0 and fit in a duration, got {}",
                self.dispatch.cooldown_secs
            )));
        }
        if self.dispatch.move_distance <= 0 {
            return Err(Error::Config(format!(
                "dispatch.move_distance must be > 0, got {}", self.dispatch.move_distance
            )));
        }
        if self.training.required_samples == 0 {
            return Err(Error::Config("training.required_samples must be > 0".to_string()));
        }
        if self.library.path.as_os_str().is_empty() {
            return Err(Error::Config("library.path must not be empty".to_string()));
        }
        Ok(())
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the default location, or defaults if there is no file.
    pub fn load_default() -> Result<Self, Error> {
        let path = Self::default_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .map(|h| h.join(".gesture_control").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.recognition.threshold, 0.1);
        assert_eq!(cfg.recognition.dispatch_confidence, 70);
        assert_eq!(cfg.dispatch.cooldown(), Duration::from_secs(1));
        assert_eq!(cfg.dispatch.move_distance, 20);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = Config::default();
        cfg.training.required_samples = 12;
        cfg.dispatch.cooldown_secs = 0.5;
        cfg.save(&path).unwrap();
        assert_eq!(Config::load(&path).unwrap(), cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[recognition]\nthreshold = 0.25\n").unwrap();
        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.recognition.threshold, 0.25);
        assert_eq!(cfg.recognition.dispatch_confidence, 70);
        assert_eq!(cfg.training.required_samples, 30);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut cfg = Config::default();
        cfg.recognition.threshold = 0.0;
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));

        let mut cfg = Config::default();
        cfg.recognition.dispatch_confidence = 101;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.dispatch.cooldown_secs = -1.0;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.training.required_samples = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn huge_cooldown_is_rejected() {
        let dir  = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[dispatch]\ncooldown_secs = 1e30\n").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));

        let dispatch = DispatchConfig { cooldown_secs: 1e30, ..DispatchConfig::default() };
        assert_eq!(dispatch.cooldown(), Duration::MAX);
        let dispatch = DispatchConfig { cooldown_secs: f64::NAN, ..DispatchConfig::default() };
        assert_eq!(dispatch.cooldown(), Duration::ZERO);
    }
}
