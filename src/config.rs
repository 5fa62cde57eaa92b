//! Configuration for the NEXUS gesture agent.

use crate::core::activation::{default_bindings, ActionBinding};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Geometric thresholds used by feature extraction and classification.
///
/// All distances are in normalized image units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionThresholds {
    /// How far above its PIP joint a fingertip must sit to count as extended
    pub extension_margin: f64,
    /// Thumb tip must be this many times farther from the wrist than the IP joint
    pub thumb_extension_ratio: f64,
    /// Minimum thumb tip to index knuckle distance for an extended thumb
    pub thumb_palm_clearance: f64,
    /// Vertical offset between thumb tip and MCP for thumbs up/down
    pub thumb_vertical_margin: f64,
    /// Maximum thumb tip to index tip distance for the OK ring
    pub ok_touch_distance: f64,
}

impl Default for RecognitionThresholds {
    fn default() -> Self {
        Self {
            extension_margin: 0.02,
            thumb_extension_ratio: 1.1,
            thumb_palm_clearance: 0.08,
            thumb_vertical_margin: 0.05,
            ok_touch_distance: 0.06,
        }
    }
}

/// Main configuration for the gesture agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Feature and classifier thresholds
    pub thresholds: RecognitionThresholds,

    /// Number of raw labels in each hand's majority-vote window
    pub smoothing_window: usize,

    /// Frame spacing assumed when frames carry no timestamp (ms)
    pub frame_interval_ms: f64,

    /// How long a hand may go unseen before its state is dropped (ms)
    pub track_eviction_ms: f64,

    /// Actions fired by sustained gestures
    pub bindings: Vec<ActionBinding>,

    /// Directory for event recordings
    pub export_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nexus-gesture-agent");

        Self {
            thresholds: RecognitionThresholds::default(),
            smoothing_window: 5,
            frame_interval_ms: 16.0,
            track_eviction_ms: 3_000.0, // longer than any default cool-down
            bindings: default_bindings(),
            export_path: data_dir.join("events"),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to an explicit file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("nexus-gesture-agent")
            .join("config.json")
    }

    /// Ensure the export directory exists.
    pub fn ensure_directories(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.export_path).map_err(|source| ConfigError::Io {
            path: self.export_path.clone(),
            source,
        })
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.smoothing_window == 0 {
            return Err(ConfigError::Invalid(
                "smoothing_window must be at least 1".to_string(),
            ));
        }
        if self.frame_interval_ms.is_nan() || self.frame_interval_ms <= 0.0 {
            return Err(ConfigError::Invalid(
                "frame_interval_ms must be positive".to_string(),
            ));
        }
        if self.track_eviction_ms.is_nan() || self.track_eviction_ms < 0.0 {
            return Err(ConfigError::Invalid(
                "track_eviction_ms must not be negative".to_string(),
            ));
        }
        for binding in &self.bindings {
            let valid = |ms: f64| !ms.is_nan() && ms >= 0.0;
            if !valid(binding.hold_ms) || !valid(binding.cooldown_ms) {
                return Err(ConfigError::Invalid(format!(
                    "binding {} has a negative or missing hold or cool-down",
                    binding.action.as_str()
                )));
            }
            // An evicted hand forgets when its actions last fired.
            if binding.cooldown_ms > self.track_eviction_ms {
                return Err(ConfigError::Invalid(format!(
                    "binding {} cool-down ({} ms) exceeds track_eviction_ms ({} ms)",
                    binding.action.as_str(),
                    binding.cooldown_ms,
                    self.track_eviction_ms
                )));
            }
        }
        Ok(())
    }

    /// Longest cool-down across all bindings, 0 if there are none.
    pub fn max_cooldown_ms(&self) -> f64 {
        self.bindings
            .iter()
            .map(|b| b.cooldown_ms)
            .filter(|ms| !ms.is_nan())
            .fold(0.0, f64::max)
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activation::ActionKind;
    use crate::core::classifier::GestureLabel;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.thresholds.extension_margin, 0.02);
        assert_eq!(config.thresholds.thumb_extension_ratio, 1.1);
        assert_eq!(config.thresholds.thumb_palm_clearance, 0.08);
        assert_eq!(config.thresholds.thumb_vertical_margin, 0.05);
        assert_eq!(config.thresholds.ok_touch_distance, 0.06);
        assert_eq!(config.frame_interval_ms, 16.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_bindings_present() {
        let config = Config::default();
        let color = config
            .bindings
            .iter()
            .find(|b| b.action == ActionKind::ColorChange)
            .unwrap();
        assert_eq!(color.label, GestureLabel::Point);
        assert_eq!(color.hold_ms, 400.0);
        assert_eq!(color.cooldown_ms, 1200.0);

        let burst = config
            .bindings
            .iter()
            .find(|b| b.action == ActionKind::Burst)
            .unwrap();
        assert_eq!(burst.label, GestureLabel::Thumbsup);
        assert_eq!(burst.hold_ms, 200.0);
        assert_eq!(burst.cooldown_ms, 1500.0);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"smoothing_window": 7, "thresholds": {"ok_touch_distance": 0.05}}"#)
                .unwrap();
        assert_eq!(config.smoothing_window, 7);
        assert_eq!(config.thresholds.ok_touch_distance, 0.05);
        assert_eq!(config.thresholds.extension_margin, 0.02);
        assert_eq!(config.bindings.len(), default_bindings().len());
    }

    #[test]
    fn test_zero_window_rejected() {
        let config = Config {
            smoothing_window: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cooldown_longer_than_eviction_rejected() {
        let mut config = Config::default();
        config.bindings[0].cooldown_ms = 5_000.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.track_eviction_ms = 5_000.0;
        assert!(config.validate().is_ok());
        assert_eq!(config.max_cooldown_ms(), 5_000.0);
    }

    #[test]
    fn test_nan_timings_rejected() {
        let mut config = Config::default();
        config.bindings[0].hold_ms = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.bindings[0].cooldown_ms = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = Config {
            track_eviction_ms: f64::NAN,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_reload() {
        let path = std::env::temp_dir()
            .join("nexus-gesture-config-test")
            .join("config.json");
        let mut config = Config::default();
        config.smoothing_window = 9;
        config.save_to(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.smoothing_window, 9);
        assert_eq!(loaded.bindings, config.bindings);

        let _ = std::fs::remove_file(&path);
    }
}
