//! Runtime tunables, loadable from TOML.
//!
//! Every knob has a default matching the instrument's published procedure,
//! so `RuntimeConfig::default()` is a complete, valid configuration and a
//! TOML file only needs to name the fields it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use anima_contracts::error::{AnimaError, AnimaResult};

/// Tunable thresholds for one orchestrator instance.
///
/// Construct via `Default`, `from_toml_str`, or `from_file`, then pass to
/// the agent constructors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// PHQ-2 score at or above which a PHQ-9 promotion is recommended.
    #[serde(default = "default_phq2_promotion_threshold")]
    pub phq2_promotion_threshold: u8,

    /// Failed voice recordings tolerated before the recording task aborts.
    #[serde(default = "default_max_recording_attempts")]
    pub max_recording_attempts: u8,

    /// Failed biometric submissions tolerated before collection aborts.
    #[serde(default = "default_max_collection_attempts")]
    pub max_collection_attempts: u8,

    /// Required duration of a voice recording, in seconds.
    #[serde(default = "default_recording_duration_secs")]
    pub recording_duration_secs: u64,

    /// Slack allowed either side of `recording_duration_secs`, in seconds.
    #[serde(default = "default_recording_tolerance_secs")]
    pub recording_tolerance_secs: u64,
}

fn default_phq2_promotion_threshold() -> u8 {
    3
}

fn default_max_recording_attempts() -> u8 {
    2
}

fn default_max_collection_attempts() -> u8 {
    2
}

fn default_recording_duration_secs() -> u64 {
    35
}

fn default_recording_tolerance_secs() -> u64 {
    1
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            phq2_promotion_threshold: default_phq2_promotion_threshold(),
            max_recording_attempts: default_max_recording_attempts(),
            max_collection_attempts: default_max_collection_attempts(),
            recording_duration_secs: default_recording_duration_secs(),
            recording_tolerance_secs: default_recording_tolerance_secs(),
        }
    }
}

impl RuntimeConfig {
    /// Parse `s` as TOML and build a `RuntimeConfig`.
    ///
    /// Returns `AnimaError::Config` if the TOML is malformed or a value is
    /// out of range.
    pub fn from_toml_str(s: &str) -> AnimaResult<Self> {
        let config: RuntimeConfig = toml::from_str(s).map_err(|e| AnimaError::Config {
            reason: format!("failed to parse runtime TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML runtime configuration.
    ///
    /// Returns `AnimaError::Config` if the file cannot be read or its
    /// contents are not valid TOML matching `RuntimeConfig`.
    pub fn from_file(path: &Path) -> AnimaResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| AnimaError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    /// Range-check every field.
    ///
    /// The promotion threshold must be achievable on a PHQ-2 (0..=6) and the
    /// attempt budgets must allow at least one attempt.
    pub fn validate(&self) -> AnimaResult<()> {
        if self.phq2_promotion_threshold > 6 {
            return Err(AnimaError::Config {
                reason: format!(
                    "phq2_promotion_threshold must be 0..=6, got {}",
                    self.phq2_promotion_threshold
                ),
            });
        }
        if self.max_recording_attempts == 0 {
            return Err(AnimaError::Config {
                reason: "max_recording_attempts must be at least 1".into(),
            });
        }
        if self.max_collection_attempts == 0 {
            return Err(AnimaError::Config {
                reason: "max_collection_attempts must be at least 1".into(),
            });
        }
        Ok(())
    }
}
