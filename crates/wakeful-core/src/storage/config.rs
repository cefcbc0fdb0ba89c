//! TOML-based application configuration.
//!
//! Stores user preferences: default snooze behavior for new alarms and
//! feedback channel settings. Stored at `~/.config/wakeful/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;

/// Defaults applied to newly created alarms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_max_snoozes")]
    pub max_snoozes: u32,
    #[serde(default = "default_snooze_duration")]
    pub snooze_duration_min: u32,
}

/// Feedback channel configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackConfig {
    #[serde(default = "default_true")]
    pub vibration: bool,
    /// Path to a custom alarm sound file (optional). If unset the
    /// backend's default alarm tone is used.
    #[serde(default)]
    pub custom_sound: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/wakeful/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
}

fn default_max_snoozes() -> u32 {
    3
}
fn default_snooze_duration() -> u32 {
    5
}
fn default_true() -> bool {
    true
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            max_snoozes: default_max_snoozes(),
            snooze_duration_min: default_snooze_duration(),
        }
    }
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        Self {
            vibration: true,
            custom_sound: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            defaults: DefaultsConfig::default(),
            feedback: FeedbackConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the default file on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
