//! Construction parameters for tierlist.
//!
//! A [`TieredListConfig`] carries the level cap, the level-growth probability and
//! the duplicate-key policy. Configs can be built in code or loaded from JSON or
//! YAML files, and are always validated before a list is built from them.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Level cap used when none is configured.
pub const DEFAULT_MAX_LEVEL: usize = 16;

/// Level-growth probability used when none is configured.
pub const DEFAULT_LEVEL_PROBABILITY: f64 = 0.5;

/// Invalid construction parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_level must be at least 1, got {0}")]
    InvalidMaxLevel(usize),
    #[error("level_probability must be strictly between 0 and 1, got {0}")]
    InvalidProbability(f64),
}

/// What an insert does when its key is already present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnDuplicate {
    /// Keep the stored value and discard the insert.
    #[default]
    Keep,
    /// Overwrite the stored value in place.
    Replace,
}

/// Parameters fixed when a tiered list is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TieredListConfig {
    /// Highest level a node may reach (inclusive)
    #[serde(default = "default_max_level")]
    pub max_level: usize,

    /// Probability that a node climbs one more level
    #[serde(default = "default_level_probability")]
    pub level_probability: f64,

    /// Duplicate-key insert policy
    #[serde(default)]
    pub on_duplicate: OnDuplicate,
}

fn default_max_level() -> usize {
    DEFAULT_MAX_LEVEL
}

fn default_level_probability() -> f64 {
    DEFAULT_LEVEL_PROBABILITY
}

impl Default for TieredListConfig {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_LEVEL,
            level_probability: DEFAULT_LEVEL_PROBABILITY,
            on_duplicate: OnDuplicate::Keep,
        }
    }
}

impl TieredListConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    pub fn with_level_probability(mut self, level_probability: f64) -> Self {
        self.level_probability = level_probability;
        self
    }

    pub fn with_on_duplicate(mut self, on_duplicate: OnDuplicate) -> Self {
        self.on_duplicate = on_duplicate;
        self
    }

    /// Reject parameters that would produce a malformed level distribution.
    ///
    /// Out-of-range values are errors, never clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_level < 1 {
            return Err(ConfigError::InvalidMaxLevel(self.max_level));
        }
        // NaN fails both comparisons
        if !(self.level_probability > 0.0 && self.level_probability < 1.0) {
            return Err(ConfigError::InvalidProbability(self.level_probability));
        }
        Ok(())
    }
}

/// Config file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConfigFormat {
    Json,
    #[default]
    Yaml,
}

impl ConfigFormat {
    /// Pick a format from the file extension, falling back to YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => ConfigFormat::Json,
            Some("yaml") | Some("yml") => ConfigFormat::Yaml,
            _ => ConfigFormat::default(),
        }
    }
}

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> anyhow::Result<TieredListConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;

    let config: TieredListConfig = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse JSON config: {}", e))?,
        ConfigFormat::Yaml => serde_yaml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e))?,
    };

    config
        .validate()
        .with_context(|| format!("Invalid config {}", path.display()))?;
    Ok(config)
}

/// Save a config file
pub fn save_config(config: &TieredListConfig, path: impl AsRef<Path>) -> anyhow::Result<()> {
    let path = path.as_ref();
    let contents = match ConfigFormat::from_path(path) {
        ConfigFormat::Json => serde_json::to_string_pretty(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize JSON config: {}", e))?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)
            .map_err(|e| anyhow::anyhow!("Failed to serialize YAML config: {}", e))?,
    };

    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write config {}", path.display()))?;
    Ok(())
}
