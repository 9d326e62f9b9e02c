use serde::{Deserialize, Serialize};

use crate::models::{DEFAULT_CYCLE_LENGTH, DEFAULT_PERIOD_LENGTH};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Policy defaults applied when a profile leaves a field empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Cycle length (days) assumed for profiles that don't set one.
    pub default_cycle_length: u32,
    /// Period length (days) assumed for profiles that don't set one.
    pub default_period_length: u32,
    /// Number of future cycles scanned for upcoming events.
    pub horizon_cycles: u32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            default_cycle_length: DEFAULT_CYCLE_LENGTH,
            default_period_length: DEFAULT_PERIOD_LENGTH,
            horizon_cycles: 2,
        }
    }
}

impl PredictorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_cycle_length == 0 {
            return Err(ConfigError::Invalid(
                "default_cycle_length must be at least 1".into(),
            ));
        }
        if self.default_period_length == 0 {
            return Err(ConfigError::Invalid(
                "default_period_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
