use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::location::default_location;
use crate::sun_times::FallbackPolicy;
use crate::types::Location;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub tick_interval_ms: u64,
    pub suggest_debounce_ms: u64,
    pub fallback: FallbackPolicy,
    pub reference_table: Option<PathBuf>,
    pub gazetteer: Option<PathBuf>,
    pub state_dir: PathBuf,
    pub default_location: Location,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval_ms: 1000,
            suggest_debounce_ms: 300,
            fallback: FallbackPolicy::default(),
            reference_table: None,
            gazetteer: None,
            state_dir: PathBuf::from("."),
            default_location: default_location(),
        }
    }
}

impl Config {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn suggest_debounce(&self) -> Duration {
        Duration::from_millis(self.suggest_debounce_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".to_string()));
        }
        crate::location::validate_point(self.default_location.point())
            .map_err(|e| ConfigError::Invalid(format!("default_location: {e}")))?;
        Ok(())
    }
}
