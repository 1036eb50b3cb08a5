use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{atomic::write_atomic, ConfigError, LedgerConfig};

const CONFIG_FILE_NAME: &str = "config.json";

/// Handles persistence for [`LedgerConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ConfigError> {
        let config_dir = base.join("config");
        fs::create_dir_all(&config_dir)?;
        Ok(Self::new(config_dir.join(CONFIG_FILE_NAME)))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Loads and validates the stored config, falling back to defaults when absent.
    pub fn load(&self) -> Result<LedgerConfig, ConfigError> {
        if !self.config_path.exists() {
            return Ok(LedgerConfig::default());
        }
        let data = fs::read_to_string(&self.config_path)?;
        let config: LedgerConfig =
            serde_json::from_str(&data).map_err(|err| ConfigError::Serde(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, config: &LedgerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| ConfigError::Serde(err.to_string()))?;
        write_atomic(&self.config_path, &json)?;
        Ok(())
    }
}
