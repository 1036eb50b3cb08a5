use std::path::PathBuf;

use ledger_domain::{OverspendPolicy, UtilizationThresholds};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const LEDGER_FILE_NAME: &str = "ledger.json";
const DATA_DIR_NAME: &str = "BudgetLedger";

/// Engine-wide settings shared by every budget in a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    #[serde(default)]
    pub utilization: UtilizationThresholds,
    #[serde(default)]
    pub overspend_policy: OverspendPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    /// Optional custom root directory for ledger data. Defaults to the platform data dir.
    pub data_root: Option<PathBuf>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            utilization: UtilizationThresholds::default(),
            overspend_policy: OverspendPolicy::default(),
            data_root: None,
        }
    }
}

impl LedgerConfig {
    /// Rejects settings the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.utilization.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "utilization thresholds must satisfy 0 < warning ({}) <= critical ({})",
                self.utilization.warning_percent, self.utilization.critical_percent
            )));
        }
        Ok(())
    }

    pub fn resolve_data_root(&self) -> PathBuf {
        if let Some(path) = &self.data_root {
            return path.clone();
        }

        let base = dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        base.join(DATA_DIR_NAME)
    }

    /// Path of the JSON ledger file inside the data root.
    pub fn ledger_path(&self) -> PathBuf {
        self.resolve_data_root().join(LEDGER_FILE_NAME)
    }
}
