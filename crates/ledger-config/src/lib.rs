//! ledger-config
//!
//! Engine configuration model: utilization thresholds, overspend policy, and where
//! ledger data lives. Owns the LedgerConfig structure plus disk persistence helpers.

pub mod atomic;
pub mod error;
pub mod manager;
pub mod model;

pub use atomic::write_atomic;
pub use error::ConfigError;
pub use manager::ConfigManager;
pub use model::LedgerConfig;
