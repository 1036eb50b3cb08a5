use ledger_config::ConfigError;
use ledger_core::CoreError;
use thiserror::Error;

/// Error type returned by the [`crate::BudgetLedger`] facade.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type LedgerResult<T> = Result<T, LedgerError>;
