use ledger_domain::{BudgetAction, BudgetStatus, BudgetWindowError};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid transition: cannot {action} while budget is {from}")]
    InvalidTransition {
        from: BudgetStatus,
        action: BudgetAction,
    },
    #[error("Invalid state: {0}")]
    InvalidState(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Budget not found: {0}")]
    BudgetNotFound(Uuid),
    #[error("Version conflict on budget {budget_id}: expected {expected}, found {found}")]
    Conflict {
        budget_id: Uuid,
        expected: u64,
        found: u64,
    },
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Serialization error: {0}")]
    Serde(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<BudgetWindowError> for CoreError {
    fn from(err: BudgetWindowError) -> Self {
        CoreError::Validation(err.to_string())
    }
}
