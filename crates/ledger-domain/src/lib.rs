//! ledger-domain
//!
//! Pure domain models (Budget, BudgetCategoryAllocation, Transaction, BudgetStats, etc.).
//! No I/O, no storage, no services. Only data types and core enums.

pub mod allocation;
pub mod budget;
pub mod common;
pub mod stats;
pub mod status;
pub mod transaction;
pub mod window;

pub use allocation::*;
pub use budget::*;
pub use common::*;
pub use stats::*;
pub use status::*;
pub use transaction::*;
pub use window::*;
