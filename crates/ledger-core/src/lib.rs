//! ledger-core
//!
//! Budget aggregation, status lifecycle, and renewal logic.
//! Depends on ledger-domain. No terminal I/O; persistence is reached only through
//! the [`storage::BudgetStore`] contract.

pub mod error;
pub mod lifecycle_service;
pub mod renewal_service;
pub mod stats_service;
pub mod storage;
pub mod time;
pub mod window;

pub use error::{CoreError, CoreResult};
pub use lifecycle_service::*;
pub use renewal_service::*;
pub use stats_service::*;
pub use storage::{BudgetStore, LedgerSnapshot, MemoryBudgetStore, TransactionScope};
pub use time::{Clock, FixedClock, SystemClock};
pub use window::expenses_in_window;
