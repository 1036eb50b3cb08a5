#![doc(test(attr(deny(warnings))))]

//! Budget Ledger computes per-category spend statistics, utilization bands,
//! lifecycle transitions, and period renewals for user budgets.
//!
//! The engine crates are re-exported so callers only need this one dependency.

pub mod errors;
pub mod ledger;
pub mod utils;

use std::sync::Once;

pub use errors::{LedgerError, LedgerResult};
pub use ledger::BudgetLedger;
pub use ledger_config::{ConfigError, ConfigManager, LedgerConfig};
pub use ledger_core::{
    compute_budget_stats, expenses_in_window, BudgetStore, Clock, CoreError, FixedClock,
    LifecycleService, MemoryBudgetStore, RenewalService, RenewedBudget, StatsService,
    SystemClock, TransactionScope,
};
pub use ledger_domain::*;
pub use ledger_storage_json::JsonBudgetStore;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!(build = %utils::build_info::current(), "Budget Ledger tracing initialized.");
    });
}
