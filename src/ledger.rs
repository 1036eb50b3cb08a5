//! Orchestrates load → compute → persist flows over a [`BudgetStore`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use ledger_config::LedgerConfig;
use ledger_core::{
    expenses_in_window, BudgetStore, Clock, CoreError, LifecycleService, RenewalService,
    RenewedBudget, StatsService, SystemClock, TransactionScope,
};
use ledger_domain::{Budget, BudgetAction, BudgetCategoryAllocation, BudgetStats};
use ledger_storage_json::JsonBudgetStore;

use crate::errors::LedgerResult;

/// Budget engine bound to one store and one configuration.
///
/// Every mutating call either fully persists or leaves the store untouched.
pub struct BudgetLedger<S: BudgetStore> {
    store: S,
    config: LedgerConfig,
    clock: Box<dyn Clock>,
}

impl BudgetLedger<JsonBudgetStore> {
    /// Opens the JSON ledger file under the configured data root.
    pub fn open_json(config: LedgerConfig) -> LedgerResult<Self> {
        let store = JsonBudgetStore::from_config(&config)?;
        Self::new(store, config)
    }
}

impl<S: BudgetStore> BudgetLedger<S> {
    pub fn new(store: S, config: LedgerConfig) -> LedgerResult<Self> {
        config.validate()?;
        Ok(Self {
            store,
            config,
            clock: Box::new(SystemClock),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Stores a new budget together with its allocations.
    pub fn create_budget(
        &self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
    ) -> LedgerResult<Budget> {
        check_amounts(allocations)?;
        let stored = self.store.insert_budget(budget, allocations)?;
        info!(
            budget_id = %stored.id,
            name = %stored.name,
            allocations = allocations.len(),
            "created budget"
        );
        Ok(stored)
    }

    /// Replaces the allocations of an existing budget.
    pub fn set_allocations(
        &self,
        budget_id: Uuid,
        allocations: &[BudgetCategoryAllocation],
    ) -> LedgerResult<()> {
        check_amounts(allocations)?;
        self.store.persist_allocations(budget_id, allocations)?;
        Ok(())
    }

    /// Spend statistics for `budget_id` over its window as of `today`.
    pub fn stats(&self, budget_id: Uuid, today: NaiveDate) -> LedgerResult<BudgetStats> {
        let budget = self.store.load_budget(budget_id)?;
        let allocations = self.store.load_allocations(budget_id)?;
        self.stats_for(&budget, &allocations, today)
    }

    /// Loads, transitions, and persists a budget in one step.
    pub fn apply_action(&self, budget_id: Uuid, action: BudgetAction) -> LedgerResult<Budget> {
        let budget = self.store.load_budget(budget_id)?;
        let updated = LifecycleService::transition(&budget, action, self.clock.as_ref())?;
        Ok(self.store.persist_budget(&updated)?)
    }

    pub fn pause_tracking(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::PauseTracking)
    }

    pub fn resume_tracking(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::ResumeTracking)
    }

    pub fn suspend_renewal(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::SuspendRenewal)
    }

    pub fn resume_budget(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::ResumeBudget)
    }

    pub fn archive_budget(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::ArchiveBudget)
    }

    pub fn restore_budget(&self, budget_id: Uuid) -> LedgerResult<Budget> {
        self.apply_action(budget_id, BudgetAction::RestoreBudget)
    }

    /// Closes the current period of `budget_id` and stores its successor.
    ///
    /// A bounded budget can only be renewed once `today` is past its end date, so
    /// the carry-over is computed from a complete period. The store refuses the
    /// successor if the budget changed after it was loaded or was already renewed.
    pub fn renew(&self, budget_id: Uuid, today: NaiveDate) -> LedgerResult<RenewedBudget> {
        let budget = self.store.load_budget(budget_id)?;
        if let Some(end) = budget.end_date {
            if today <= end {
                return Err(CoreError::InvalidState(format!(
                    "budget {} runs until {end}; renew after the period closes",
                    budget.id
                ))
                .into());
            }
        }
        let allocations = self.store.load_allocations(budget_id)?;
        let final_stats = self.stats_for(&budget, &allocations, today)?;
        let renewed = RenewalService::renew_with_policy(
            &budget,
            &allocations,
            &final_stats,
            self.config.overspend_policy,
            self.clock.as_ref(),
        )?;
        let stored = self.store.insert_renewal(&budget, &renewed)?;
        info!(
            budget_id = %budget.id,
            renewed_id = %stored.id,
            start = %stored.start_date,
            "stored renewed budget"
        );
        Ok(RenewedBudget {
            budget: stored,
            allocations: renewed.allocations,
        })
    }

    fn stats_for(
        &self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
        today: NaiveDate,
    ) -> LedgerResult<BudgetStats> {
        let expenses = match budget.active_window(today).map_err(CoreError::from)? {
            Some(window) => {
                let raw = self.store.load_transactions_in_window(
                    &TransactionScope::for_budget(budget),
                    window.start,
                    window.end,
                )?;
                expenses_in_window(budget, &raw, today)?
            }
            None => Vec::new(),
        };
        Ok(StatsService::compute_budget_stats_with(
            budget,
            allocations,
            &expenses,
            &self.config.utilization,
        )?)
    }
}

fn check_amounts(allocations: &[BudgetCategoryAllocation]) -> Result<(), CoreError> {
    match allocations
        .iter()
        .find(|allocation| allocation.allocated_amount < Decimal::ZERO)
    {
        Some(allocation) => Err(CoreError::Validation(format!(
            "allocation {} has negative allocated amount {}",
            allocation.id, allocation.allocated_amount
        ))),
        None => Ok(()),
    }
}
