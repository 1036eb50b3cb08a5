use std::{
    collections::HashSet,
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use ledger_domain::{Budget, BudgetCategoryAllocation, Identifiable, Transaction};

use crate::{renewal_service::RenewedBudget, CoreError, CoreResult};

pub const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Which accounts a transaction query covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TransactionScope {
    #[default]
    AllAccounts,
    Accounts(Vec<Uuid>),
}

impl TransactionScope {
    pub fn for_budget(budget: &Budget) -> Self {
        if budget.account_ids.is_empty() {
            TransactionScope::AllAccounts
        } else {
            TransactionScope::Accounts(budget.account_ids.clone())
        }
    }

    /// A transaction is in scope when any of its items touches a scoped account.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        match self {
            TransactionScope::AllAccounts => true,
            TransactionScope::Accounts(ids) => transaction
                .items
                .iter()
                .any(|item| ids.contains(&item.account_id)),
        }
    }
}

/// Persistence contract the engine consumes.
///
/// Implementations must serialize writers per budget: `persist_budget` only succeeds
/// when the incoming `version` equals the stored one, and bumps it.
pub trait BudgetStore: Send + Sync {
    fn load_budget(&self, id: Uuid) -> CoreResult<Budget>;
    fn load_allocations(&self, budget_id: Uuid) -> CoreResult<Vec<BudgetCategoryAllocation>>;
    fn load_transactions_in_window(
        &self,
        scope: &TransactionScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<Transaction>>;
    /// Writes an existing budget, returning the stored copy with its new version.
    fn persist_budget(&self, budget: &Budget) -> CoreResult<Budget>;
    /// Replaces every allocation of `budget_id`.
    fn persist_allocations(
        &self,
        budget_id: Uuid,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<()>;
    /// Inserts a new budget together with its allocations; both land or neither does.
    fn insert_budget(
        &self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<Budget>;
    /// Inserts the successor of `prior`. Fails with [`CoreError::Conflict`] when the
    /// stored `prior` no longer has the version it was renewed from.
    fn insert_renewal(&self, prior: &Budget, renewed: &RenewedBudget) -> CoreResult<Budget>;
}

/// Everything a store holds, in one serializable value.
///
/// Both bundled stores mutate a snapshot and only publish it when the whole
/// operation succeeded, which gives callers all-or-nothing writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(default = "LedgerSnapshot::schema_version_default")]
    pub schema_version: u8,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub allocations: Vec<BudgetCategoryAllocation>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Default for LedgerSnapshot {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            budgets: Vec::new(),
            allocations: Vec::new(),
            transactions: Vec::new(),
        }
    }
}

impl LedgerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }

    pub fn budget(&self, id: Uuid) -> CoreResult<&Budget> {
        self.budgets
            .iter()
            .find(|budget| budget.id == id)
            .ok_or(CoreError::BudgetNotFound(id))
    }

    pub fn allocations_for(&self, budget_id: Uuid) -> Vec<BudgetCategoryAllocation> {
        self.allocations
            .iter()
            .filter(|allocation| allocation.budget_id == budget_id)
            .cloned()
            .collect()
    }

    pub fn transactions_in_window(
        &self,
        scope: &TransactionScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<Transaction> {
        self.transactions
            .iter()
            .filter(|txn| txn.date >= start && txn.date <= end && scope.matches(txn))
            .cloned()
            .collect()
    }

    pub fn update_budget(&mut self, budget: &Budget) -> CoreResult<Budget> {
        let stored = self
            .budgets
            .iter_mut()
            .find(|existing| existing.id == budget.id)
            .ok_or(CoreError::BudgetNotFound(budget.id))?;
        if stored.version != budget.version {
            warn!(
                budget_id = %budget.id,
                expected = budget.version,
                found = stored.version,
                "rejected stale budget write"
            );
            return Err(CoreError::Conflict {
                budget_id: budget.id,
                expected: budget.version,
                found: stored.version,
            });
        }
        let mut next = budget.clone();
        next.version += 1;
        *stored = next.clone();
        Ok(next)
    }

    pub fn replace_allocations(
        &mut self,
        budget_id: Uuid,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<()> {
        self.budget(budget_id)?;
        check_allocations(budget_id, allocations)?;
        self.allocations
            .retain(|allocation| allocation.budget_id != budget_id);
        self.allocations.extend_from_slice(allocations);
        Ok(())
    }

    pub fn insert_budget(
        &mut self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<Budget> {
        if self.budgets.iter().any(|existing| existing.id == budget.id) {
            return Err(CoreError::Validation(format!(
                "budget {} already exists",
                budget.id
            )));
        }
        if let Some(previous) = budget.previous_budget_id {
            if let Some(successor) = self
                .budgets
                .iter()
                .find(|existing| existing.previous_budget_id == Some(previous))
            {
                return Err(CoreError::InvalidState(format!(
                    "budget {} was already renewed as {}",
                    previous, successor.id
                )));
            }
        }
        budget.validate_dates()?;
        check_allocations(budget.id, allocations)?;
        let mut stored = budget.clone();
        stored.version = budget.version + 1;
        self.budgets.push(stored.clone());
        self.allocations.extend_from_slice(allocations);
        Ok(stored)
    }

    pub fn insert_renewal(
        &mut self,
        prior: &Budget,
        renewed: &RenewedBudget,
    ) -> CoreResult<Budget> {
        if renewed.budget.previous_budget_id != Some(prior.id) {
            return Err(CoreError::Validation(format!(
                "budget {} is not a renewal of {}",
                renewed.budget.id, prior.id
            )));
        }
        let stored = self.budget(prior.id)?;
        if stored.version != prior.version {
            warn!(
                budget_id = %prior.id,
                expected = prior.version,
                found = stored.version,
                "rejected renewal of a budget changed since it was read"
            );
            return Err(CoreError::Conflict {
                budget_id: prior.id,
                expected: prior.version,
                found: stored.version,
            });
        }
        self.insert_budget(&renewed.budget, &renewed.allocations)
    }

    pub fn upsert_transaction(&mut self, transaction: Transaction) -> Uuid {
        upsert(&mut self.transactions, transaction)
    }
}

fn upsert<T: Identifiable>(items: &mut Vec<T>, item: T) -> Uuid {
    let id = item.id();
    match items.iter_mut().find(|existing| existing.id() == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
    id
}

fn check_allocations(budget_id: Uuid, allocations: &[BudgetCategoryAllocation]) -> CoreResult<()> {
    let mut categories = HashSet::with_capacity(allocations.len());
    for allocation in allocations {
        if allocation.budget_id != budget_id {
            return Err(CoreError::Validation(format!(
                "allocation {} belongs to budget {}, not {}",
                allocation.id, allocation.budget_id, budget_id
            )));
        }
        if !categories.insert(allocation.category_id) {
            return Err(CoreError::Validation(format!(
                "budget {} has more than one allocation for category {}",
                budget_id, allocation.category_id
            )));
        }
    }
    Ok(())
}

/// Detects dangling references and other anomalies within a snapshot.
pub fn snapshot_warnings(snapshot: &LedgerSnapshot) -> Vec<String> {
    let budget_ids: HashSet<_> = snapshot.budgets.iter().map(|b| b.id).collect();
    let mut warnings = Vec::new();

    for allocation in &snapshot.allocations {
        if !budget_ids.contains(&allocation.budget_id) {
            warnings.push(format!(
                "allocation {} references missing budget {}",
                allocation.id, allocation.budget_id
            ));
        }
    }
    for budget in &snapshot.budgets {
        if let Some(previous) = budget.previous_budget_id {
            if !budget_ids.contains(&previous) {
                warnings.push(format!(
                    "budget {} was renewed from missing budget {}",
                    budget.id, previous
                ));
            }
        }
        if budget.validate_dates().is_err() {
            warnings.push(format!("budget {} ends before it starts", budget.id));
        }
    }
    for txn in &snapshot.transactions {
        if txn.items.is_empty() {
            warnings.push(format!("transaction {} has no items", txn.id));
        }
        if txn.items.iter().any(|item| item.transaction_id != txn.id) {
            warnings.push(format!(
                "transaction {} contains items owned by another transaction",
                txn.id
            ));
        }
    }
    warnings
}

/// In-process store guarded by a mutex.
#[derive(Debug, Default)]
pub struct MemoryBudgetStore {
    state: Mutex<LedgerSnapshot>,
}

impl MemoryBudgetStore {
    pub fn new() -> Self {
        Self::from_snapshot(LedgerSnapshot::new())
    }

    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot),
        }
    }

    pub fn record_transaction(&self, transaction: Transaction) -> CoreResult<Uuid> {
        Ok(self.lock()?.upsert_transaction(transaction))
    }

    pub fn snapshot(&self) -> CoreResult<LedgerSnapshot> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> CoreResult<MutexGuard<'_, LedgerSnapshot>> {
        self.state
            .lock()
            .map_err(|_| CoreError::Storage("memory store lock poisoned".into()))
    }

    /// Runs `op` against a scratch copy and publishes it only on success.
    fn write<T>(&self, op: impl FnOnce(&mut LedgerSnapshot) -> CoreResult<T>) -> CoreResult<T> {
        let mut guard = self.lock()?;
        let mut draft = guard.clone();
        let out = op(&mut draft)?;
        *guard = draft;
        Ok(out)
    }
}

impl BudgetStore for MemoryBudgetStore {
    fn load_budget(&self, id: Uuid) -> CoreResult<Budget> {
        self.lock()?.budget(id).cloned()
    }

    fn load_allocations(&self, budget_id: Uuid) -> CoreResult<Vec<BudgetCategoryAllocation>> {
        let state = self.lock()?;
        state.budget(budget_id)?;
        Ok(state.allocations_for(budget_id))
    }

    fn load_transactions_in_window(
        &self,
        scope: &TransactionScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<Transaction>> {
        Ok(self.lock()?.transactions_in_window(scope, start, end))
    }

    fn persist_budget(&self, budget: &Budget) -> CoreResult<Budget> {
        self.write(|state| state.update_budget(budget))
    }

    fn persist_allocations(
        &self,
        budget_id: Uuid,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<()> {
        self.write(|state| state.replace_allocations(budget_id, allocations))
    }

    fn insert_budget(
        &self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<Budget> {
        self.write(|state| state.insert_budget(budget, allocations))
    }

    fn insert_renewal(&self, prior: &Budget, renewed: &RenewedBudget) -> CoreResult<Budget> {
        self.write(|state| state.insert_renewal(prior, renewed))
    }
}
