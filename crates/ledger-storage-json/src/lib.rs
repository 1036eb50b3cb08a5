use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use chrono::NaiveDate;
use ledger_config::{write_atomic, LedgerConfig};
use ledger_core::{
    storage::{snapshot_warnings, BudgetStore, LedgerSnapshot, TransactionScope, CURRENT_SCHEMA_VERSION},
    CoreError, CoreResult, RenewedBudget,
};
use ledger_domain::{Budget, BudgetCategoryAllocation, Transaction};
use tracing::{debug, warn};
use uuid::Uuid;

/// Filesystem-backed JSON persistence for a whole ledger snapshot.
///
/// Every write reads the current file, applies the change to the in-memory
/// snapshot, and replaces the file through a temp-file rename, so a failed
/// operation leaves the previous file intact. The mutex serializes writers within
/// a process; `Budget::version` catches stale writers.
#[derive(Debug)]
pub struct JsonBudgetStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonBudgetStore {
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
        })
    }

    /// Opens the ledger file at [`LedgerConfig::ledger_path`].
    pub fn from_config(config: &LedgerConfig) -> CoreResult<Self> {
        Self::open(config.ledger_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Adds or replaces a transaction record.
    pub fn record_transaction(&self, transaction: Transaction) -> CoreResult<Uuid> {
        self.write(|snapshot| Ok(snapshot.upsert_transaction(transaction)))
    }

    /// Reads the current snapshot from disk, or an empty one when no file exists yet.
    pub fn snapshot(&self) -> CoreResult<LedgerSnapshot> {
        let _guard = self.guard()?;
        load_snapshot_from_path(&self.path)
    }

    fn guard(&self) -> CoreResult<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| CoreError::Storage("json store lock poisoned".into()))
    }

    fn read<T>(&self, op: impl FnOnce(&LedgerSnapshot) -> CoreResult<T>) -> CoreResult<T> {
        let _guard = self.guard()?;
        let snapshot = load_snapshot_from_path(&self.path)?;
        op(&snapshot)
    }

    fn write<T>(&self, op: impl FnOnce(&mut LedgerSnapshot) -> CoreResult<T>) -> CoreResult<T> {
        let _guard = self.guard()?;
        let mut snapshot = load_snapshot_from_path(&self.path)?;
        let out = op(&mut snapshot)?;
        save_snapshot_to_path(&snapshot, &self.path)?;
        Ok(out)
    }
}

impl BudgetStore for JsonBudgetStore {
    fn load_budget(&self, id: Uuid) -> CoreResult<Budget> {
        self.read(|snapshot| snapshot.budget(id).cloned())
    }

    fn load_allocations(&self, budget_id: Uuid) -> CoreResult<Vec<BudgetCategoryAllocation>> {
        self.read(|snapshot| {
            snapshot.budget(budget_id)?;
            Ok(snapshot.allocations_for(budget_id))
        })
    }

    fn load_transactions_in_window(
        &self,
        scope: &TransactionScope,
        start: NaiveDate,
        end: NaiveDate,
    ) -> CoreResult<Vec<Transaction>> {
        self.read(|snapshot| Ok(snapshot.transactions_in_window(scope, start, end)))
    }

    fn persist_budget(&self, budget: &Budget) -> CoreResult<Budget> {
        self.write(|snapshot| snapshot.update_budget(budget))
    }

    fn persist_allocations(
        &self,
        budget_id: Uuid,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<()> {
        self.write(|snapshot| snapshot.replace_allocations(budget_id, allocations))
    }

    fn insert_budget(
        &self,
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
    ) -> CoreResult<Budget> {
        self.write(|snapshot| snapshot.insert_budget(budget, allocations))
    }

    fn insert_renewal(&self, prior: &Budget, renewed: &RenewedBudget) -> CoreResult<Budget> {
        self.write(|snapshot| snapshot.insert_renewal(prior, renewed))
    }
}

/// Loads a snapshot from the provided filesystem path.
pub fn load_snapshot_from_path(path: &Path) -> CoreResult<LedgerSnapshot> {
    if !path.exists() {
        return Ok(LedgerSnapshot::new());
    }
    let data = fs::read_to_string(path)?;
    let snapshot: LedgerSnapshot =
        serde_json::from_str(&data).map_err(|err| CoreError::Serde(err.to_string()))?;
    if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
        return Err(CoreError::Storage(format!(
            "ledger file `{}` uses schema {} but this build reads up to {}",
            path.display(),
            snapshot.schema_version,
            CURRENT_SCHEMA_VERSION
        )));
    }
    for warning in snapshot_warnings(&snapshot) {
        warn!(path = %path.display(), "{warning}");
    }
    Ok(snapshot)
}

/// Saves a snapshot to an arbitrary path on disk.
pub fn save_snapshot_to_path(snapshot: &LedgerSnapshot, path: &Path) -> CoreResult<()> {
    let json =
        serde_json::to_string_pretty(snapshot).map_err(|err| CoreError::Serde(err.to_string()))?;
    write_atomic(path, &json)?;
    debug!(
        path = %path.display(),
        budgets = snapshot.budgets.len(),
        transactions = snapshot.transactions.len(),
        "saved ledger snapshot"
    );
    Ok(())
}
