#![allow(dead_code)]

use std::sync::Mutex;

use budget_ledger::{
    Budget, BudgetCategoryAllocation, BudgetLedger, ConfigManager, FixedClock, JsonBudgetStore,
    LedgerConfig, Transaction,
};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Creates an isolated JSON-backed ledger and config manager for each test.
pub fn setup_test_env(config: LedgerConfig, today: NaiveDate) -> (BudgetLedger<JsonBudgetStore>, ConfigManager) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let config = LedgerConfig {
        data_root: Some(base.join("data")),
        ..config
    };
    let config_manager =
        ConfigManager::with_base_dir(base).expect("create config manager for temp dir");
    config_manager.save(&config).expect("save config");

    let ledger = BudgetLedger::open_json(config)
        .expect("open json ledger")
        .with_clock(FixedClock::on(today));
    (ledger, config_manager)
}

/// A January budget with a single Groceries allocation.
pub struct GroceriesBudget {
    pub budget: Budget,
    pub groceries: Uuid,
    pub account: Uuid,
}

impl GroceriesBudget {
    pub fn create(
        ledger: &BudgetLedger<JsonBudgetStore>,
        allocated: Decimal,
        carry_over: bool,
    ) -> Self {
        let budget = Budget::new("January", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31))
            .with_recurring_period(budget_ledger::RecurringPeriod::Monthly)
            .with_carry_over(carry_over);
        let groceries = Uuid::new_v4();
        let allocation = BudgetCategoryAllocation::new(budget.id, groceries, "Groceries", allocated);
        let budget = ledger
            .create_budget(&budget, &[allocation])
            .expect("create budget");
        Self {
            budget,
            groceries,
            account: Uuid::new_v4(),
        }
    }

    pub fn spend(&self, ledger: &BudgetLedger<JsonBudgetStore>, on: NaiveDate, amount: Decimal) {
        ledger
            .store()
            .record_transaction(
                Transaction::expense(on, "Groceries run").with_item(
                    self.groceries,
                    self.account,
                    amount,
                    "",
                ),
            )
            .expect("record transaction");
    }
}
