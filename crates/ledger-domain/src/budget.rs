//! Domain types describing a user's spending plan for a period.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    common::{Identifiable, RecurringPeriod},
    status::BudgetStatus,
    window::{BudgetWindow, BudgetWindowError},
};

/// A spending plan with one or more category allocations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Budget {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub start_date: NaiveDate,
    /// Open-ended when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub recurring_period: RecurringPeriod,
    #[serde(default)]
    pub carry_over_enabled: bool,
    #[serde(default)]
    pub status: BudgetStatus,
    /// Accounts whose items count against this budget. Empty means every account.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub account_ids: Vec<Uuid>,
    /// Budget instance this one was renewed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_budget_id: Option<Uuid>,
    /// Day tracking stopped, set while the budget is paused or archived. Expenses
    /// dated after it do not count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_stopped_on: Option<NaiveDate>,
    /// Write counter maintained by the store for optimistic concurrency.
    #[serde(default)]
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(name: impl Into<String>, owner_id: Uuid, start_date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            owner_id,
            start_date,
            end_date: None,
            recurring_period: RecurringPeriod::None,
            carry_over_enabled: false,
            status: BudgetStatus::Active,
            account_ids: Vec::new(),
            previous_budget_id: None,
            tracking_stopped_on: None,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_recurring_period(mut self, period: RecurringPeriod) -> Self {
        self.recurring_period = period;
        self
    }

    pub fn with_carry_over(mut self, enabled: bool) -> Self {
        self.carry_over_enabled = enabled;
        self
    }

    pub fn with_accounts(mut self, account_ids: impl IntoIterator<Item = Uuid>) -> Self {
        self.account_ids = account_ids.into_iter().collect();
        self
    }

    /// Checks `start_date <= end_date` when an end date is set.
    pub fn validate_dates(&self) -> Result<(), BudgetWindowError> {
        match self.end_date {
            Some(end) => BudgetWindow::new(self.start_date, end).map(|_| ()),
            None => Ok(()),
        }
    }

    /// The window expenses are tracked over.
    ///
    /// Open-ended budgets close at `today`, and a budget that stopped tracking closes
    /// on the day it stopped. Returns `Ok(None)` when that leaves nothing to track
    /// yet, e.g. an open-ended budget starting after `today`.
    pub fn active_window(
        &self,
        today: NaiveDate,
    ) -> Result<Option<BudgetWindow>, BudgetWindowError> {
        self.validate_dates()?;
        let mut end = self.end_date.unwrap_or(today);
        if !self.status.is_tracking() {
            if let Some(stopped) = self.tracking_stopped_on {
                end = end.min(stopped);
            }
        }
        if end < self.start_date {
            return Ok(None);
        }
        BudgetWindow::new(self.start_date, end).map(Some)
    }

    /// Whether items booked against `account_id` count toward this budget.
    pub fn covers_account(&self, account_id: Uuid) -> bool {
        self.account_ids.is_empty() || self.account_ids.contains(&account_id)
    }

    pub fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

impl Identifiable for Budget {
    fn id(&self) -> Uuid {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_budget_starts_active_and_open_ended() {
        let budget = Budget::new("Groceries", Uuid::new_v4(), date(2025, 1, 1));
        assert_eq!(budget.status, BudgetStatus::Active);
        assert!(budget.end_date.is_none());
        assert_eq!(budget.version, 0);
        assert!(budget.validate_dates().is_ok());
    }

    #[test]
    fn end_before_start_fails_validation() {
        let budget =
            Budget::new("Backwards", Uuid::new_v4(), date(2025, 2, 1)).with_end_date(date(2025, 1, 1));
        assert!(budget.validate_dates().is_err());
    }

    #[test]
    fn open_ended_window_closes_today() {
        let budget = Budget::new("Open", Uuid::new_v4(), date(2025, 1, 1));
        let window = budget.active_window(date(2025, 1, 20)).unwrap().unwrap();
        assert_eq!(window.end, date(2025, 1, 20));
    }

    #[test]
    fn open_ended_budget_starting_later_has_no_window_yet() {
        let budget = Budget::new("Next month", Uuid::new_v4(), date(2025, 2, 1));
        assert_eq!(budget.active_window(date(2025, 1, 15)).unwrap(), None);
    }

    #[test]
    fn stopped_budget_closes_on_the_day_it_stopped() {
        let mut budget = Budget::new("Paused", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31));
        budget.status = BudgetStatus::Paused;
        budget.tracking_stopped_on = Some(date(2025, 1, 10));
        let window = budget.active_window(date(2025, 2, 1)).unwrap().unwrap();
        assert_eq!(window.end, date(2025, 1, 10));

        budget.status = BudgetStatus::Active;
        let window = budget.active_window(date(2025, 2, 1)).unwrap().unwrap();
        assert_eq!(window.end, date(2025, 1, 31));
    }

    #[test]
    fn inverted_bounded_budget_is_still_an_error() {
        let budget =
            Budget::new("Backwards", Uuid::new_v4(), date(2025, 2, 1)).with_end_date(date(2025, 1, 1));
        assert!(budget.active_window(date(2025, 3, 1)).is_err());
    }

    #[test]
    fn empty_account_scope_covers_everything() {
        let account = Uuid::new_v4();
        let open = Budget::new("Open", Uuid::new_v4(), date(2025, 1, 1));
        assert!(open.covers_account(account));
        let scoped = open.clone().with_accounts([Uuid::new_v4()]);
        assert!(!scoped.covers_account(account));
    }

    #[test]
    fn budget_roundtrips_through_json() {
        let budget = Budget::new("January Groceries", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31))
            .with_recurring_period(RecurringPeriod::Monthly)
            .with_carry_over(true);
        let json = serde_json::to_string(&budget).expect("serialize");
        assert!(json.contains("\"monthly\""));
        let restored: Budget = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored, budget);
    }
}
