//! Shared traits, renewal cadences, and calendar helpers for budgeting primitives.

use std::fmt;

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exposes a stable identifier for entities stored in the ledger.
pub trait Identifiable {
    fn id(&self) -> Uuid;
}

/// Enumerates the cadences a budget can renew on.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecurringPeriod {
    #[default]
    None,
    Weekly,
    Monthly,
    Quarterly,
    Yearly,
}

impl RecurringPeriod {
    /// Returns `true` when the budget renews at all.
    pub fn is_recurring(self) -> bool {
        !matches!(self, RecurringPeriod::None)
    }

    /// Advances `from` by one period.
    ///
    /// Month-based cadences keep the day of month and clamp to the last day of the
    /// target month, so `2025-01-31` advances monthly to `2025-02-28`. Returns `None`
    /// for [`RecurringPeriod::None`] or when the result leaves chrono's date range.
    pub fn advance(self, from: NaiveDate) -> Option<NaiveDate> {
        match self {
            RecurringPeriod::None => None,
            RecurringPeriod::Weekly => from.checked_add_days(Days::new(7)),
            RecurringPeriod::Monthly => from.checked_add_months(Months::new(1)),
            RecurringPeriod::Quarterly => from.checked_add_months(Months::new(3)),
            RecurringPeriod::Yearly => from.checked_add_months(Months::new(12)),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RecurringPeriod::None => "One-off",
            RecurringPeriod::Weekly => "Weekly",
            RecurringPeriod::Monthly => "Monthly",
            RecurringPeriod::Quarterly => "Quarterly",
            RecurringPeriod::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for RecurringPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
