//! Derived spend statistics. These are views computed per query and never stored.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Spend snapshot for a single allocated category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryStat {
    pub category_id: Uuid,
    pub category_name: String,
    pub allocated_amount: Decimal,
    pub carried_over_amount: Decimal,
    pub spent_amount: Decimal,
    /// Allocated plus carried over, minus spent.
    pub remaining_amount: Decimal,
    /// `spent / allocated * 100`, or zero when nothing is allocated.
    pub percentage_used: Decimal,
    /// `spent > allocated`.
    pub is_over_budget: bool,
    pub band: UtilizationBand,
}

/// Spend snapshot for a whole budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetStats {
    pub budget_id: Uuid,
    /// Sum of allocated plus carried-over amounts.
    pub total_allocated: Decimal,
    pub total_spent: Decimal,
    pub total_remaining: Decimal,
    pub overall_percentage_used: Decimal,
    pub is_over_budget: bool,
    pub band: UtilizationBand,
    pub categories: Vec<CategoryStat>,
}

impl BudgetStats {
    /// All-zero stats for a budget with no allocations.
    pub fn empty(budget_id: Uuid) -> Self {
        Self {
            budget_id,
            total_allocated: Decimal::ZERO,
            total_spent: Decimal::ZERO,
            total_remaining: Decimal::ZERO,
            overall_percentage_used: Decimal::ZERO,
            is_over_budget: false,
            band: UtilizationBand::Healthy,
            categories: Vec::new(),
        }
    }

    pub fn category_stat(&self, category_id: Uuid) -> Option<&CategoryStat> {
        self.categories
            .iter()
            .find(|stat| stat.category_id == category_id)
    }

    pub fn over_budget_categories(&self) -> impl Iterator<Item = &CategoryStat> {
        self.categories.iter().filter(|stat| stat.is_over_budget)
    }
}

/// Utilization of `allocated` by `spent` as a percentage.
///
/// Zero allocation yields zero regardless of spend. Returns `None` only on decimal
/// overflow.
pub fn percentage_used(spent: Decimal, allocated: Decimal) -> Option<Decimal> {
    if allocated <= Decimal::ZERO {
        return Some(Decimal::ZERO);
    }
    spent.checked_div(allocated)?.checked_mul(HUNDRED)
}

/// Coarse utilization classification used to colour budgets in the UI.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UtilizationBand {
    Healthy,
    Warning,
    Critical,
    OverBudget,
}

impl fmt::Display for UtilizationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UtilizationBand::Healthy => "Healthy",
            UtilizationBand::Warning => "Warning",
            UtilizationBand::Critical => "Critical",
            UtilizationBand::OverBudget => "Over Budget",
        };
        f.write_str(label)
    }
}

/// Percentage thresholds separating the utilization bands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct UtilizationThresholds {
    pub warning_percent: Decimal,
    pub critical_percent: Decimal,
}

impl Default for UtilizationThresholds {
    fn default() -> Self {
        Self {
            warning_percent: Decimal::from(75),
            critical_percent: Decimal::from(90),
        }
    }
}

impl UtilizationThresholds {
    pub fn is_valid(&self) -> bool {
        self.warning_percent > Decimal::ZERO && self.warning_percent <= self.critical_percent
    }

    pub fn classify(&self, percentage_used: Decimal, is_over_budget: bool) -> UtilizationBand {
        if is_over_budget {
            UtilizationBand::OverBudget
        } else if percentage_used >= self.critical_percent {
            UtilizationBand::Critical
        } else if percentage_used >= self.warning_percent {
            UtilizationBand::Warning
        } else {
            UtilizationBand::Healthy
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_allocation_is_zero_percent() {
        assert_eq!(percentage_used(dec!(250), dec!(0)), Some(dec!(0)));
        assert_eq!(percentage_used(dec!(0), dec!(0)), Some(dec!(0)));
    }

    #[test]
    fn percentage_is_exact_for_decimal_amounts() {
        assert_eq!(percentage_used(dec!(450), dec!(500)), Some(dec!(90)));
        assert_eq!(percentage_used(dec!(550), dec!(500)), Some(dec!(110)));
    }

    #[test]
    fn thresholds_classify_bands() {
        let thresholds = UtilizationThresholds::default();
        assert_eq!(thresholds.classify(dec!(10), false), UtilizationBand::Healthy);
        assert_eq!(thresholds.classify(dec!(75), false), UtilizationBand::Warning);
        assert_eq!(thresholds.classify(dec!(100), false), UtilizationBand::Critical);
        assert_eq!(thresholds.classify(dec!(0), true), UtilizationBand::OverBudget);
    }

    #[test]
    fn inverted_thresholds_are_invalid() {
        let thresholds = UtilizationThresholds {
            warning_percent: dec!(95),
            critical_percent: dec!(80),
        };
        assert!(!thresholds.is_valid());
        assert!(UtilizationThresholds::default().is_valid());
    }
}
