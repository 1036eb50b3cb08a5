use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

/// Planned amount assigned to one category within a budget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetCategoryAllocation {
    pub id: Uuid,
    pub budget_id: Uuid,
    pub category_id: Uuid,
    pub category_name: String,
    pub allocated_amount: Decimal,
    /// Rolled in from the previous period. Negative only under an overspend roll-forward policy.
    #[serde(default)]
    pub carried_over_amount: Decimal,
}

impl BudgetCategoryAllocation {
    pub fn new(
        budget_id: Uuid,
        category_id: Uuid,
        category_name: impl Into<String>,
        allocated_amount: Decimal,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            budget_id,
            category_id,
            category_name: category_name.into(),
            allocated_amount,
            carried_over_amount: Decimal::ZERO,
        }
    }

    pub fn with_carried_over(mut self, amount: Decimal) -> Self {
        self.carried_over_amount = amount;
        self
    }

    /// Allocation plus carry-over.
    pub fn available_amount(&self) -> Decimal {
        self.allocated_amount + self.carried_over_amount
    }
}

impl Identifiable for BudgetCategoryAllocation {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// What happens to a negative carry-over (an overspent category) at renewal.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OverspendPolicy {
    /// Overspend is forgiven; the renewed allocation carries zero.
    #[default]
    Absorb,
    /// Overspend reduces the next period's available amount.
    RollForward,
}

impl OverspendPolicy {
    /// Applies the policy to a raw `allocated - spent` carry-over.
    pub fn apply(self, carry_over: Decimal) -> Decimal {
        match self {
            OverspendPolicy::Absorb => carry_over.max(Decimal::ZERO),
            OverspendPolicy::RollForward => carry_over,
        }
    }
}
