//! Creates the next period's budget instance for recurring budgets.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use ledger_domain::{
    Budget, BudgetCategoryAllocation, BudgetStats, BudgetStatus, OverspendPolicy,
    RecurringPeriod,
};

use crate::{time::Clock, CoreError, CoreResult};

/// A freshly renewed budget and its allocations, not yet persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RenewedBudget {
    pub budget: Budget,
    pub allocations: Vec<BudgetCategoryAllocation>,
}

/// Renews recurring budgets into new instances, applying carry-over rules.
///
/// Renewal never mutates the closing budget; it stays as the historical record and
/// the new instance links back through `previous_budget_id`. `final_stats` must be
/// computed after the closing period is fully recorded, otherwise carry-over
/// amounts will be wrong.
pub struct RenewalService;

impl RenewalService {
    /// Renews with the default [`OverspendPolicy`].
    pub fn renew_budget(
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
        final_stats: &BudgetStats,
        clock: &dyn Clock,
    ) -> CoreResult<RenewedBudget> {
        Self::renew_with_policy(
            budget,
            allocations,
            final_stats,
            OverspendPolicy::default(),
            clock,
        )
    }

    pub fn renew_with_policy(
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
        final_stats: &BudgetStats,
        policy: OverspendPolicy,
        clock: &dyn Clock,
    ) -> CoreResult<RenewedBudget> {
        ensure_renewable(budget)?;
        if final_stats.budget_id != budget.id {
            return Err(CoreError::Validation(format!(
                "final stats belong to budget {}, not {}",
                final_stats.budget_id, budget.id
            )));
        }

        let (start_date, end_date) = next_period(budget)?;
        let now = clock.now();
        let renewed = Budget {
            id: Uuid::new_v4(),
            start_date,
            end_date,
            status: BudgetStatus::Active,
            previous_budget_id: Some(budget.id),
            tracking_stopped_on: None,
            version: 0,
            created_at: now,
            updated_at: now,
            ..budget.clone()
        };

        let allocations = allocations
            .iter()
            .map(|allocation| {
                if allocation.budget_id != budget.id {
                    return Err(CoreError::Validation(format!(
                        "allocation {} belongs to budget {}, not {}",
                        allocation.id, allocation.budget_id, budget.id
                    )));
                }
                let carried_over = carry_over(budget, allocation, final_stats, policy)?;
                Ok(BudgetCategoryAllocation::new(
                    renewed.id,
                    allocation.category_id,
                    allocation.category_name.clone(),
                    allocation.allocated_amount,
                )
                .with_carried_over(carried_over))
            })
            .collect::<CoreResult<Vec<_>>>()?;

        info!(
            previous_budget_id = %budget.id,
            budget_id = %renewed.id,
            start = %renewed.start_date,
            allocations = allocations.len(),
            ?policy,
            "renewed budget"
        );
        Ok(RenewedBudget {
            budget: renewed,
            allocations,
        })
    }
}

fn ensure_renewable(budget: &Budget) -> CoreResult<()> {
    if budget.recurring_period == RecurringPeriod::None {
        return Err(CoreError::InvalidState(format!(
            "budget {} does not recur",
            budget.id
        )));
    }
    if !budget.status.renews() {
        return Err(CoreError::InvalidState(format!(
            "budget {} is {} and cannot be renewed",
            budget.id, budget.status
        )));
    }
    Ok(())
}

/// Start and end of the period following `budget`'s.
///
/// A budget spanning exactly one period (end = day before the next start) renews
/// into the full next period, so month-end clamping never leaves untracked days:
/// Jan 1–31 renews to Feb 1–28 and then to Mar 1–31. Any other end date is
/// advanced on its own.
pub fn next_period(budget: &Budget) -> CoreResult<(NaiveDate, Option<NaiveDate>)> {
    let advance = |date: NaiveDate| {
        budget.recurring_period.advance(date).ok_or_else(|| {
            CoreError::InvalidState(format!(
                "cannot advance {date} by one {} period",
                budget.recurring_period
            ))
        })
    };
    let day_before = |date: NaiveDate| {
        date.pred_opt()
            .ok_or_else(|| CoreError::InvalidState(format!("no day precedes {date}")))
    };

    let start = advance(budget.start_date)?;
    let whole_period_end = day_before(start)?;
    let end = match budget.end_date {
        None => None,
        Some(end) if end == whole_period_end => Some(day_before(advance(start)?)?),
        Some(end) => Some(advance(end)?),
    };
    Ok((start, end))
}

fn carry_over(
    budget: &Budget,
    allocation: &BudgetCategoryAllocation,
    final_stats: &BudgetStats,
    policy: OverspendPolicy,
) -> CoreResult<Decimal> {
    if !budget.carry_over_enabled {
        return Ok(Decimal::ZERO);
    }
    let stat = final_stats
        .category_stat(allocation.category_id)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "final stats have no entry for category {}",
                allocation.category_id
            ))
        })?;
    let unspent = allocation
        .allocated_amount
        .checked_sub(stat.spent_amount)
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "carry-over for category {} overflows",
                allocation.category_id
            ))
        })?;
    Ok(policy.apply(unspent))
}
