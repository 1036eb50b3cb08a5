//! Computes per-category and per-budget spend statistics.

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use ledger_domain::{
    percentage_used, Budget, BudgetCategoryAllocation, BudgetStats, CategoryStat, Transaction,
    UtilizationThresholds,
};

use crate::{CoreError, CoreResult};

/// Stateless aggregation over budget snapshots.
///
/// Transactions handed to the service must already be limited to expenses dated
/// inside the budget's active window (see [`crate::window::expenses_in_window`]).
/// The service never reads the clock, so identical inputs always produce identical
/// output.
pub struct StatsService;

impl StatsService {
    /// Computes stats with the default utilization thresholds.
    pub fn compute_budget_stats(
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
        transactions: &[Transaction],
    ) -> CoreResult<BudgetStats> {
        Self::compute_budget_stats_with(
            budget,
            allocations,
            transactions,
            &UtilizationThresholds::default(),
        )
    }

    /// Computes stats, classifying utilization against `thresholds`.
    pub fn compute_budget_stats_with(
        budget: &Budget,
        allocations: &[BudgetCategoryAllocation],
        transactions: &[Transaction],
        thresholds: &UtilizationThresholds,
    ) -> CoreResult<BudgetStats> {
        if !thresholds.is_valid() {
            return Err(CoreError::Validation(format!(
                "utilization thresholds must satisfy 0 < warning ({}) <= critical ({})",
                thresholds.warning_percent, thresholds.critical_percent
            )));
        }
        budget.validate_dates()?;
        validate_allocations(budget, allocations)?;
        let spent_by_category = index_spend(transactions)?;

        if allocations.is_empty() {
            return Ok(BudgetStats::empty(budget.id));
        }

        let mut total_allocated = Decimal::ZERO;
        let mut total_spent = Decimal::ZERO;
        let mut categories = Vec::with_capacity(allocations.len());

        for allocation in allocations {
            let spent = spent_by_category
                .get(&allocation.category_id)
                .copied()
                .unwrap_or(Decimal::ZERO);
            let stat = category_stat(allocation, spent, thresholds)?;
            total_allocated = checked_add(total_allocated, allocation.available_amount())?;
            total_spent = checked_add(total_spent, stat.spent_amount)?;
            categories.push(stat);
        }

        let overall_percentage_used = percentage(total_spent, total_allocated)?;
        let is_over_budget = total_spent > total_allocated;
        let stats = BudgetStats {
            budget_id: budget.id,
            total_allocated,
            total_spent,
            total_remaining: total_allocated - total_spent,
            overall_percentage_used,
            is_over_budget,
            band: thresholds.classify(overall_percentage_used, is_over_budget),
            categories,
        };

        debug!(
            budget_id = %budget.id,
            categories = stats.categories.len(),
            total_allocated = %stats.total_allocated,
            total_spent = %stats.total_spent,
            "computed budget stats"
        );
        Ok(stats)
    }
}

/// Free-function form of [`StatsService::compute_budget_stats`].
pub fn compute_budget_stats(
    budget: &Budget,
    allocations: &[BudgetCategoryAllocation],
    transactions: &[Transaction],
) -> CoreResult<BudgetStats> {
    StatsService::compute_budget_stats(budget, allocations, transactions)
}

fn validate_allocations(budget: &Budget, allocations: &[BudgetCategoryAllocation]) -> CoreResult<()> {
    let mut seen = HashSet::with_capacity(allocations.len());
    for allocation in allocations {
        if allocation.budget_id != budget.id {
            return Err(CoreError::Validation(format!(
                "allocation {} belongs to budget {}, not {}",
                allocation.id, allocation.budget_id, budget.id
            )));
        }
        if allocation.allocated_amount < Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "allocation {} has negative allocated amount {}",
                allocation.id, allocation.allocated_amount
            )));
        }
        if !seen.insert(allocation.category_id) {
            return Err(CoreError::Validation(format!(
                "budget {} has more than one allocation for category {}",
                budget.id, allocation.category_id
            )));
        }
    }
    Ok(())
}

/// Sums item amounts per category in one pass over the transactions.
fn index_spend(transactions: &[Transaction]) -> CoreResult<HashMap<Uuid, Decimal>> {
    let mut spent: HashMap<Uuid, Decimal> = HashMap::new();
    for txn in transactions {
        if !txn.is_expense() {
            return Err(CoreError::Validation(format!(
                "transaction {} is {}; only expenses count against a budget",
                txn.id, txn.transaction_type
            )));
        }
        for item in &txn.items {
            if item.amount <= Decimal::ZERO {
                return Err(CoreError::Validation(format!(
                    "item {} of transaction {} has non-positive amount {}",
                    item.id, txn.id, item.amount
                )));
            }
            let entry = spent.entry(item.category_id).or_insert(Decimal::ZERO);
            *entry = checked_add(*entry, item.amount)?;
        }
    }
    Ok(spent)
}

fn category_stat(
    allocation: &BudgetCategoryAllocation,
    spent: Decimal,
    thresholds: &UtilizationThresholds,
) -> CoreResult<CategoryStat> {
    let percentage_used = percentage(spent, allocation.allocated_amount)?;
    let is_over_budget = spent > allocation.allocated_amount;
    Ok(CategoryStat {
        category_id: allocation.category_id,
        category_name: allocation.category_name.clone(),
        allocated_amount: allocation.allocated_amount,
        carried_over_amount: allocation.carried_over_amount,
        spent_amount: spent,
        remaining_amount: allocation.available_amount() - spent,
        percentage_used,
        is_over_budget,
        band: thresholds.classify(percentage_used, is_over_budget),
    })
}

fn percentage(spent: Decimal, allocated: Decimal) -> CoreResult<Decimal> {
    percentage_used(spent, allocated).ok_or_else(|| {
        CoreError::Validation(format!("percentage of {spent} over {allocated} overflows"))
    })
}

fn checked_add(total: Decimal, amount: Decimal) -> CoreResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| CoreError::Validation(format!("adding {amount} to {total} overflows")))
}
