//! Caller-side filtering that establishes the aggregator's input precondition.

use chrono::NaiveDate;

use ledger_domain::{Budget, Transaction};

use crate::CoreResult;

/// Keeps expenses dated within `[start_date, end_date ?? today]`, dropping items on
/// accounts outside the budget's account scope and transactions left without items.
pub fn expenses_in_window(
    budget: &Budget,
    transactions: &[Transaction],
    today: NaiveDate,
) -> CoreResult<Vec<Transaction>> {
    let Some(window) = budget.active_window(today)? else {
        return Ok(Vec::new());
    };
    Ok(transactions
        .iter()
        .filter(|txn| txn.is_expense() && window.contains(txn.date))
        .filter_map(|txn| {
            let items: Vec<_> = txn
                .items
                .iter()
                .filter(|item| budget.covers_account(item.account_id))
                .cloned()
                .collect();
            if items.is_empty() {
                None
            } else {
                Some(Transaction {
                    items,
                    ..txn.clone()
                })
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    use super::*;
    use crate::CoreError;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn keeps_only_expenses_inside_the_window() {
        let budget = Budget::new("January", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31));
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        let txns = vec![
            Transaction::expense(date(2024, 12, 31), "Early").with_item(category, account, dec!(5), ""),
            Transaction::expense(date(2025, 1, 1), "First").with_item(category, account, dec!(10), ""),
            Transaction::expense(date(2025, 1, 31), "Last").with_item(category, account, dec!(20), ""),
            Transaction::income(date(2025, 1, 15), "Pay").with_item(category, account, dec!(99), ""),
            Transaction::expense(date(2025, 2, 1), "Late").with_item(category, account, dec!(40), ""),
        ];

        let kept = expenses_in_window(&budget, &txns, date(2025, 3, 1)).unwrap();
        let titles: Vec<_> = kept.iter().map(|txn| txn.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Last"]);
    }

    #[test]
    fn open_ended_budget_closes_at_today() {
        let budget = Budget::new("Rolling", Uuid::new_v4(), date(2025, 1, 1));
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        let txns = vec![
            Transaction::expense(date(2025, 1, 10), "Past").with_item(category, account, dec!(5), ""),
            Transaction::expense(date(2025, 1, 20), "Future").with_item(category, account, dec!(5), ""),
        ];
        let kept = expenses_in_window(&budget, &txns, date(2025, 1, 15)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Past");
    }

    #[test]
    fn account_scope_trims_items() {
        let card = Uuid::new_v4();
        let cash = Uuid::new_v4();
        let budget = Budget::new("Card only", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31))
            .with_accounts([card]);
        let category = Uuid::new_v4();
        let txns = vec![
            Transaction::expense(date(2025, 1, 5), "Split")
                .with_item(category, card, dec!(30), "")
                .with_item(category, cash, dec!(12), ""),
            Transaction::expense(date(2025, 1, 6), "Cash only").with_item(category, cash, dec!(8), ""),
        ];
        let kept = expenses_in_window(&budget, &txns, date(2025, 2, 1)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].items.len(), 1);
        assert_eq!(kept[0].total(), dec!(30));
    }

    #[test]
    fn open_ended_budget_starting_after_today_keeps_nothing() {
        let budget = Budget::new("Next month", Uuid::new_v4(), date(2025, 2, 1));
        let txns = vec![Transaction::expense(date(2025, 1, 10), "Early").with_item(
            Uuid::new_v4(),
            Uuid::new_v4(),
            dec!(5),
            "",
        )];
        let kept = expenses_in_window(&budget, &txns, date(2025, 1, 15)).unwrap();
        assert!(kept.is_empty());
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let budget = Budget::new("Backwards", Uuid::new_v4(), date(2025, 2, 1))
            .with_end_date(date(2025, 1, 1));
        let err = expenses_in_window(&budget, &[], date(2025, 3, 1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn paused_budget_ignores_spend_after_the_pause() {
        let mut budget = Budget::new("Paused", Uuid::new_v4(), date(2025, 1, 1))
            .with_end_date(date(2025, 1, 31));
        budget.status = ledger_domain::BudgetStatus::Paused;
        budget.tracking_stopped_on = Some(date(2025, 1, 10));
        let category = Uuid::new_v4();
        let account = Uuid::new_v4();
        let txns = vec![
            Transaction::expense(date(2025, 1, 10), "Before").with_item(category, account, dec!(10), ""),
            Transaction::expense(date(2025, 1, 11), "After").with_item(category, account, dec!(70), ""),
        ];
        let kept = expenses_in_window(&budget, &txns, date(2025, 2, 1)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].title, "Before");
    }
}
