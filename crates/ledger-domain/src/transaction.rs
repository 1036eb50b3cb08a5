//! Domain models for ledger transactions and their category/account line items.

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::Identifiable;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Expense,
    Income,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TransactionType::Expense => "EXPENSE",
            TransactionType::Income => "INCOME",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub date: NaiveDate,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub items: Vec<TransactionItem>,
}

impl Transaction {
    pub fn new(transaction_type: TransactionType, date: NaiveDate, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            transaction_type,
            date,
            title: title.into(),
            notes: None,
            items: Vec::new(),
        }
    }

    pub fn expense(date: NaiveDate, title: impl Into<String>) -> Self {
        Self::new(TransactionType::Expense, date, title)
    }

    pub fn income(date: NaiveDate, title: impl Into<String>) -> Self {
        Self::new(TransactionType::Income, date, title)
    }

    /// Appends an item, stamping it with this transaction's id.
    pub fn with_item(
        mut self,
        category_id: Uuid,
        account_id: Uuid,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        self.items.push(TransactionItem {
            id: Uuid::new_v4(),
            transaction_id: self.id,
            category_id,
            account_id,
            amount,
            description: description.into(),
        });
        self
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn total(&self) -> Decimal {
        self.items.iter().map(|item| item.amount).sum()
    }
}

impl Identifiable for Transaction {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// One category/account line of a transaction. `amount` is positive; its sign comes
/// from the parent's [`TransactionType`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionItem {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub category_id: Uuid,
    pub account_id: Uuid,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
}
