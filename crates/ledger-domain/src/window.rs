use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Inclusive date range a budget is tracking expenses over.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BudgetWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl BudgetWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, BudgetWindowError> {
        if end < start {
            return Err(BudgetWindowError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Errors that can occur when constructing [`BudgetWindow`] values.
pub enum BudgetWindowError {
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
}

impl fmt::Display for BudgetWindowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetWindowError::EndBeforeStart { start, end } => {
                write!(f, "budget window end {end} is before start {start}")
            }
        }
    }
}

impl std::error::Error for BudgetWindowError {}
