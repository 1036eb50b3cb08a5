//! Budget lifecycle states and the actions that move between them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a budget.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    /// Tracking expenses and eligible for renewal.
    #[default]
    Active,
    /// Expense tracking stopped; the budget itself is still on.
    Paused,
    /// Auto-renewal disabled; tracking continues.
    Suspended,
    /// Terminal, read-only. Only [`BudgetAction::RestoreBudget`] leaves it.
    Archived,
}

/// Named lifecycle operations a user or administrator can request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAction {
    PauseTracking,
    ResumeTracking,
    SuspendRenewal,
    ResumeBudget,
    ArchiveBudget,
    RestoreBudget,
}

impl BudgetAction {
    pub const ALL: [BudgetAction; 6] = [
        BudgetAction::PauseTracking,
        BudgetAction::ResumeTracking,
        BudgetAction::SuspendRenewal,
        BudgetAction::ResumeBudget,
        BudgetAction::ArchiveBudget,
        BudgetAction::RestoreBudget,
    ];

    pub fn label(self) -> &'static str {
        match self {
            BudgetAction::PauseTracking => "Pause Expense Tracking",
            BudgetAction::ResumeTracking => "Resume Expense Tracking",
            BudgetAction::SuspendRenewal => "Suspend Renewal",
            BudgetAction::ResumeBudget => "Reactivate Budget",
            BudgetAction::ArchiveBudget => "Archive Budget",
            BudgetAction::RestoreBudget => "Restore Budget",
        }
    }
}

impl fmt::Display for BudgetAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl BudgetStatus {
    pub const ALL: [BudgetStatus; 4] = [
        BudgetStatus::Active,
        BudgetStatus::Paused,
        BudgetStatus::Suspended,
        BudgetStatus::Archived,
    ];

    /// The transition table. Returns the resulting state, or `None` when `action`
    /// is not permitted from `self`.
    pub fn after(self, action: BudgetAction) -> Option<BudgetStatus> {
        use BudgetAction::*;
        use BudgetStatus::*;

        match (self, action) {
            (Active, SuspendRenewal) => Some(Suspended),
            (Active | Suspended, PauseTracking) => Some(Paused),
            (Active | Suspended | Paused, ArchiveBudget) => Some(Archived),
            (Suspended | Paused, ResumeBudget) => Some(Active),
            (Paused, ResumeTracking) => Some(Active),
            (Archived, RestoreBudget) => Some(Active),
            _ => None,
        }
    }

    /// Actions that are legal from this state, in declaration order.
    pub fn available_actions(self) -> Vec<BudgetAction> {
        BudgetAction::ALL
            .into_iter()
            .filter(|action| self.after(*action).is_some())
            .collect()
    }

    /// Whether new expenses should be counted against the budget.
    pub fn is_tracking(self) -> bool {
        matches!(self, BudgetStatus::Active | BudgetStatus::Suspended)
    }

    /// Whether the budget may be renewed into a new period.
    pub fn renews(self) -> bool {
        matches!(self, BudgetStatus::Active | BudgetStatus::Suspended)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, BudgetStatus::Archived)
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BudgetStatus::Active => "active",
            BudgetStatus::Paused => "paused",
            BudgetStatus::Suspended => "suspended",
            BudgetStatus::Archived => "archived",
        };
        f.write_str(label)
    }
}
