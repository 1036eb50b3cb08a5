//! Enforces the budget status state machine.

use tracing::{info, warn};

use ledger_domain::{Budget, BudgetAction};

use crate::{time::Clock, CoreError, CoreResult};

/// Applies named lifecycle actions to budgets.
///
/// Every operation returns a new [`Budget`]; the input is left untouched so the
/// caller can persist the result atomically or discard it.
pub struct LifecycleService;

impl LifecycleService {
    /// Applies `action`, failing with [`CoreError::InvalidTransition`] when the
    /// transition table does not permit it from the budget's current status.
    pub fn transition(budget: &Budget, action: BudgetAction, clock: &dyn Clock) -> CoreResult<Budget> {
        let from = budget.status;
        let Some(to) = from.after(action) else {
            warn!(budget_id = %budget.id, status = %from, ?action, "rejected budget transition");
            return Err(CoreError::InvalidTransition { from, action });
        };

        let mut updated = budget.clone();
        updated.status = to;
        if to.is_tracking() {
            updated.tracking_stopped_on = None;
        } else if from.is_tracking() {
            updated.tracking_stopped_on = Some(clock.today());
        }
        updated.touch(clock.now());
        info!(budget_id = %budget.id, %from, %to, ?action, "budget status changed");
        Ok(updated)
    }

    /// `active | suspended -> paused`
    pub fn pause_tracking(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::PauseTracking, clock)
    }

    /// `paused -> active`
    pub fn resume_tracking(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::ResumeTracking, clock)
    }

    /// `active -> suspended`
    pub fn suspend_renewal(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::SuspendRenewal, clock)
    }

    /// `suspended | paused -> active`
    pub fn resume_budget(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::ResumeBudget, clock)
    }

    /// `active | suspended | paused -> archived`
    pub fn archive_budget(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::ArchiveBudget, clock)
    }

    /// `archived -> active`
    pub fn restore_budget(budget: &Budget, clock: &dyn Clock) -> CoreResult<Budget> {
        Self::transition(budget, BudgetAction::RestoreBudget, clock)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use ledger_domain::BudgetStatus;
    use uuid::Uuid;

    use super::*;
    use crate::time::FixedClock;

    fn budget_in(status: BudgetStatus) -> Budget {
        let mut budget = Budget::new(
            "Lifecycle",
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        );
        budget.status = status;
        budget
    }

    fn clock() -> FixedClock {
        FixedClock::on(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap())
    }

    /// The full legal table; everything else must be rejected.
    const LEGAL: [(BudgetStatus, BudgetAction, BudgetStatus); 10] = [
        (BudgetStatus::Active, BudgetAction::SuspendRenewal, BudgetStatus::Suspended),
        (BudgetStatus::Active, BudgetAction::PauseTracking, BudgetStatus::Paused),
        (BudgetStatus::Suspended, BudgetAction::PauseTracking, BudgetStatus::Paused),
        (BudgetStatus::Active, BudgetAction::ArchiveBudget, BudgetStatus::Archived),
        (BudgetStatus::Suspended, BudgetAction::ArchiveBudget, BudgetStatus::Archived),
        (BudgetStatus::Paused, BudgetAction::ArchiveBudget, BudgetStatus::Archived),
        (BudgetStatus::Suspended, BudgetAction::ResumeBudget, BudgetStatus::Active),
        (BudgetStatus::Paused, BudgetAction::ResumeBudget, BudgetStatus::Active),
        (BudgetStatus::Paused, BudgetAction::ResumeTracking, BudgetStatus::Active),
        (BudgetStatus::Archived, BudgetAction::RestoreBudget, BudgetStatus::Active),
    ];

    #[test]
    fn every_state_action_pair_matches_the_table() {
        let clock = clock();
        for from in BudgetStatus::ALL {
            for action in BudgetAction::ALL {
                let expected = LEGAL
                    .iter()
                    .find(|(state, act, _)| *state == from && *act == action)
                    .map(|(_, _, to)| *to);
                let result = LifecycleService::transition(&budget_in(from), action, &clock);
                match (expected, result) {
                    (Some(to), Ok(budget)) => assert_eq!(budget.status, to, "{from} + {action:?}"),
                    (None, Err(CoreError::InvalidTransition { from: f, action: a })) => {
                        assert_eq!((f, a), (from, action));
                    }
                    (expected, other) => {
                        panic!("{from} + {action:?}: expected {expected:?}, got {other:?}")
                    }
                }
            }
        }
    }

    #[test]
    fn transition_does_not_mutate_input_and_stamps_update_time() {
        let clock = clock();
        let original = budget_in(BudgetStatus::Active);
        let paused = LifecycleService::pause_tracking(&original, &clock).unwrap();
        assert_eq!(original.status, BudgetStatus::Active);
        assert_eq!(paused.status, BudgetStatus::Paused);
        assert_eq!(paused.updated_at, clock.now());
        assert_eq!(paused.id, original.id);
        assert_eq!(paused.version, original.version);
    }

    #[test]
    fn named_actions_walk_a_full_lifecycle() {
        let clock = clock();
        let budget = budget_in(BudgetStatus::Active);
        let budget = LifecycleService::suspend_renewal(&budget, &clock).unwrap();
        let budget = LifecycleService::pause_tracking(&budget, &clock).unwrap();
        let budget = LifecycleService::resume_tracking(&budget, &clock).unwrap();
        let budget = LifecycleService::archive_budget(&budget, &clock).unwrap();
        assert!(LifecycleService::resume_budget(&budget, &clock).is_err());
        let budget = LifecycleService::restore_budget(&budget, &clock).unwrap();
        assert_eq!(budget.status, BudgetStatus::Active);
    }

    #[test]
    fn stopping_and_restarting_tracking_stamps_the_stop_day() {
        let clock = clock();
        let active = budget_in(BudgetStatus::Active);
        let paused = LifecycleService::pause_tracking(&active, &clock).unwrap();
        assert_eq!(paused.tracking_stopped_on, Some(clock.today()));

        let later = FixedClock::on(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        let archived = LifecycleService::archive_budget(&paused, &later).unwrap();
        assert_eq!(archived.tracking_stopped_on, Some(clock.today()));

        let restored = LifecycleService::restore_budget(&archived, &later).unwrap();
        assert_eq!(restored.tracking_stopped_on, None);
    }

    #[test]
    fn invalid_transition_message_names_state_and_action() {
        let err = LifecycleService::resume_tracking(&budget_in(BudgetStatus::Suspended), &clock())
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("suspended"), "unexpected error: {message}");
        assert!(message.contains("Resume Expense Tracking"), "unexpected error: {message}");
    }
}
