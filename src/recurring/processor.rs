use chrono::NaiveDateTime;
use tracing::{debug, error, info, warn};

use crate::errors::StoreError;
use crate::recurring::{RecurringTransactionDefinition, RecurringTransactionStore, SkipReason};
use crate::scheduler::JobResult;

/// What happened to one due definition during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    Realized {
        id: u64,
        date: NaiveDateTime,
        next_due: NaiveDateTime,
    },
    Skipped {
        id: u64,
        reason: SkipReason,
    },
    Failed {
        id: u64,
        error: String,
    },
}

impl ItemOutcome {
    pub fn id(&self) -> u64 {
        match self {
            ItemOutcome::Realized { id, .. } => *id,
            ItemOutcome::Skipped { id, .. } => *id,
            ItemOutcome::Failed { id, .. } => *id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingReport {
    pub now: NaiveDateTime,
    pub outcomes: Vec<ItemOutcome>,
    /// Set when the due definitions could not be fetched at all.
    pub store_error: Option<StoreError>,
    /// Definitions realized although their end date is past.
    pub ended_but_realized: Vec<u64>,
}

impl ProcessingReport {
    pub fn successes(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Realized { .. }))
            .count()
    }

    pub fn skips(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Skipped { .. }))
            .count()
    }

    pub fn failures(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome, ItemOutcome::Failed { .. }))
            .count()
    }

    pub fn has_failures(&self) -> bool {
        self.store_error.is_some() || self.failures() > 0
    }

    /// The whole pass is retried while `run_attempt` is below the ceiling.
    /// Items that succeeded are past due by then, so a retry only sees the
    /// ones that failed or were skipped.
    pub fn verdict(&self, run_attempt: u32, max_attempts: u32) -> JobResult {
        if !self.has_failures() {
            JobResult::Success
        } else if run_attempt < max_attempts {
            JobResult::Retry
        } else {
            JobResult::Failure
        }
    }
}

pub struct RecurringTransactionProcessor<'a, S: RecurringTransactionStore> {
    store: &'a S,
}

impl<'a, S: RecurringTransactionStore> RecurringTransactionProcessor<'a, S> {
    pub fn new(store: &'a S) -> Self {
        RecurringTransactionProcessor { store }
    }

    pub fn process_due_pass(&self, now: &NaiveDateTime) -> ProcessingReport {
        let mut report = ProcessingReport {
            now: *now,
            outcomes: vec![],
            store_error: None,
            ended_but_realized: vec![],
        };

        let due = match self.store.due_recurring(now) {
            Ok(due) => due,
            Err(store_error) => {
                error!(error = %store_error, "Could not fetch due recurring transactions");
                report.store_error = Some(store_error);
                return report;
            }
        };
        debug!(count = due.len(), %now, "Processing due recurring transactions");

        for definition in due.iter() {
            let outcome = self.process_one(definition);
            if matches!(outcome, ItemOutcome::Realized { .. }) && definition.has_ended() {
                report.ended_but_realized.push(definition.id);
            }
            report.outcomes.push(outcome);
        }

        info!(
            successes = report.successes(),
            skips = report.skips(),
            failures = report.failures(),
            "Recurring transaction pass complete"
        );
        report
    }

    fn process_one(&self, definition: &RecurringTransactionDefinition) -> ItemOutcome {
        let realized = match definition.realize() {
            Ok(realized) => realized,
            Err(reason) => {
                warn!(definition_id = definition.id, %reason, "Skipping recurring transaction");
                return ItemOutcome::Skipped { id: definition.id, reason };
            }
        };

        if definition.has_ended() {
            warn!(
                definition_id = definition.id,
                end = ?definition.end,
                "Realizing a recurring transaction past its end date"
            );
        }

        let next_due = match definition.following_due() {
            Ok(next_due) => next_due,
            Err(error) => {
                error!(definition_id = definition.id, %error, "Could not compute next due date");
                return ItemOutcome::Failed { id: definition.id, error };
            }
        };

        let date = realized.date;
        match self.store.process_due_recurring(definition, realized) {
            Ok(()) => ItemOutcome::Realized { id: definition.id, date, next_due },
            Err(store_error) => {
                error!(definition_id = definition.id, error = %store_error, "Could not realize recurring transaction");
                ItemOutcome::Failed { id: definition.id, error: store_error.to_string() }
            }
        }
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod process_due_pass_tests {
    use mockall::predicate::eq;

    use super::{ItemOutcome, ProcessingReport, RecurringTransactionProcessor};
    use crate::errors::StoreError;
    use crate::recurring::fixtures::{day, monthly_rent};
    use crate::recurring::{MockRecurringTransactionStore, SkipReason};
    use crate::scheduler::JobResult;

    fn store_with_due(
        due: Vec<crate::recurring::RecurringTransactionDefinition>,
    ) -> MockRecurringTransactionStore {
        let mut store = MockRecurringTransactionStore::new();
        store
            .expect_due_recurring()
            .with(eq(day(2024, 1, 20)))
            .times(1)
            .return_const(Ok(due));
        store
    }

    fn pass(store: &MockRecurringTransactionStore) -> ProcessingReport {
        RecurringTransactionProcessor::new(store).process_due_pass(&day(2024, 1, 20))
    }

    #[test]
    fn monthly__realized_at_due_date__next_due_one_month_later() {
        let mut store = store_with_due(vec![monthly_rent(1, day(2024, 1, 15))]);
        store
            .expect_process_due_recurring()
            .withf(|definition, realized| {
                definition.id == 1 && realized.date == day(2024, 1, 15) && realized.recurring_id == Some(1)
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let report = pass(&store);

        assert_eq!(
            report.outcomes,
            vec![ItemOutcome::Realized {
                id: 1,
                date: day(2024, 1, 15),
                next_due: day(2024, 2, 15),
            }]
        );
        assert_eq!(report.verdict(0, 3), JobResult::Success);
    }

    #[test]
    fn missing_account__skipped_without_touching_store() {
        let mut definition = monthly_rent(1, day(2024, 1, 15));
        definition.account_id = None;
        let mut store = store_with_due(vec![definition]);
        store.expect_process_due_recurring().times(0);

        let report = pass(&store);

        assert_eq!(
            report.outcomes,
            vec![ItemOutcome::Skipped { id: 1, reason: SkipReason::MissingAccount }]
        );
        assert_eq!(report.skips(), 1);
        assert_eq!(report.failures(), 0);
        assert_eq!(report.verdict(0, 3), JobResult::Success);
    }

    #[test]
    fn blank_user__skipped_without_touching_store() {
        let mut definition = monthly_rent(1, day(2024, 1, 15));
        definition.user_id = String::new();
        let mut store = store_with_due(vec![definition]);
        store.expect_process_due_recurring().times(0);

        assert_eq!(pass(&store).skips(), 1);
    }

    #[test]
    fn second_of_three_fails__third_still_attempted__retry_requested() {
        let mut store = store_with_due(vec![
            monthly_rent(1, day(2024, 1, 15)),
            monthly_rent(2, day(2024, 1, 16)),
            monthly_rent(3, day(2024, 1, 17)),
        ]);
        store
            .expect_process_due_recurring()
            .withf(|definition, _| definition.id == 1)
            .times(1)
            .returning(|_, _| Ok(()));
        store
            .expect_process_due_recurring()
            .withf(|definition, _| definition.id == 2)
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("disk full".to_string())));
        store
            .expect_process_due_recurring()
            .withf(|definition, _| definition.id == 3)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = pass(&store);

        assert_eq!(report.successes(), 2);
        assert_eq!(report.failures(), 1);
        assert_eq!(
            report.outcomes[1],
            ItemOutcome::Failed { id: 2, error: "Store unavailable: disk full".to_string() }
        );
        assert_eq!(report.verdict(0, 3), JobResult::Retry);
        assert_eq!(report.verdict(2, 3), JobResult::Retry);
        assert_eq!(report.verdict(3, 3), JobResult::Failure);
    }

    #[test]
    fn store_unreachable__pass_level_failure() {
        let mut store = MockRecurringTransactionStore::new();
        store
            .expect_due_recurring()
            .returning(|_| Err(StoreError::Unavailable("no vault".to_string())));
        store.expect_process_due_recurring().times(0);

        let report = pass(&store);

        assert!(report.outcomes.is_empty());
        assert!(report.has_failures());
        assert_eq!(report.verdict(1, 3), JobResult::Retry);
        assert_eq!(report.verdict(3, 3), JobResult::Failure);
    }

    #[test]
    fn nothing_due__success() {
        let mut store = store_with_due(vec![]);
        store.expect_process_due_recurring().times(0);

        let report = pass(&store);

        assert_eq!(report.successes(), 0);
        assert_eq!(report.verdict(0, 3), JobResult::Success);
    }

    #[test]
    fn past_end_date__still_realized_but_flagged() {
        let mut definition = monthly_rent(1, day(2024, 1, 15));
        definition.end = Some(day(2023, 12, 31));
        let mut store = store_with_due(vec![definition]);
        store.expect_process_due_recurring().times(1).returning(|_, _| Ok(()));

        let report = pass(&store);

        assert_eq!(report.successes(), 1);
        assert_eq!(report.ended_but_realized, vec![1]);
    }

    #[test]
    fn skip_and_success__mixed_counts() {
        let mut skipped = monthly_rent(2, day(2024, 1, 15));
        skipped.account_id = None;
        let mut store = store_with_due(vec![monthly_rent(1, day(2024, 1, 10)), skipped]);
        store
            .expect_process_due_recurring()
            .withf(|definition, _| definition.id == 1)
            .times(1)
            .returning(|_, _| Ok(()));

        let report = pass(&store);

        assert_eq!(
            report.outcomes.iter().map(ItemOutcome::id).collect::<Vec<u64>>(),
            vec![1, 2]
        );
        assert_eq!((report.successes(), report.skips(), report.failures()), (1, 1, 0));
    }
}
