use std::cell::RefCell;
use std::time::Duration;

use chrono::NaiveDateTime;

use crate::recurring::{ProcessingReport, RecurringTransactionProcessor, RecurringTransactionStore};
use crate::scheduler::{JobResult, PeriodicJob, PeriodicJobPolicy, RepeatInterval, SchedulerSettings};

pub const RECURRING_TRANSACTION_JOB: &str = "recurring_transaction_worker";

/// Daily job realizing every due recurring transaction.
pub struct RecurringTransactionJob<'a, S: RecurringTransactionStore> {
    processor: RecurringTransactionProcessor<'a, S>,
    policy: PeriodicJobPolicy,
    reports: RefCell<Vec<ProcessingReport>>,
}

impl<'a, S: RecurringTransactionStore> RecurringTransactionJob<'a, S> {
    pub fn new(store: &'a S, settings: &SchedulerSettings) -> Self {
        RecurringTransactionJob {
            processor: RecurringTransactionProcessor::new(store),
            policy: PeriodicJobPolicy::new(
                RepeatInterval::Days(1),
                Duration::from_secs(60 * 60),
                settings,
            ),
            reports: RefCell::new(vec![]),
        }
    }

    /// Reports of every attempt run so far, oldest first.
    pub fn take_reports(&self) -> Vec<ProcessingReport> {
        self.reports.take()
    }
}

impl<'a, S: RecurringTransactionStore> PeriodicJob for RecurringTransactionJob<'a, S> {
    fn name(&self) -> &'static str {
        RECURRING_TRANSACTION_JOB
    }

    fn policy(&self) -> &PeriodicJobPolicy {
        &self.policy
    }

    fn run(&self, now: &NaiveDateTime, run_attempt: u32) -> JobResult {
        let report = self.processor.process_due_pass(now);
        let result = report.verdict(run_attempt, self.policy.max_attempts);
        self.reports.borrow_mut().push(report);
        result
    }
}
