mod policy;

use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
#[cfg(test)]
use mockall::automock;
use tracing::{info, warn};

use crate::clock::Clock;
use crate::errors::StoreError;

pub use policy::{PeriodicJobPolicy, RepeatInterval, SchedulerSettings};

/// What a job run asks the scheduler to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobResult {
    Success,
    /// Run the job again after the backoff delay.
    Retry,
    /// Give up until the next scheduled trigger.
    Failure,
}

impl Display for JobResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JobResult::Success => write!(f, "success"),
            JobResult::Retry => write!(f, "retry"),
            JobResult::Failure => write!(f, "failure"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    NotScheduled,
    Enqueued { next_run: NaiveDateTime },
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnqueueResult {
    Enqueued,
    /// A job with that name was already registered and was left alone.
    KeptExisting,
}

/// Registry of uniquely named periodic jobs.
#[cfg_attr(test, automock)]
pub trait JobScheduler {
    fn enqueue_unique(
        &self,
        name: &str,
        policy: &PeriodicJobPolicy,
        now: &NaiveDateTime,
    ) -> Result<EnqueueResult, StoreError>;
    fn cancel(&self, name: &str) -> Result<(), StoreError>;
    fn query(&self, name: &str) -> Result<JobStatus, StoreError>;
}

pub trait PeriodicJob {
    fn name(&self) -> &'static str;
    fn policy(&self) -> &PeriodicJobPolicy;

    /// `run_attempt` counts the earlier attempts of the current trigger.
    fn run(&self, now: &NaiveDateTime, run_attempt: u32) -> JobResult;

    fn schedule<S: JobScheduler>(
        &self,
        scheduler: &S,
        now: &NaiveDateTime,
    ) -> Result<EnqueueResult, StoreError>
    where
        Self: Sized,
    {
        scheduler.enqueue_unique(self.name(), self.policy(), now)
    }

    fn cancel<S: JobScheduler>(&self, scheduler: &S) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        scheduler.cancel(self.name())
    }

    fn is_scheduled<S: JobScheduler>(&self, scheduler: &S) -> Result<bool, StoreError>
    where
        Self: Sized,
    {
        Ok(scheduler.query(self.name())? != JobStatus::NotScheduled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOutcome {
    pub result: JobResult,
    pub attempts: u32,
}

/// Runs one trigger of `job`, sleeping the backoff delay between attempts
/// that ask to be retried. The attempt counter starts at 0 for every trigger.
pub fn run_with_retries<J, C>(job: &J, clock: &C) -> RetryOutcome
where
    J: PeriodicJob + ?Sized,
    C: Clock + ?Sized,
{
    let policy = job.policy();
    let mut run_attempt = 0;

    loop {
        let result = job.run(&clock.now(), run_attempt);
        if result != JobResult::Retry {
            info!(job = job.name(), attempts = run_attempt + 1, result = %result, "Job finished");
            return RetryOutcome { result, attempts: run_attempt + 1 };
        }

        if run_attempt >= policy.max_attempts {
            warn!(job = job.name(), attempts = run_attempt + 1, "Job kept asking for retries, giving up");
            return RetryOutcome { result: JobResult::Failure, attempts: run_attempt + 1 };
        }

        let delay = policy.backoff.delay_for(run_attempt);
        info!(job = job.name(), attempt = run_attempt, delay_seconds = delay.as_secs(), "Retrying job");
        clock.sleep(delay);
        run_attempt += 1;
    }
}
