use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::StoreError;
use crate::scheduler::{EnqueueResult, JobScheduler, JobStatus, PeriodicJobPolicy, RepeatInterval};
use crate::vault::VaultImpl;

/// A periodic job registered in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRegistration {
    pub name: String,
    pub repeat_interval: RepeatInterval,
    #[serde(default)]
    pub flex_seconds: u64,
    pub next_run: NaiveDateTime,
    #[serde(default)]
    pub running: bool,
}

impl JobRegistration {
    /// The job may start anywhere inside the flex window ending at `next_run`.
    /// A flex window reaching past chrono's range opens at the earliest date.
    pub fn is_due(&self, now: &NaiveDateTime) -> bool {
        let window_start = i64::try_from(self.flex_seconds)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|flex| self.next_run.checked_sub_signed(flex))
            .unwrap_or(NaiveDateTime::MIN);
        !self.running && window_start <= *now
    }

    /// First run of the series strictly after `now`.
    fn following_run(&self, now: &NaiveDateTime) -> Result<NaiveDateTime, String> {
        let mut next_run = self.repeat_interval.next_after(&self.next_run)?;
        while next_run <= *now {
            next_run = self.repeat_interval.next_after(&next_run)?;
        }
        Ok(next_run)
    }
}

impl JobScheduler for VaultImpl {
    fn enqueue_unique(
        &self,
        name: &str,
        policy: &PeriodicJobPolicy,
        now: &NaiveDateTime,
    ) -> Result<EnqueueResult, StoreError> {
        self.update(|document| {
            if document.scheduled_jobs.iter().any(|job| job.name == name) {
                debug!(job = name, "Job already registered, keeping it");
                return Ok(EnqueueResult::KeptExisting);
            }

            document.scheduled_jobs.push(JobRegistration {
                name: name.to_string(),
                repeat_interval: policy.repeat_interval,
                flex_seconds: policy.flex_window.as_secs(),
                next_run: *now,
                running: false,
            });
            info!(job = name, next_run = %now, "Job registered");
            Ok(EnqueueResult::Enqueued)
        })
    }

    fn cancel(&self, name: &str) -> Result<(), StoreError> {
        self.update(|document| {
            document.scheduled_jobs.retain(|job| job.name != name);
            Ok(())
        })
    }

    fn query(&self, name: &str) -> Result<JobStatus, StoreError> {
        let document = self.load()?;
        Ok(match document.scheduled_jobs.iter().find(|job| job.name == name) {
            None => JobStatus::NotScheduled,
            Some(job) if job.running => JobStatus::Running,
            Some(job) => JobStatus::Enqueued { next_run: job.next_run },
        })
    }
}

impl VaultImpl {
    /// Marks every due job as running and returns their names. A job that is
    /// already running is not claimed again.
    pub fn claim_due_jobs(&self, now: &NaiveDateTime) -> Result<Vec<String>, StoreError> {
        self.update(|document| {
            Ok(document
                .scheduled_jobs
                .iter_mut()
                .filter(|job| job.is_due(now))
                .map(|job| {
                    job.running = true;
                    job.name.clone()
                })
                .collect())
        })
    }

    /// Releases a claimed job and moves its next run past `now`.
    pub fn complete_job(&self, name: &str, now: &NaiveDateTime) -> Result<NaiveDateTime, StoreError> {
        self.update(|document| {
            let job = document
                .scheduled_jobs
                .iter_mut()
                .find(|job| job.name == name)
                .ok_or(StoreError::Rejected(format!("job {} is not registered", name)))?;

            job.next_run = job.following_run(now).map_err(StoreError::Rejected)?;
            job.running = false;
            debug!(job = name, next_run = %job.next_run, "Job rescheduled");
            Ok(job.next_run)
        })
    }

    /// Clears the running mark without touching `next_run`, so the job is
    /// claimed again by the next tick.
    pub fn release_job(&self, name: &str) -> Result<(), StoreError> {
        self.update(|document| {
            if let Some(job) = document.scheduled_jobs.iter_mut().find(|job| job.name == name) {
                job.running = false;
            }
            Ok(())
        })
    }
}
