use std::time::Duration;

use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::errors::StoreError;
use crate::net_worth::{compute_snapshot, month_of, NetWorthStore};
use crate::scheduler::{JobResult, PeriodicJob, PeriodicJobPolicy, RepeatInterval, SchedulerSettings};

pub const NET_WORTH_SNAPSHOT_JOB: &str = "net_worth_snapshot_worker";

/// Monthly job recording one net-worth snapshot per calendar month.
pub struct NetWorthSnapshotJob<'a, S: NetWorthStore> {
    store: &'a S,
    policy: PeriodicJobPolicy,
}

impl<'a, S: NetWorthStore> NetWorthSnapshotJob<'a, S> {
    pub fn new(store: &'a S, settings: &SchedulerSettings) -> Self {
        NetWorthSnapshotJob {
            store,
            policy: PeriodicJobPolicy::new(
                RepeatInterval::Months(1),
                Duration::from_secs(24 * 60 * 60),
                settings,
            ),
        }
    }

    /// Returns true when a new snapshot was written.
    fn take_snapshot(&self, now: &NaiveDateTime) -> Result<bool, StoreError> {
        let month = month_of(&now.date()).map_err(StoreError::Rejected)?;
        if self.store.snapshot_for_month(&month)?.is_some() {
            return Ok(false);
        }

        let balances = self.store.account_balances()?;
        let snapshot = compute_snapshot(&balances, now).map_err(StoreError::Rejected)?;
        info!(%month, net_worth = %snapshot.net_worth, "Saving net worth snapshot");
        self.store.save_snapshot(snapshot)?;
        Ok(true)
    }
}

impl<'a, S: NetWorthStore> PeriodicJob for NetWorthSnapshotJob<'a, S> {
    fn name(&self) -> &'static str {
        NET_WORTH_SNAPSHOT_JOB
    }

    fn policy(&self) -> &PeriodicJobPolicy {
        &self.policy
    }

    fn run(&self, now: &NaiveDateTime, run_attempt: u32) -> JobResult {
        match self.take_snapshot(now) {
            Ok(written) => {
                if !written {
                    info!("Net worth snapshot already taken this month");
                }
                JobResult::Success
            }
            Err(store_error) => {
                error!(error = %store_error, attempt = run_attempt, "Could not take net worth snapshot");
                if run_attempt < self.policy.max_attempts {
                    JobResult::Retry
                } else {
                    JobResult::Failure
                }
            }
        }
    }
}
