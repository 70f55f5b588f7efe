use std::time::Duration;

use chrono::{Days, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::vault::VaultReadable;

/// Backoff delays never go below this, whatever the settings say.
pub const MIN_BACKOFF_FLOOR: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "every")]
pub enum RepeatInterval {
    #[serde(rename = "days")]
    Days(u32),
    #[serde(rename = "months")]
    Months(u32),
}

impl RepeatInterval {
    pub fn next_after(&self, from: &NaiveDateTime) -> Result<NaiveDateTime, String> {
        match self {
            RepeatInterval::Days(days) => from.checked_add_days(Days::new(*days as u64)),
            RepeatInterval::Months(months) => from.checked_add_months(Months::new(*months)),
        }
        .ok_or(format!("Could not compute the run following {}", from))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JobConstraints {
    pub battery_not_low: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackoffPolicy {
    Exponential {
        min_backoff: Duration,
        max_backoff: Duration,
    },
}

impl BackoffPolicy {
    /// Delay to wait after the attempt numbered `run_attempt` (0 based)
    /// asked to be retried.
    pub fn delay_for(&self, run_attempt: u32) -> Duration {
        match self {
            BackoffPolicy::Exponential { min_backoff, max_backoff } => {
                let base = (*min_backoff).max(MIN_BACKOFF_FLOOR);
                let cap = (*max_backoff).max(base);
                2u32.checked_pow(run_attempt)
                    .and_then(|factor| base.checked_mul(factor))
                    .map_or(cap, |delay| delay.min(cap))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicJobPolicy {
    pub repeat_interval: RepeatInterval,
    pub flex_window: Duration,
    pub constraints: JobConstraints,
    pub backoff: BackoffPolicy,
    pub max_attempts: u32,
}

impl PeriodicJobPolicy {
    pub fn new(repeat_interval: RepeatInterval, flex_window: Duration, settings: &SchedulerSettings) -> Self {
        PeriodicJobPolicy {
            repeat_interval,
            flex_window,
            constraints: JobConstraints { battery_not_low: true },
            backoff: BackoffPolicy::Exponential {
                min_backoff: Duration::from_secs(settings.min_backoff_seconds),
                max_backoff: Duration::from_secs(settings.max_backoff_seconds),
            },
            max_attempts: settings.max_attempts,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerSettings {
    pub max_attempts: u32,
    pub min_backoff_seconds: u64,
    pub max_backoff_seconds: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        SchedulerSettings {
            max_attempts: 3,
            min_backoff_seconds: 30,
            max_backoff_seconds: 5 * 60 * 60,
        }
    }
}

impl VaultReadable for SchedulerSettings {
    const KEY: &'static str = "scheduler_settings";
}
