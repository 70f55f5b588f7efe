use std::env::current_dir;

use chrono::NaiveDate;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use argument_parsing::{CadenceOptions, Command};
use formatting::TickedJob;

use crate::budget::{budgets_as_of, compute_summary, BudgetsVaultValues};
use crate::clock::{Clock, PinnedClock, SystemClock};
use crate::net_worth::{month_of, NetWorthSnapshotJob, NetWorthStore, NET_WORTH_SNAPSHOT_JOB};
use crate::recurring::{RecurringTransactionJob, TransactionsVaultValues, RECURRING_TRANSACTION_JOB};
use crate::scheduler::{
    run_with_retries, EnqueueResult, JobResult, JobScheduler, JobStatus, PeriodicJob, RetryOutcome,
    SchedulerSettings,
};
use crate::vault::{read_or_default, VaultImpl};

mod argument_parsing;
mod formatting;

pub const LOG_ENV: &str = "CADENCE_LOG";

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // A subscriber may already be installed; keep it.
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}

fn clock_for(now: Option<chrono::NaiveDateTime>) -> Box<dyn Clock> {
    match now {
        Some(now) => Box::new(PinnedClock { now }),
        None => Box::new(SystemClock),
    }
}

/// A manual run must not overlap a tick that claimed the same job.
fn refuse_if_running<J: PeriodicJob>(job: &J, vault: &VaultImpl) -> Result<(), String> {
    match vault.query(job.name()).map_err(|e| e.to_string())? {
        JobStatus::Running => Err(format!("{} is running, try again once it is done", job.name())),
        _ => Ok(()),
    }
}

pub fn process(vault: &VaultImpl, clock: &dyn Clock) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    let job = RecurringTransactionJob::new(vault, &settings);
    refuse_if_running(&job, vault)?;
    let outcome = run_with_retries(&job, clock);
    Ok(formatting::format_process_screen(&job.take_reports(), &outcome))
}

pub fn budgets(vault: &VaultImpl, date: &NaiveDate) -> Result<String, String> {
    let budgets: BudgetsVaultValues = read_or_default(vault).map_err(|e| e.to_string())?;
    let transactions: TransactionsVaultValues = read_or_default(vault).map_err(|e| e.to_string())?;

    let listed = budgets_as_of(&budgets, &transactions, date)?;
    let summary = compute_summary(&listed);
    Ok(formatting::format_budgets_screen(date, &listed, &summary))
}

pub fn snapshot(vault: &VaultImpl, clock: &dyn Clock) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    let job = NetWorthSnapshotJob::new(vault, &settings);
    refuse_if_running(&job, vault)?;
    let outcome = run_with_retries(&job, clock);

    let month = month_of(&clock.now().date())?;
    let taken = vault.snapshot_for_month(&month).map_err(|e| e.to_string())?;
    Ok(formatting::format_snapshot_screen(&outcome, taken.as_ref()))
}

pub fn schedule(vault: &VaultImpl, clock: &dyn Clock) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    let now = clock.now();

    let describe = |result: EnqueueResult| match result {
        EnqueueResult::Enqueued => "Scheduled".to_string(),
        EnqueueResult::KeptExisting => "Already scheduled".to_string(),
    };
    let recurring = RecurringTransactionJob::new(vault, &settings)
        .schedule(vault, &now)
        .map_err(|e| e.to_string())?;
    let net_worth = NetWorthSnapshotJob::new(vault, &settings)
        .schedule(vault, &now)
        .map_err(|e| e.to_string())?;

    Ok(formatting::format_jobs_screen(
        "Scheduled jobs",
        &[
            (RECURRING_TRANSACTION_JOB, describe(recurring)),
            (NET_WORTH_SNAPSHOT_JOB, describe(net_worth)),
        ],
    ))
}

pub fn cancel(vault: &VaultImpl) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    RecurringTransactionJob::new(vault, &settings)
        .cancel(vault)
        .map_err(|e| e.to_string())?;
    NetWorthSnapshotJob::new(vault, &settings)
        .cancel(vault)
        .map_err(|e| e.to_string())?;

    Ok(formatting::format_jobs_screen(
        "Cancelled jobs",
        &[
            (RECURRING_TRANSACTION_JOB, "Cancelled".to_string()),
            (NET_WORTH_SNAPSHOT_JOB, "Cancelled".to_string()),
        ],
    ))
}

fn job_state<J: PeriodicJob>(job: &J, vault: &VaultImpl) -> Result<(&'static str, String), String> {
    if !job.is_scheduled(vault).map_err(|e| e.to_string())? {
        return Ok((job.name(), "Not scheduled".to_string()));
    }
    let status = vault.query(job.name()).map_err(|e| e.to_string())?;
    Ok((job.name(), formatting::describe_status(&status)))
}

pub fn status(vault: &VaultImpl) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    let jobs = vec![
        job_state(&RecurringTransactionJob::new(vault, &settings), vault)?,
        job_state(&NetWorthSnapshotJob::new(vault, &settings), vault)?,
    ];
    Ok(formatting::format_jobs_screen("Periodic jobs", &jobs))
}

fn run_registered(vault: &VaultImpl, name: &str, settings: &SchedulerSettings, clock: &dyn Clock) -> RetryOutcome {
    match name {
        RECURRING_TRANSACTION_JOB => run_with_retries(&RecurringTransactionJob::new(vault, settings), clock),
        NET_WORTH_SNAPSHOT_JOB => run_with_retries(&NetWorthSnapshotJob::new(vault, settings), clock),
        unknown => {
            warn!(job = unknown, "No job goes by this name, releasing it");
            RetryOutcome { result: JobResult::Failure, attempts: 0 }
        }
    }
}

/// Runs every claimed job, then releases it whatever its result. A job that
/// cannot be rescheduled is released at its current run.
pub fn tick(vault: &VaultImpl, clock: &dyn Clock) -> Result<String, String> {
    let settings = vault.settings().map_err(|e| e.to_string())?;
    let now = clock.now();
    let claimed = vault.claim_due_jobs(&now).map_err(|e| e.to_string())?;
    info!(%now, count = claimed.len(), "Running due jobs");

    let mut ticked = vec![];
    for name in claimed {
        let outcome = run_registered(vault, &name, &settings, clock);
        let next_run = vault.complete_job(&name, &now).map_err(|e| e.to_string());
        if let Err(reason) = &next_run {
            error!(job = name.as_str(), error = %reason, "Could not reschedule job, releasing it");
            if let Err(release_error) = vault.release_job(&name) {
                error!(job = name.as_str(), error = %release_error, "Could not release job");
            }
        }
        ticked.push(TickedJob { name, outcome, next_run });
    }

    Ok(formatting::format_tick_screen(&now, &ticked))
}

pub fn run() {
    let arguments = CadenceOptions::parse();
    init_logging(arguments.log_json);

    let result: Result<String, String> = (|| {
        let vault_path = match &arguments.vault {
            Some(a) => a.clone(),
            None => current_dir().map_err(|e| e.to_string())?,
        };
        let vault = VaultImpl { path: vault_path };

        match &arguments.command {
            Command::Process { now } => process(&vault, clock_for(*now).as_ref()),
            Command::Budgets { date } => {
                let date = date.unwrap_or_else(|| SystemClock.now().date());
                budgets(&vault, &date)
            }
            Command::Snapshot { now } => snapshot(&vault, clock_for(*now).as_ref()),
            Command::Schedule => schedule(&vault, &SystemClock),
            Command::Cancel => cancel(&vault),
            Command::Status => status(&vault),
            Command::Tick { now } => tick(&vault, clock_for(*now).as_ref()),
        }
    })();

    match result {
        Ok(screen) => println!("{}", screen),
        Err(error) => {
            eprintln!("Could not complete the command: {}", error);
            std::process::exit(1)
        }
    }
}
