use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"];

pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Could not decode date {}: Format is YYYY-MM-DD, eg. 2024-01-31", s))
}

/// Accepts a full timestamp or a bare date, which stands for its midnight.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let datetime = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| parse_date(s).ok().and_then(|date| date.and_hms_opt(0, 0, 0)));

    datetime.ok_or(format!(
        "Could not decode date and time {}: Format is YYYY-MM-DDTHH:MM:SS, eg. 2024-01-31T04:00:00",
        s
    ))
}

#[derive(Parser)]
#[command(about = "Realizes recurring transactions and tracks budgets in a local vault")]
pub struct CadenceOptions {
    #[arg(short = 'V', long, global = true)]
    pub vault: Option<PathBuf>,

    /// Write logs as JSON lines instead of text.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Realize every due recurring transaction once, retrying failed passes.
    Process {
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,
    },
    /// List active budgets with their spending.
    Budgets {
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
    },
    /// Take this month's net worth snapshot.
    Snapshot {
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,
    },
    /// Register the periodic jobs.
    Schedule,
    /// Remove the periodic jobs.
    Cancel,
    /// Show the periodic jobs.
    Status,
    /// Run every registered job whose time has come.
    Tick {
        #[arg(long, value_parser = parse_datetime)]
        now: Option<NaiveDateTime>,
    },
}
