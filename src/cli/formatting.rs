use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::Table;
use rust_decimal::Decimal;

use crate::budget::{BudgetSummary, BudgetWithSpending};
use crate::net_worth::NetWorthSnapshot;
use crate::recurring::{ItemOutcome, ProcessingReport};
use crate::scheduler::{JobStatus, RetryOutcome};

/// One job started by a tick.
pub struct TickedJob {
    pub name: String,
    pub outcome: RetryOutcome,
    pub next_run: Result<NaiveDateTime, String>,
}

fn outcome_row(outcome: &ItemOutcome) -> Vec<String> {
    let mut row = vec![outcome.id().to_string()];
    row.extend(match outcome {
        ItemOutcome::Realized { date, next_due, .. } => [
            "Realized".to_string(),
            date.to_string(),
            format!("next due {}", next_due),
        ],
        ItemOutcome::Skipped { reason, .. } => {
            ["Skipped".to_string(), "".to_string(), reason.to_string()]
        }
        ItemOutcome::Failed { error, .. } => ["Failed".to_string(), "".to_string(), error.clone()],
    });
    row
}

pub fn format_process_screen(reports: &[ProcessingReport], outcome: &RetryOutcome) -> String {
    let mut components = vec![];

    for (attempt, report) in reports.iter().enumerate() {
        let attempt_title = title(&format!("Attempt {} as of {}", attempt + 1, report.now));
        let content = if let Some(store_error) = &report.store_error {
            format!("Could not read due recurring transactions: {}", store_error)
        } else if report.outcomes.is_empty() {
            "Nothing due".to_string()
        } else {
            let mut table = Table::new();
            table.set_header(vec!["Recurring transaction", "Outcome", "Date", "Details"]);
            for item in report.outcomes.iter() {
                table.add_row(outcome_row(item));
            }
            table.to_string()
        };
        components.push(format!("{}\n{}", attempt_title, content));

        if !report.ended_but_realized.is_empty() {
            let ids: Vec<String> = report.ended_but_realized.iter().map(u64::to_string).collect();
            components.push(format!("Realized past their end date: {}", ids.join(", ")));
        }
    }

    components.push(title(&format!(
        "Result: {} after {} attempt(s)",
        outcome.result, outcome.attempts
    )));
    components.push(format!("Release: {}", env!("RELEASE")));
    components.join("\n\n")
}

pub fn format_budgets_screen(
    date: &NaiveDate,
    budgets: &[BudgetWithSpending],
    summary: &BudgetSummary,
) -> String {
    let mut components = vec![title(&format!("Budgets as of {}", date))];

    if budgets.is_empty() {
        components.push("No active budgets".to_string());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Name", "Period", "Limit", "Spent", "Remaining", "Progress", "Status"]);
        for budget in budgets.iter() {
            table.add_row(vec![
                budget.budget.name.clone(),
                budget.budget.period.as_str().to_string(),
                budget.budget.limit.to_string(),
                budget.spent.to_string(),
                budget.remaining.to_string(),
                percentage(&budget.progress),
                budget.status.to_string(),
            ]);
        }
        table.add_row(vec![
            "Total".to_string(),
            "".to_string(),
            summary.total_budget_amount.to_string(),
            summary.total_spent.to_string(),
            summary.total_remaining.to_string(),
            percentage(&summary.overall_progress),
            "".to_string(),
        ]);
        components.push(table.to_string());
    }

    components.push(format!(
        "Healthy: {}, on track: {}, warning: {}, over budget: {}",
        summary.healthy, summary.on_track, summary.warning, summary.over_budget
    ));
    components.push(format!("Release: {}", env!("RELEASE")));
    components.join("\n\n")
}

pub fn format_snapshot_screen(outcome: &RetryOutcome, snapshot: Option<&NetWorthSnapshot>) -> String {
    let mut components = vec![title(&format!(
        "Net worth snapshot: {} after {} attempt(s)",
        outcome.result, outcome.attempts
    ))];

    match snapshot {
        Some(snapshot) => {
            let mut table = Table::new();
            table.set_header(vec!["Month", "Assets", "Liabilities", "Net worth", "Taken at"]);
            table.add_row(vec![
                snapshot.month.format("%Y-%m").to_string(),
                snapshot.total_assets.to_string(),
                snapshot.total_liabilities.to_string(),
                snapshot.net_worth.to_string(),
                snapshot.taken_at.to_string(),
            ]);
            components.push(table.to_string());
        }
        None => components.push("No snapshot for this month".to_string()),
    }

    components.push(format!("Release: {}", env!("RELEASE")));
    components.join("\n\n")
}

pub fn format_jobs_screen(heading: &str, jobs: &[(&str, String)]) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Job", "State"]);
    for (name, state) in jobs.iter() {
        table.add_row(vec![name.to_string(), state.clone()]);
    }
    format!("{}\n{}", title(heading), table)
}

pub fn describe_status(status: &JobStatus) -> String {
    match status {
        JobStatus::NotScheduled => "Not scheduled".to_string(),
        JobStatus::Enqueued { next_run } => format!("Next run {}", next_run),
        JobStatus::Running => "Running".to_string(),
    }
}

pub fn format_tick_screen(now: &NaiveDateTime, jobs: &[TickedJob]) -> String {
    let heading = title(&format!("Tick at {}", now));
    if jobs.is_empty() {
        return format!("{}\nNo job due", heading);
    }

    let mut table = Table::new();
    table.set_header(vec!["Job", "Result", "Attempts", "Next run"]);
    for job in jobs.iter() {
        table.add_row(vec![
            job.name.clone(),
            job.outcome.result.to_string(),
            job.outcome.attempts.to_string(),
            match &job.next_run {
                Ok(next_run) => next_run.to_string(),
                Err(reason) => format!("Not rescheduled: {}", reason),
            },
        ]);
    }
    format!("{}\n{}", heading, table)
}

fn percentage(ratio: &Decimal) -> String {
    format!("{}%", (*ratio * Decimal::ONE_HUNDRED).round_dp(1))
}

fn title(string: &str) -> String {
    let string_length = string.len();
    string.to_string() + "\n" + &"=".repeat(string_length)
}
