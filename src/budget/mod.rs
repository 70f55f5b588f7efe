mod spending;
mod status;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::amounts::Figure;
use crate::period::{BudgetPeriod, PeriodsConfiguration};
use crate::recurring::RealizedTransaction;
use crate::vault::VaultReadable;

pub use spending::spent_in_period;
pub use status::{compute_status, compute_summary, BudgetSummary, BudgetWithSpending};

fn default_alert_threshold() -> Decimal {
    dec!(0.8)
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: u64,
    pub name: String,
    pub limit: Figure,
    /// Fraction of the limit at which the budget starts warning, e.g. 0.8.
    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: Decimal,
    pub period: BudgetPeriod,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default = "default_active")]
    pub active: bool,
}

pub type BudgetsVaultValues = Vec<Budget>;
impl VaultReadable for BudgetsVaultValues {
    const KEY: &'static str = "budgets";
}

/// Active budgets with what was spent in the period containing `date`.
pub fn budgets_as_of(
    budgets: &[Budget],
    transactions: &[RealizedTransaction],
    date: &NaiveDate,
) -> Result<Vec<BudgetWithSpending>, String> {
    budgets
        .iter()
        .filter(|budget| budget.active)
        .map(|budget| {
            let period = budget.period.period_for_date(date)?;
            Ok(compute_status(budget, spent_in_period(budget, transactions, &period)))
        })
        .collect()
}
