use std::fmt::{Display, Formatter};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::amounts::Figure;
use crate::budget::Budget;

const ON_TRACK_PROGRESS: Decimal = dec!(0.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BudgetStatus {
    Healthy,
    OnTrack,
    Warning,
    OverBudget,
}

impl Display for BudgetStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BudgetStatus::Healthy => "HEALTHY",
            BudgetStatus::OnTrack => "ON_TRACK",
            BudgetStatus::Warning => "WARNING",
            BudgetStatus::OverBudget => "OVER_BUDGET",
        };
        write!(f, "{}", name)
    }
}

/// A budget joined with what was spent against it. Derived on every read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetWithSpending {
    pub budget: Budget,
    pub spent: Figure,
    pub remaining: Figure,
    pub progress: Decimal,
    pub over_budget: bool,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BudgetSummary {
    pub total_budget_amount: Figure,
    pub total_spent: Figure,
    pub total_remaining: Figure,
    pub overall_progress: Decimal,
    pub healthy: usize,
    pub on_track: usize,
    pub warning: usize,
    pub over_budget: usize,
}

fn ratio(part: &Figure, whole: &Figure) -> Decimal {
    if whole.is_zero() {
        return Decimal::ZERO;
    }
    part / whole
}

pub fn compute_status(budget: &Budget, spent: Figure) -> BudgetWithSpending {
    let progress = ratio(&spent, &budget.limit);
    let over_budget = spent > budget.limit;

    let status = if over_budget {
        BudgetStatus::OverBudget
    } else if progress >= budget.alert_threshold {
        BudgetStatus::Warning
    } else if progress >= ON_TRACK_PROGRESS {
        BudgetStatus::OnTrack
    } else {
        BudgetStatus::Healthy
    };

    BudgetWithSpending {
        budget: budget.clone(),
        spent,
        remaining: budget.limit - spent,
        progress,
        over_budget,
        status,
    }
}

pub fn compute_summary(budgets: &[BudgetWithSpending]) -> BudgetSummary {
    let mut summary = budgets
        .iter()
        .fold(BudgetSummary::default(), |mut summary, budget| {
            summary.total_budget_amount += budget.budget.limit;
            summary.total_spent += budget.spent;
            match budget.status {
                BudgetStatus::Healthy => summary.healthy += 1,
                BudgetStatus::OnTrack => summary.on_track += 1,
                BudgetStatus::Warning => summary.warning += 1,
                BudgetStatus::OverBudget => summary.over_budget += 1,
            }
            summary
        });

    summary.total_remaining = summary.total_budget_amount - summary.total_spent;
    summary.overall_progress = ratio(&summary.total_spent, &summary.total_budget_amount);
    summary
}
