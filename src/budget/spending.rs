use crate::amounts::{Figure, FlowDirection};
use crate::budget::Budget;
use crate::period::Period;
use crate::recurring::RealizedTransaction;

fn matches_filter(filter: &Option<u64>, value: &Option<u64>) -> bool {
    match filter {
        None => true,
        Some(_) => filter == value,
    }
}

/// Sum of the expenses that count against `budget` during `period`.
///
/// A budget without a category (or account) filter counts every category
/// (or account). Amounts are summed as magnitudes whatever sign they were
/// stored with; income never counts.
pub fn spent_in_period(budget: &Budget, transactions: &[RealizedTransaction], period: &Period) -> Figure {
    transactions
        .iter()
        .filter(|transaction| transaction.direction == FlowDirection::Expense)
        .filter(|transaction| period.contains(&transaction.date.date()))
        .filter(|transaction| matches_filter(&budget.category_id, &transaction.category_id))
        .filter(|transaction| matches_filter(&budget.account_id, &Some(transaction.account_id)))
        .map(|transaction| transaction.amount.abs())
        .sum()
}
