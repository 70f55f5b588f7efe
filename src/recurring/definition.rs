use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::amounts::{Figure, FlowDirection};
use crate::frequency::{advance, Frequency};

/// Template of a transaction that repeats on a schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringTransactionDefinition {
    pub id: u64,
    #[serde(default)]
    pub user_id: String,
    pub amount: Figure,
    pub direction: FlowDirection,
    #[serde(default)]
    pub category_id: Option<u64>,
    #[serde(default)]
    pub account_id: Option<u64>,
    #[serde(default)]
    pub description: String,
    pub frequency: Frequency,
    pub start: NaiveDateTime,
    /// `None` means the series never ends.
    #[serde(default)]
    pub end: Option<NaiveDateTime>,
    pub next_due: NaiveDateTime,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// Ledger entry produced from a definition for one due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealizedTransaction {
    pub amount: Figure,
    pub description: String,
    pub date: NaiveDateTime,
    pub direction: FlowDirection,
    pub category_id: Option<u64>,
    pub account_id: u64,
    pub user_id: String,
    #[serde(default)]
    pub recurring_id: Option<u64>,
}

/// Why a due definition was left untouched by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingUser,
    MissingAccount,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::MissingUser => write!(f, "no owning user"),
            SkipReason::MissingAccount => write!(f, "no account"),
        }
    }
}

impl RecurringTransactionDefinition {
    pub fn is_due(&self, as_of: &NaiveDateTime) -> bool {
        self.active && self.next_due <= *as_of
    }

    /// The series has an end and the pending due date is past it.
    pub fn has_ended(&self) -> bool {
        matches!(self.end, Some(end) if end < self.next_due)
    }

    pub fn following_due(&self) -> Result<NaiveDateTime, String> {
        advance(&self.next_due, &self.frequency)
    }

    /// Builds the transaction for the pending due date. The transaction is
    /// dated at `next_due`, not at the time the pass runs.
    pub fn realize(&self) -> Result<RealizedTransaction, SkipReason> {
        if self.user_id.trim().is_empty() {
            return Err(SkipReason::MissingUser);
        }
        let account_id = self.account_id.ok_or(SkipReason::MissingAccount)?;

        Ok(RealizedTransaction {
            amount: self.amount,
            description: self.description.clone(),
            date: self.next_due,
            direction: self.direction,
            category_id: self.category_id,
            account_id,
            user_id: self.user_id.clone(),
            recurring_id: Some(self.id),
        })
    }
}
