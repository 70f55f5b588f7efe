mod definition;
mod job;
mod processor;
mod store;

use crate::vault::VaultReadable;

pub use definition::{RealizedTransaction, RecurringTransactionDefinition, SkipReason};
pub use job::{RecurringTransactionJob, RECURRING_TRANSACTION_JOB};
pub use processor::{ItemOutcome, ProcessingReport, RecurringTransactionProcessor};
pub use store::RecurringTransactionStore;

#[cfg(test)]
pub use store::MockRecurringTransactionStore;
#[cfg(test)]
pub use definition::fixtures;

pub type TransactionsVaultValues = Vec<RealizedTransaction>;
impl VaultReadable for TransactionsVaultValues {
    const KEY: &'static str = "transactions";
}
