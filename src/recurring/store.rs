use chrono::NaiveDateTime;
#[cfg(test)]
use mockall::automock;

use crate::errors::StoreError;
use crate::recurring::{RealizedTransaction, RecurringTransactionDefinition};

#[cfg_attr(test, automock)]
pub trait RecurringTransactionStore {
    /// Every active definition whose `next_due` is at or before `as_of`.
    fn due_recurring(
        &self,
        as_of: &NaiveDateTime,
    ) -> Result<Vec<RecurringTransactionDefinition>, StoreError>;

    /// Inserts `realized` and moves the definition's `next_due` one
    /// frequency step forward, as a single step: either both happen or
    /// neither does.
    fn process_due_recurring(
        &self,
        definition: &RecurringTransactionDefinition,
        realized: RealizedTransaction,
    ) -> Result<(), StoreError>;
}
