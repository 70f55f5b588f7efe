use chrono::NaiveDateTime;
use tracing::debug;

use crate::errors::StoreError;
use crate::recurring::{RealizedTransaction, RecurringTransactionDefinition, RecurringTransactionStore};
use crate::vault::VaultImpl;

impl RecurringTransactionStore for VaultImpl {
    fn due_recurring(
        &self,
        as_of: &NaiveDateTime,
    ) -> Result<Vec<RecurringTransactionDefinition>, StoreError> {
        let document = self.load()?;
        Ok(document
            .recurring_transactions
            .into_iter()
            .filter(|definition| definition.is_due(as_of))
            .collect())
    }

    /// Appends `realized` and moves the definition's due date in one write.
    /// A definition whose stored due date no longer matches was realized by
    /// an earlier pass and is refused.
    fn process_due_recurring(
        &self,
        definition: &RecurringTransactionDefinition,
        realized: RealizedTransaction,
    ) -> Result<(), StoreError> {
        let next_due = definition
            .following_due()
            .map_err(StoreError::Rejected)?;

        self.update(|document| {
            let stored = document
                .recurring_transactions
                .iter_mut()
                .find(|stored| stored.id == definition.id)
                .ok_or(StoreError::NotFound(definition.id))?;

            if stored.next_due != definition.next_due {
                return Err(StoreError::Rejected(format!(
                    "recurring transaction {} is due {} in the vault, not {}",
                    definition.id, stored.next_due, definition.next_due
                )));
            }

            stored.next_due = next_due;
            document.transactions.push(realized);
            debug!(definition_id = definition.id, %next_due, "Recurring transaction advanced");
            Ok(())
        })
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod vault_recurring_store_tests {
    use pretty_assertions::assert_eq;

    use crate::errors::StoreError;
    use crate::recurring::fixtures::{day, monthly_rent};
    use crate::recurring::{RecurringTransactionProcessor, RecurringTransactionStore};
    use crate::vault::test_vault::vault_with;
    use crate::vault::VaultDocument;

    fn document() -> VaultDocument {
        let mut skipped = monthly_rent(2, day(2024, 1, 10));
        skipped.account_id = None;
        let mut later = monthly_rent(3, day(2024, 3, 1));
        later.description = "Later".to_string();
        let mut inactive = monthly_rent(4, day(2024, 1, 1));
        inactive.active = false;

        VaultDocument {
            recurring_transactions: vec![monthly_rent(1, day(2024, 1, 15)), skipped, later, inactive],
            ..VaultDocument::default()
        }
    }

    #[test]
    fn due_recurring__active_and_not_in_future() {
        let (_directory, vault) = vault_with(&document());

        let due = vault.due_recurring(&day(2024, 1, 20)).unwrap();

        assert_eq!(due.iter().map(|definition| definition.id).collect::<Vec<u64>>(), vec![1, 2]);
    }

    #[test]
    fn process_due_recurring__appends_and_advances() {
        let (_directory, vault) = vault_with(&document());
        let definition = monthly_rent(1, day(2024, 1, 15));

        vault
            .process_due_recurring(&definition, definition.realize().unwrap())
            .unwrap();

        let stored = vault.load().unwrap();
        assert_eq!(stored.transactions.len(), 1);
        assert_eq!(stored.transactions[0].date, day(2024, 1, 15));
        assert_eq!(stored.transactions[0].recurring_id, Some(1));
        assert_eq!(stored.recurring_transactions[0].next_due, day(2024, 2, 15));
    }

    #[test]
    fn process_due_recurring__stale_due_date__rejected_and_unchanged() {
        let (_directory, vault) = vault_with(&document());
        let definition = monthly_rent(1, day(2024, 1, 15));
        vault
            .process_due_recurring(&definition, definition.realize().unwrap())
            .unwrap();

        let again = vault.process_due_recurring(&definition, definition.realize().unwrap());

        assert!(matches!(again, Err(StoreError::Rejected(_))));
        let stored = vault.load().unwrap();
        assert_eq!(stored.transactions.len(), 1);
        assert_eq!(stored.recurring_transactions[0].next_due, day(2024, 2, 15));
    }

    #[test]
    fn process_due_recurring__unknown_definition__not_found() {
        let (_directory, vault) = vault_with(&document());
        let definition = monthly_rent(99, day(2024, 1, 15));

        assert_eq!(
            vault.process_due_recurring(&definition, definition.realize().unwrap()),
            Err(StoreError::NotFound(99))
        );
        assert!(vault.load().unwrap().transactions.is_empty());
    }

    #[test]
    fn pass__skipped_definition_keeps_due_date__second_pass_realizes_nothing_new() {
        let (_directory, vault) = vault_with(&document());
        let processor = RecurringTransactionProcessor::new(&vault);

        let first = processor.process_due_pass(&day(2024, 1, 20));
        let second = processor.process_due_pass(&day(2024, 1, 20));

        assert_eq!((first.successes(), first.skips()), (1, 1));
        assert_eq!((second.successes(), second.skips()), (0, 1));
        let stored = vault.load().unwrap();
        assert_eq!(stored.transactions.len(), 1);
        assert_eq!(stored.recurring_transactions[1].next_due, day(2024, 1, 10));
    }

    #[test]
    fn pass__long_overdue__one_occurrence_per_pass() {
        let (_directory, vault) = vault_with(&VaultDocument {
            recurring_transactions: vec![monthly_rent(1, day(2023, 11, 15))],
            ..VaultDocument::default()
        });
        let processor = RecurringTransactionProcessor::new(&vault);

        processor.process_due_pass(&day(2024, 1, 20));

        let stored = vault.load().unwrap();
        assert_eq!(stored.transactions.len(), 1);
        assert_eq!(stored.recurring_transactions[0].next_due, day(2023, 12, 15));
    }
}
