use chrono::NaiveDate;

use crate::accounts::AccountBalance;
use crate::errors::StoreError;
use crate::net_worth::{NetWorthSnapshot, NetWorthStore};
use crate::vault::VaultImpl;

impl NetWorthStore for VaultImpl {
    fn account_balances(&self) -> Result<Vec<AccountBalance>, StoreError> {
        let document = self.load()?;
        Ok(document
            .accounts
            .iter()
            .map(|account| account.balance(&document.transactions))
            .collect())
    }

    fn snapshot_for_month(&self, month: &NaiveDate) -> Result<Option<NetWorthSnapshot>, StoreError> {
        let document = self.load()?;
        Ok(document
            .net_worth_snapshots
            .into_iter()
            .find(|snapshot| snapshot.month == *month))
    }

    /// Replaces any snapshot already stored for the same month.
    fn save_snapshot(&self, snapshot: NetWorthSnapshot) -> Result<(), StoreError> {
        self.update(|document| {
            document
                .net_worth_snapshots
                .retain(|stored| stored.month != snapshot.month);
            document.net_worth_snapshots.push(snapshot);
            document.net_worth_snapshots.sort_by_key(|stored| stored.month);
            Ok(())
        })
    }
}
