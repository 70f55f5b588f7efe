mod job;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
#[cfg(test)]
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountBalance;
use crate::amounts::Figure;
use crate::errors::StoreError;

pub use job::{NetWorthSnapshotJob, NET_WORTH_SNAPSHOT_JOB};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetWorthSnapshot {
    /// First day of the month the snapshot stands for.
    pub month: NaiveDate,
    pub total_assets: Figure,
    pub total_liabilities: Figure,
    pub net_worth: Figure,
    pub taken_at: NaiveDateTime,
}

pub fn month_of(date: &NaiveDate) -> Result<NaiveDate, String> {
    date.with_day(1)
        .ok_or(format!("Could not compute the first day of the month of {}", date))
}

/// Positive balances are assets, negative balances are liabilities.
pub fn compute_snapshot(
    balances: &[AccountBalance],
    taken_at: &NaiveDateTime,
) -> Result<NetWorthSnapshot, String> {
    let (total_assets, total_liabilities) = balances.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(assets, liabilities), account| {
            if account.balance.is_sign_negative() {
                (assets, liabilities + account.balance.abs())
            } else {
                (assets + account.balance, liabilities)
            }
        },
    );

    Ok(NetWorthSnapshot {
        month: month_of(&taken_at.date())?,
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
        taken_at: *taken_at,
    })
}

#[cfg_attr(test, automock)]
pub trait NetWorthStore {
    fn account_balances(&self) -> Result<Vec<AccountBalance>, StoreError>;
    fn snapshot_for_month(&self, month: &NaiveDate) -> Result<Option<NetWorthSnapshot>, StoreError>;
    fn save_snapshot(&self, snapshot: NetWorthSnapshot) -> Result<(), StoreError>;
}

#[allow(non_snake_case)]
#[cfg(test)]
mod compute_snapshot_tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::compute_snapshot;
    use crate::accounts::AccountBalance;
    use crate::amounts::Figure;

    fn balance(account_id: u64, balance: Figure) -> AccountBalance {
        AccountBalance { account_id, name: format!("Account {}", account_id), balance }
    }

    #[test]
    fn compute_snapshot__splits_assets_and_liabilities() {
        let taken_at = NaiveDate::from_ymd_opt(2024, 3, 17).unwrap().and_hms_opt(2, 0, 0).unwrap();
        let snapshot = compute_snapshot(
            &[balance(1, dec!(1500)), balance(2, dec!(-400.25)), balance(3, dec!(0))],
            &taken_at,
        )
        .unwrap();

        assert_eq!(snapshot.month, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(snapshot.total_assets, dec!(1500));
        assert_eq!(snapshot.total_liabilities, dec!(400.25));
        assert_eq!(snapshot.net_worth, dec!(1099.75));
    }

    #[test]
    fn compute_snapshot__no_accounts__zero() {
        let taken_at = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let snapshot = compute_snapshot(&[], &taken_at).unwrap();
        assert_eq!(snapshot.net_worth, dec!(0));
    }
}
