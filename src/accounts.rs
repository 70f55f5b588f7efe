use serde::{Deserialize, Serialize};

use crate::amounts::Figure;
use crate::recurring::RealizedTransaction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: u64,
    pub name: String,
    /// Balance before any recorded transaction. Negative for debts.
    pub opening_balance: Figure,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalance {
    pub account_id: u64,
    pub name: String,
    pub balance: Figure,
}

impl Account {
    /// Opening balance moved by every transaction booked on this account.
    pub fn balance(&self, transactions: &[RealizedTransaction]) -> AccountBalance {
        let movements: Figure = transactions
            .iter()
            .filter(|transaction| transaction.account_id == self.id)
            .map(|transaction| transaction.direction.signed(&transaction.amount))
            .sum();

        AccountBalance {
            account_id: self.id,
            name: self.name.clone(),
            balance: self.opening_balance + movements,
        }
    }
}
