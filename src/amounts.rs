use std::fmt::{Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub type Figure = Decimal;

/// Whether money comes into or leaves an account.
///
/// Persisted as `"INCOME"` / `"EXPENSE"`. The table in `as_str` and
/// `from_str` is the only mapping between the two representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlowDirection {
    Income,
    Expense,
}

impl FlowDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowDirection::Income => "INCOME",
            FlowDirection::Expense => "EXPENSE",
        }
    }

    /// Sign the figure the way it affects an account balance.
    pub fn signed(&self, figure: &Figure) -> Figure {
        match self {
            FlowDirection::Income => figure.abs(),
            FlowDirection::Expense => -figure.abs(),
        }
    }
}

impl FromStr for FlowDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INCOME" => Ok(FlowDirection::Income),
            "EXPENSE" => Ok(FlowDirection::Expense),
            other => Err(format!(
                "Unknown flow direction {}: expected INCOME or EXPENSE",
                other
            )),
        }
    }
}

impl TryFrom<String> for FlowDirection {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FlowDirection> for String {
    fn from(direction: FlowDirection) -> Self {
        direction.as_str().to_string()
    }
}

impl Display for FlowDirection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
