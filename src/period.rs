mod calendar_month_period;
mod calendar_week_period;
mod calendar_year_period;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use calendar_month_period::CalendarMonthPeriodConfiguration;
use calendar_week_period::CalendarWeekPeriodConfiguration;
use calendar_year_period::CalendarYearPeriodConfiguration;

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Period {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl Period {
    pub fn contains(&self, date: &NaiveDate) -> bool {
        *date >= self.start_date && *date <= self.end_date
    }
}

pub trait PeriodsConfiguration {
    fn period_for_date(&self, date: &NaiveDate) -> Result<Period, String>;
}

/// The window a budget limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BudgetPeriod {
    #[serde(rename = "WEEKLY")]
    Weekly,
    #[serde(rename = "MONTHLY")]
    Monthly,
    #[serde(rename = "YEARLY")]
    Yearly,
}

impl BudgetPeriod {
    fn unpack(&self) -> &dyn PeriodsConfiguration {
        match self {
            BudgetPeriod::Weekly => &CalendarWeekPeriodConfiguration {},
            BudgetPeriod::Monthly => &CalendarMonthPeriodConfiguration {},
            BudgetPeriod::Yearly => &CalendarYearPeriodConfiguration {},
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetPeriod::Weekly => "WEEKLY",
            BudgetPeriod::Monthly => "MONTHLY",
            BudgetPeriod::Yearly => "YEARLY",
        }
    }
}

impl PeriodsConfiguration for BudgetPeriod {
    fn period_for_date(&self, date: &NaiveDate) -> Result<Period, String> {
        self.unpack().period_for_date(date)
    }
}
