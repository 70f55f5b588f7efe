use chrono::{Datelike, Days, NaiveDate};

use crate::period::{Period, PeriodsConfiguration};

/// ISO weeks: Monday to Sunday.
pub struct CalendarWeekPeriodConfiguration {}

impl PeriodsConfiguration for CalendarWeekPeriodConfiguration {
    fn period_for_date(&self, date: &NaiveDate) -> Result<Period, String> {
        let days_since_monday = date.weekday().num_days_from_monday() as u64;
        let start_date = date
            .checked_sub_days(Days::new(days_since_monday))
            .ok_or("Could not compute the first day of the week")?;
        let end_date = start_date
            .checked_add_days(Days::new(6))
            .ok_or("Could not compute the last day of the week")?;

        Ok(Period { start_date, end_date })
    }
}
