use chrono::{Datelike, NaiveDate};

use crate::period::{Period, PeriodsConfiguration};

pub struct CalendarYearPeriodConfiguration {}

impl PeriodsConfiguration for CalendarYearPeriodConfiguration {
    fn period_for_date(&self, date: &NaiveDate) -> Result<Period, String> {
        Ok(Period {
            start_date: NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .ok_or("Could not compute the first day of the year")?,
            end_date: NaiveDate::from_ymd_opt(date.year(), 12, 31)
                .ok_or("Could not compute the last day of the year")?,
        })
    }
}
