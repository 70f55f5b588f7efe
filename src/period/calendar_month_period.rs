use chrono::{Datelike, Months, NaiveDate};

use crate::period::{Period, PeriodsConfiguration};

pub struct CalendarMonthPeriodConfiguration {}

impl PeriodsConfiguration for CalendarMonthPeriodConfiguration {
    fn period_for_date(&self, date: &NaiveDate) -> Result<Period, String> {
        Ok(Period {
            start_date: date
                .with_day(1)
                .ok_or("Could not compute the first day of the month")?,
            end_date: (|| {
                let first_day = date.with_day(1)?;
                let next_month = first_day.checked_add_months(Months::new(1))?;
                next_month.pred_opt()
            })()
            .ok_or("Could not compute the last day of the month")?,
        })
    }
}
