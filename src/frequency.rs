use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Days, Months, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Frequency {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Quarterly,
    Yearly,
}

#[cfg(test)]
pub const ALL_FREQUENCIES: [Frequency; 6] = [
    Frequency::Daily,
    Frequency::Weekly,
    Frequency::Biweekly,
    Frequency::Monthly,
    Frequency::Quarterly,
    Frequency::Yearly,
];

enum Step {
    Days(u64),
    Months(u32),
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Biweekly => "BIWEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Quarterly => "QUARTERLY",
            Frequency::Yearly => "YEARLY",
        }
    }

    fn step(&self) -> Step {
        match self {
            Frequency::Daily => Step::Days(1),
            Frequency::Weekly => Step::Days(7),
            Frequency::Biweekly => Step::Days(14),
            Frequency::Monthly => Step::Months(1),
            Frequency::Quarterly => Step::Months(3),
            Frequency::Yearly => Step::Months(12),
        }
    }
}

/// Returns the due date following `current_due`.
///
/// Month based frequencies follow chrono's calendar rules: when the day does
/// not exist in the target month the result is clamped to the last day of
/// that month (2024-01-31 + 1 month = 2024-02-29). The time of day is kept.
///
/// The only error is leaving chrono's representable range.
pub fn advance(current_due: &NaiveDateTime, frequency: &Frequency) -> Result<NaiveDateTime, String> {
    let next = match frequency.step() {
        Step::Days(days) => current_due.checked_add_days(Days::new(days)),
        Step::Months(months) => current_due.checked_add_months(Months::new(months)),
    };

    next.ok_or(format!(
        "Could not advance {} by one {} step: date out of range",
        current_due, frequency
    ))
}

/// Applies `advance` `times` times in a row.
#[cfg(test)]
pub fn advance_n(
    current_due: &NaiveDateTime,
    frequency: &Frequency,
    times: u32,
) -> Result<NaiveDateTime, String> {
    (0..times).try_fold(*current_due, |due, _| advance(&due, frequency))
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "BIWEEKLY" => Ok(Frequency::Biweekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "QUARTERLY" => Ok(Frequency::Quarterly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(format!("Unknown frequency: {}", other)),
        }
    }
}

impl TryFrom<String> for Frequency {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Frequency> for String {
    fn from(frequency: Frequency) -> Self {
        frequency.as_str().to_string()
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod advance_tests {
    use super::{advance, advance_n, Frequency, ALL_FREQUENCIES};
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    struct Test {
        frequency: Frequency,
        input: NaiveDateTime,
        expected_output: NaiveDateTime,
    }

    impl Test {
        fn execute(&self) {
            assert_eq!(
                advance(&self.input, &self.frequency).unwrap(),
                self.expected_output
            )
        }
    }

    #[test]
    fn daily__end_of_year() {
        Test { frequency: Frequency::Daily, input: at(2023, 12, 31), expected_output: at(2024, 1, 1) }.execute();
    }

    #[test]
    fn weekly__across_month() {
        Test { frequency: Frequency::Weekly, input: at(2024, 1, 29), expected_output: at(2024, 2, 5) }.execute();
    }

    #[test]
    fn biweekly__across_leap_day() {
        Test { frequency: Frequency::Biweekly, input: at(2024, 2, 20), expected_output: at(2024, 3, 5) }.execute();
    }

    #[test]
    fn monthly__mid_month() {
        Test { frequency: Frequency::Monthly, input: at(2024, 1, 15), expected_output: at(2024, 2, 15) }.execute();
    }

    #[test]
    fn monthly__thirty_first__clamped_to_leap_february() {
        Test { frequency: Frequency::Monthly, input: at(2024, 1, 31), expected_output: at(2024, 2, 29) }.execute();
    }

    #[test]
    fn monthly__thirty_first__clamped_to_february() {
        Test { frequency: Frequency::Monthly, input: at(2023, 1, 31), expected_output: at(2023, 2, 28) }.execute();
    }

    #[test]
    fn monthly__december__rolls_year() {
        Test { frequency: Frequency::Monthly, input: at(2023, 12, 10), expected_output: at(2024, 1, 10) }.execute();
    }

    #[test]
    fn quarterly__november__rolls_year() {
        Test { frequency: Frequency::Quarterly, input: at(2023, 11, 30), expected_output: at(2024, 2, 29) }.execute();
    }

    #[test]
    fn yearly__leap_day__clamped() {
        Test { frequency: Frequency::Yearly, input: at(2024, 2, 29), expected_output: at(2025, 2, 28) }.execute();
    }

    #[test]
    fn every_frequency__is_strictly_later() {
        let starts = [at(2023, 1, 31), at(2024, 2, 29), at(2024, 12, 31), at(1999, 6, 1)];
        for frequency in ALL_FREQUENCIES.iter() {
            for start in starts.iter() {
                assert!(
                    advance(start, frequency).unwrap() > *start,
                    "{} from {}",
                    frequency,
                    start
                );
            }
        }
    }

    #[test]
    fn twelve_monthly_advances__match_one_yearly_advance() {
        for day in 1..=28 {
            let start = at(2023, 3, day);
            assert_eq!(
                advance_n(&start, &Frequency::Monthly, 12).unwrap(),
                advance(&start, &Frequency::Yearly).unwrap()
            );
        }
    }

    #[test]
    fn advance__keeps_time_of_day() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(23, 59, 59).unwrap();
        let expected = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap().and_hms_opt(23, 59, 59).unwrap();
        assert_eq!(advance(&start, &Frequency::Daily).unwrap(), expected)
    }

    #[test]
    fn advance__out_of_range__is_an_error() {
        assert!(advance(&NaiveDateTime::MAX, &Frequency::Daily).is_err())
    }

    #[test]
    fn advance_n__zero_times__is_identity() {
        assert_eq!(advance_n(&at(2024, 1, 1), &Frequency::Yearly, 0).unwrap(), at(2024, 1, 1))
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod frequency_parsing_tests {
    use super::{Frequency, ALL_FREQUENCIES};

    #[test]
    fn as_str__parses_back() {
        for frequency in ALL_FREQUENCIES.iter() {
            assert_eq!(frequency.as_str().parse::<Frequency>().unwrap(), *frequency)
        }
    }

    #[test]
    fn from_str__unknown_name__is_rejected() {
        assert_eq!(
            "FORTNIGHTLY".parse::<Frequency>().unwrap_err(),
            "Unknown frequency: FORTNIGHTLY"
        )
    }

    #[test]
    fn deserialize__unknown_name__fails_instead_of_defaulting() {
        assert!(serde_json::from_str::<Frequency>("\"monthly\"").is_err())
    }
}
