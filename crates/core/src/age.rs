//! Age derivation from a birth date.
//!
//! Ages are counted in completed calendar months. A child born on the 31st reaches each monthly
//! anniversary on the last day of shorter months (31 Jan -> 28/29 Feb), matching how paediatric
//! growth and vital-sign charts bucket ages.

use api_shared::AgeRes;
use chrono::{Datelike, Months, NaiveDate};

/// Age at a given date.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Age {
    pub years: u32,
    pub months: u32,
    pub days: u32,
    pub total_months: u32,
}

impl Age {
    /// Age of someone born on `birth_date` as of `on_date`.
    ///
    /// Returns `None` when `on_date` is before `birth_date`.
    pub fn between(birth_date: NaiveDate, on_date: NaiveDate) -> Option<Self> {
        if on_date < birth_date {
            return None;
        }

        let estimate = i64::from(on_date.year() - birth_date.year()) * 12
            + (i64::from(on_date.month()) - i64::from(birth_date.month()));
        let mut total_months = u32::try_from(estimate.max(0)).ok()?;

        let mut anniversary = birth_date.checked_add_months(Months::new(total_months))?;
        if anniversary > on_date {
            total_months -= 1;
            anniversary = birth_date.checked_add_months(Months::new(total_months))?;
        }

        let days = u32::try_from((on_date - anniversary).num_days()).ok()?;

        Some(Self {
            years: total_months / 12,
            months: total_months % 12,
            days,
            total_months,
        })
    }

    /// Human readable age.
    ///
    /// Days under one month, months under two years, otherwise years and months.
    pub fn display(&self) -> String {
        if self.total_months == 0 {
            return plural(self.days, "day");
        }
        if self.total_months < 24 {
            return plural(self.total_months, "month");
        }
        if self.months == 0 {
            return plural(self.years, "year");
        }
        format!(
            "{} {}",
            plural(self.years, "year"),
            plural(self.months, "month")
        )
    }

    pub fn to_res(&self) -> AgeRes {
        AgeRes {
            years: self.years,
            months: self.months,
            days: self.days,
            total_months: self.total_months,
            display: self.display(),
        }
    }
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("1 {unit}")
    } else {
        format!("{n} {unit}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn newborn_age_is_counted_in_days() {
        let age = Age::between(date("2026-01-01"), date("2026-01-10")).unwrap();
        assert_eq!(age.total_months, 0);
        assert_eq!(age.days, 9);
        assert_eq!(age.display(), "9 days");

        let same_day = Age::between(date("2026-01-01"), date("2026-01-01")).unwrap();
        assert_eq!(same_day.display(), "0 days");
    }

    #[test]
    fn month_is_completed_on_anniversary_day() {
        let before = Age::between(date("2025-03-15"), date("2025-04-14")).unwrap();
        assert_eq!(before.total_months, 0);

        let on = Age::between(date("2025-03-15"), date("2025-04-15")).unwrap();
        assert_eq!(on.total_months, 1);
        assert_eq!(on.days, 0);
        assert_eq!(on.display(), "1 month");
    }

    #[test]
    fn month_end_birthday_clamps_to_short_month() {
        let age = Age::between(date("2025-01-31"), date("2025-02-28")).unwrap();
        assert_eq!(age.total_months, 1);
        assert_eq!(age.days, 0);

        let day_before = Age::between(date("2025-01-31"), date("2025-02-27")).unwrap();
        assert_eq!(day_before.total_months, 0);
        assert_eq!(day_before.days, 27);
    }

    #[test]
    fn years_and_months_are_split() {
        let age = Age::between(date("2022-05-20"), date("2025-08-25")).unwrap();
        assert_eq!(age.years, 3);
        assert_eq!(age.months, 3);
        assert_eq!(age.days, 5);
        assert_eq!(age.total_months, 39);
        assert_eq!(age.display(), "3 years 3 months");

        let whole_years = Age::between(date("2020-06-01"), date("2025-06-01")).unwrap();
        assert_eq!(whole_years.display(), "5 years");
    }

    #[test]
    fn under_two_years_is_shown_in_months() {
        let age = Age::between(date("2024-01-10"), date("2025-12-10")).unwrap();
        assert_eq!(age.total_months, 23);
        assert_eq!(age.display(), "23 months");
    }

    #[test]
    fn leap_day_birthday() {
        let age = Age::between(date("2024-02-29"), date("2025-02-28")).unwrap();
        assert_eq!(age.years, 1);
        assert_eq!(age.total_months, 12);
    }

    #[test]
    fn future_reference_date_has_no_age() {
        assert_eq!(Age::between(date("2025-01-02"), date("2025-01-01")), None);
    }
}
