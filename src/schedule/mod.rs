//! Weekly schedule handling: fetch-or-cache, period lookup, and cleaning.

use chrono::{Datelike, Days, NaiveDate};

pub mod cleaner;
pub mod periods;
pub mod repository;

pub use cleaner::{CleanedEntry, CleanedWeekly, Cleaner, load_cleaned};
pub use periods::PeriodTimeTable;
pub use repository::WeeklyRepository;

/// Monday of the week containing `date` (ISO weekday, Monday=1).
pub fn week_monday(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the week containing `date`, used as the weekly cache expiry.
pub fn week_sunday(date: NaiveDate) -> NaiveDate {
    week_monday(date) + Days::new(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn monday_anchor_for_each_weekday() {
        // 2024-03-04 is a Monday
        assert_eq!(week_monday(day("2024-03-04")), day("2024-03-04"));
        assert_eq!(week_monday(day("2024-03-06")), day("2024-03-04"));
        assert_eq!(week_monday(day("2024-03-10")), day("2024-03-04"));
    }

    #[test]
    fn sunday_is_six_days_after_monday() {
        assert_eq!(week_sunday(day("2024-03-04")), day("2024-03-10"));
        assert_eq!(week_sunday(day("2024-03-10")), day("2024-03-10"));
    }
}
