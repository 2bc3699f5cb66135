//! Calendar-day arithmetic
//!
//! All plan math runs on `chrono::NaiveDate` so a day is a day: no UTC drift,
//! no DST surprises near midnight.

use chrono::{Datelike, Duration, NaiveDate};

/// Add a number of calendar days to a date.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
  date + Duration::days(days)
}

/// Whole calendar days from `from` to `to` (negative when `to` is earlier).
/// Counts day boundaries crossed, never elapsed milliseconds.
pub fn diff_days(from: NaiveDate, to: NaiveDate) -> i64 {
  (to - from).num_days()
}

/// Weekday index with Monday = 0 .. Sunday = 6 (availability vector order).
pub fn weekday_index_monday(date: NaiveDate) -> usize {
  date.weekday().num_days_from_monday() as usize
}

/// Weekday index with Sunday = 0 .. Saturday = 6 (day plan convention).
pub fn weekday_index_sunday(date: NaiveDate) -> u32 {
  date.weekday().num_days_from_sunday()
}

/// The Monday of the week containing `date`.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
  date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
