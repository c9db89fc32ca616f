//! Calendar arithmetic shared by the expander.
//!
//! Interval tests are made against fixed epochs instead of the window start,
//! so "every 2 weeks" selects the same weeks no matter where a window begins:
//!
//! ```text
//!     January 1970
//! Mo Tu We Th Fr Sa Su
//! 29 30 31  1  2  3  4   < week 0 (starts Monday 1969-12-29)
//!  5  6  7  8  9 10 11     week 1
//! 12 13 14 15 16 17 18     week 2
//! ```
//!
//! Months count from January 2000 (month index 0), years from 2000.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chores_core::InvalidRuleError;

/// `num_days_from_ce` of Monday 1969-12-29, the week epoch.
const WEEK_EPOCH_CE_DAYS: i32 = 719_160;

/// First year of the month/year epoch.
pub const EPOCH_YEAR: i32 = 2000;

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1..=12) of `year`; 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// `day` of `month` (1..=12), pulled back to the month's last day when the
/// month is shorter.
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month);
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

/// Weekday index of `date`, 0=Sunday..6=Saturday.
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Offset of a Sunday-based weekday index inside a Monday-first week.
pub(crate) fn monday_offset(day: u8) -> i32 {
    (i32::from(day) + 6) % 7
}

/// Whole weeks between the week epoch and `date` (negative before 1969-12-29).
pub fn week_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce() - WEEK_EPOCH_CE_DAYS).div_euclid(7)
}

/// The date of weekday `day` (0=Sunday) inside week `week` since the epoch.
pub(crate) fn date_in_week(week: i64, day: u8) -> Option<NaiveDate> {
    let days = i64::from(WEEK_EPOCH_CE_DAYS) + week * 7 + i64::from(monday_offset(day));
    i32::try_from(days)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
}

/// Months between January 2000 and the month containing `date`.
pub fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year() - EPOCH_YEAR) * 12 + i64::from(date.month0())
}

/// `(year, month0)` for an epoch month index.
pub(crate) fn month_from_index(index: i64) -> Option<(i32, u32)> {
    let year = i32::try_from(index.div_euclid(12)).ok()? + EPOCH_YEAR;
    Some((year, index.rem_euclid(12) as u32))
}

/// Date of the `week`-th occurrence of weekday `day` in `month` (0..=11) of
/// `year`. When the month has no such occurrence (a "5th Monday" in a month
/// with four), the last occurrence of that weekday is returned instead.
pub fn nth_weekday_of_month(
    year: i32,
    month: u32,
    week: u8,
    day: u8,
) -> Result<NaiveDate, InvalidRuleError> {
    if month > 11 {
        return Err(InvalidRuleError::single(
            "month",
            format!("month {month} out of range 0..=11"),
        ));
    }
    if !(1..=5).contains(&week) {
        return Err(InvalidRuleError::single(
            "nthWeekday.week",
            format!("week {week} out of range 1..=5"),
        ));
    }
    if day > 6 {
        return Err(InvalidRuleError::single(
            "nthWeekday.day",
            format!("weekday index {day} out of range 0..=6"),
        ));
    }

    let first = NaiveDate::from_ymd_opt(year, month + 1, 1).ok_or_else(|| {
        InvalidRuleError::single("year", format!("year {year} is not representable"))
    })?;

    let lead = (u32::from(day) + 7 - u32::from(weekday_index(first))) % 7;
    let mut dom = 1 + lead + (u32::from(week) - 1) * 7;
    if dom > days_in_month(year, month + 1) {
        dom -= 7;
    }

    NaiveDate::from_ymd_opt(year, month + 1, dom).ok_or_else(|| {
        InvalidRuleError::single("nthWeekday", format!("no such day {year}-{}-{dom}", month + 1))
    })
}

/// Calendar day (UTC) of a timestamp; time of day is discarded.
pub fn utc_day(at: DateTime<Utc>) -> NaiveDate {
    at.date_naive()
}

/// UTC midnight of a calendar day.
pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
