//! Rule expansion into concrete calendar dates.
//!
//! Every function here is pure: the same rule and window always yield the
//! same ordered, duplicate-free dates. Windows are inclusive on both ends and
//! work at UTC calendar-day granularity.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use chores_core::InvalidRuleError;
use tracing::debug;

use crate::calendar::{
    clamped_date, date_in_week, month_from_index, month_index, monday_offset,
    nth_weekday_of_month, utc_day, utc_midnight, week_index, weekday_index, EPOCH_YEAR,
};
use crate::rule::{Frequency, RecurrenceRule, ValidRule};

/// Expand `rule` over `[start, end]`, using `start` as the anchor.
pub fn expand(rule: &ValidRule, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    expand_anchored(rule, start, start, end)
}

/// Validate and expand an unchecked rule.
pub fn expand_rule(
    rule: &RecurrenceRule,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<NaiveDate>, InvalidRuleError> {
    let valid = ValidRule::try_from(rule.clone())?;
    Ok(expand(&valid, start, end))
}

/// Expand a window given as timestamps. Both ends are truncated to their UTC
/// day and every result is a UTC midnight.
pub fn expand_datetimes(
    rule: &ValidRule,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    expand(rule, utc_day(start), utc_day(end))
        .into_iter()
        .map(utc_midnight)
        .collect()
}

/// Expand `rule` over `[start, end]` with a separate anchor.
///
/// The anchor is the first day the series may produce. It fixes the phase of
/// DAILY stepping and provides the weekday (WEEKLY without `daysOfWeek`),
/// day of month (MONTHLY without a day selector) and month/day (YEARLY).
/// Dates before the anchor are never produced.
pub fn expand_anchored(
    rule: &ValidRule,
    anchor: NaiveDate,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    let lo = start.max(anchor);
    if lo > end {
        return Vec::new();
    }

    let r = rule.rule();
    let interval = i64::from(rule.interval().max(1));

    let mut dates = match r.frequency {
        Frequency::Daily => daily(anchor, lo, end, interval),
        Frequency::Weekly => match r.weekdays() {
            Some(days) => weekly(lo, end, interval, days),
            None => weekly(lo, end, interval, &[weekday_index(anchor)]),
        },
        Frequency::Monthly => monthly(r, anchor, lo, end, interval),
        Frequency::Yearly => yearly(anchor, lo, end, interval),
    };

    // Weekday iteration order is not date order.
    dates.sort_unstable();
    dates.dedup();

    debug!(
        frequency = %r.frequency,
        interval,
        %start,
        %end,
        count = dates.len(),
        "expanded recurrence rule"
    );
    dates
}

// ── Per-frequency expansion ─────────────────────────────────────────

fn daily(anchor: NaiveDate, lo: NaiveDate, end: NaiveDate, interval: i64) -> Vec<NaiveDate> {
    // First step of the anchor's series at or after `lo`.
    let gap = (lo - anchor).num_days();
    let steps = (gap + interval - 1).div_euclid(interval);

    let mut dates = Vec::new();
    let mut next = anchor.checked_add_signed(Duration::days(steps * interval));
    // Stepping past the last representable date ends the series.
    while let Some(current) = next.filter(|d| *d <= end) {
        dates.push(current);
        next = current.checked_add_signed(Duration::days(interval));
    }
    dates
}

fn weekly(lo: NaiveDate, end: NaiveDate, interval: i64, days: &[u8]) -> Vec<NaiveDate> {
    let offsets: BTreeSet<u8> = days.iter().copied().filter(|d| *d <= 6).collect();
    let mut ordered: Vec<u8> = offsets.into_iter().collect();
    ordered.sort_by_key(|d| monday_offset(*d));

    let mut dates = Vec::new();
    for week in week_index(lo)..=week_index(end) {
        if week.rem_euclid(interval) != 0 {
            continue;
        }
        for day in &ordered {
            if let Some(date) = date_in_week(week, *day) {
                if date >= lo && date <= end {
                    dates.push(date);
                }
            }
        }
    }
    dates
}

fn monthly(
    rule: &RecurrenceRule,
    anchor: NaiveDate,
    lo: NaiveDate,
    end: NaiveDate,
    interval: i64,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for index in month_index(lo)..=month_index(end) {
        if index.rem_euclid(interval) != 0 {
            continue;
        }
        let Some((year, month0)) = month_from_index(index) else {
            continue;
        };

        let date = if let Some(nth) = rule.nth_weekday {
            nth_weekday_of_month(year, month0, nth.week, nth.day).ok()
        } else {
            let day = rule
                .day_of_month
                .map(u32::from)
                .unwrap_or_else(|| anchor.day());
            clamped_date(year, month0 + 1, day)
        };

        if let Some(date) = date.filter(|d| *d >= lo && *d <= end) {
            dates.push(date);
        }
    }
    dates
}

fn yearly(anchor: NaiveDate, lo: NaiveDate, end: NaiveDate, interval: i64) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    for year in lo.year()..=end.year() {
        if i64::from(year - EPOCH_YEAR).rem_euclid(interval) != 0 {
            continue;
        }
        // Feb 29 anchors clamp to Feb 28 in non-leap years.
        if let Some(date) = clamped_date(year, anchor.month(), anchor.day()) {
            if date >= lo && date <= end {
                dates.push(date);
            }
        }
    }
    dates
}
