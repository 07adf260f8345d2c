//! Next-occurrence computation.
//!
//! Every function here is pure: identical inputs always give identical output,
//! so callers may run the same computation once to validate a task and again
//! later to schedule it. The returned date is always strictly after `now`.

use std::collections::BTreeSet;

use tracing::debug;

use crate::date::{days_in_month, is_leap_year, Date, MAX_YEAR};
use crate::error::{EngineError, Result};
use crate::rule::RecurrenceRule;

/// Upper bound on the months walked by a monthly search.
///
/// Nine years covers the longest run of years without a Feb 29 (eight, across
/// a non-leap century year) plus the partial year the search starts in.
pub const MAX_MONTHLY_SEARCH: u32 = 12 * 9;

/// Compute the next occurrence of a task from its textual fields.
///
/// # Arguments
/// - `now` -- reference date; the result is strictly after it
/// - `date` -- the task's anchor date as `YYYYMMDD`
/// - `repeat` -- rule text (e.g. `"w 1,3"`); must not be empty
///
/// # Errors
/// Returns `EngineError::InvalidDate` if `date` does not parse,
/// `EngineError::EmptyRule` if `repeat` is empty, `EngineError::InvalidRuleFormat`
/// or `EngineError::InvalidRuleRange` for a malformed rule, and
/// `EngineError::NoOccurrence` if no representable date exists.
pub fn next_date(now: Date, date: &str, repeat: &str) -> Result<Date> {
    debug!(%now, date, repeat, "computing next date");

    let anchor = Date::parse(date)?;
    if repeat.is_empty() {
        return Err(EngineError::EmptyRule);
    }
    let rule: RecurrenceRule = repeat.parse()?;

    next_occurrence(now, anchor, &rule)
}

/// Compute the first occurrence of `rule` strictly after `now`.
///
/// Daily and yearly rules step from `anchor`. Weekly rules search forward
/// from `now`. Monthly rules search forward from the later of `now` and
/// `anchor`, so a future-dated task never moves to an earlier month.
///
/// # Errors
/// Returns `EngineError::InvalidRuleFormat` / `EngineError::InvalidRuleRange` if
/// the rule fails validation, and `EngineError::NoOccurrence` if the search
/// cannot reach a representable date.
pub fn next_occurrence(now: Date, anchor: Date, rule: &RecurrenceRule) -> Result<Date> {
    rule.validate()?;

    match rule {
        RecurrenceRule::Daily { interval } => next_daily(now, anchor, *interval),
        RecurrenceRule::Weekly { days } => {
            next_weekly(now, days.iter().copied()).ok_or_else(|| out_of_range(rule))
        }
        RecurrenceRule::Monthly { days, months } => {
            next_monthly(now.max(anchor), days, months, rule)
        }
        RecurrenceRule::Yearly => next_yearly(now, anchor),
    }
}

/// Smallest `anchor + k * interval` (k >= 1) strictly after `now`.
fn next_daily(now: Date, anchor: Date, interval: u32) -> Result<Date> {
    let interval = u64::from(interval);
    let elapsed = anchor.days_until(now).max(0) as u64;
    let steps = elapsed / interval + 1;

    steps
        .checked_mul(interval)
        .and_then(|days| anchor.checked_add_days(days))
        .ok_or_else(|| {
            EngineError::NoOccurrence(format!("d {} from {} passes year {}", interval, anchor, MAX_YEAR))
        })
}

/// Earliest date in `now + 1 ..= now + 7` whose weekday number is in `days`.
fn next_weekly(now: Date, days: impl Iterator<Item = u32>) -> Option<Date> {
    let today = now.weekday_number();
    let ahead = days
        .map(|day| match (day + 7 - today) % 7 {
            0 => 7,
            n => n,
        })
        .min()?;
    now.checked_add_days(u64::from(ahead))
}

/// Earliest date strictly after `after` in an allowed month whose day matches
/// a resolved day specifier.
fn next_monthly(
    after: Date,
    days: &BTreeSet<i32>,
    months: &BTreeSet<u32>,
    rule: &RecurrenceRule,
) -> Result<Date> {
    let (mut year, mut month) = (after.year(), after.month());

    for _ in 0..MAX_MONTHLY_SEARCH {
        if months.contains(&month) {
            let last = days_in_month(year, month);
            let mut resolved: Vec<u32> = days
                .iter()
                .filter_map(|&day| resolve_day(day, last))
                .collect();
            resolved.sort_unstable();

            for day in resolved {
                let candidate = Date::from_ymd(year, month, day)
                    .map_err(|_| out_of_range(rule))?;
                if candidate > after {
                    return Ok(candidate);
                }
            }
        }

        if month == 12 {
            year += 1;
            month = 1;
        } else {
            month += 1;
        }
        if year > MAX_YEAR {
            return Err(out_of_range(rule));
        }
    }

    Err(EngineError::NoOccurrence(format!(
        "{:?} matches no date within {} months after {}",
        rule.to_string(),
        MAX_MONTHLY_SEARCH,
        after
    )))
}

/// Map a day specifier onto a month with `last` days, or `None` if the month
/// has no such day.
fn resolve_day(day: i32, last: u32) -> Option<u32> {
    let last = last as i32;
    let resolved = if day > 0 { day } else { last + day + 1 };
    (1..=last).contains(&resolved).then_some(resolved as u32)
}

/// First anniversary of `anchor` strictly after `now`. A Feb 29 anchor falls
/// on Mar 1 in non-leap years.
fn next_yearly(now: Date, anchor: Date) -> Result<Date> {
    // Anniversaries in years before `now`'s year cannot qualify.
    let mut year = (anchor.year() + 1).max(now.year());

    while year <= MAX_YEAR {
        let candidate = anniversary(anchor, year)?;
        if candidate > now {
            return Ok(candidate);
        }
        year += 1;
    }

    Err(EngineError::NoOccurrence(format!(
        "yearly rule from {} passes year {}",
        anchor, MAX_YEAR
    )))
}

fn anniversary(anchor: Date, year: i32) -> Result<Date> {
    if anchor.month() == 2 && anchor.day() == 29 && !is_leap_year(year) {
        Date::from_ymd(year, 3, 1)
    } else {
        Date::from_ymd(year, anchor.month(), anchor.day())
    }
}

fn out_of_range(rule: &RecurrenceRule) -> EngineError {
    EngineError::NoOccurrence(format!(
        "{:?} has no occurrence before year {}",
        rule.to_string(),
        MAX_YEAR + 1
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Date {
        Date::parse(s).unwrap()
    }

    #[test]
    fn resolve_negative_days() {
        assert_eq!(resolve_day(-1, 29), Some(29));
        assert_eq!(resolve_day(-2, 30), Some(29));
        assert_eq!(resolve_day(-31, 31), Some(1));
        assert_eq!(resolve_day(-31, 30), None);
        assert_eq!(resolve_day(31, 30), None);
        assert_eq!(resolve_day(30, 30), Some(30));
    }

    #[test]
    fn daily_jumps_straight_to_the_first_step_after_now() {
        // 1530 days separate the two dates; 219 weeks is the first step past `now`.
        assert_eq!(
            next_daily(d("20240310"), d("20200101"), 7).unwrap(),
            d("20240313")
        );
    }

    #[test]
    fn daily_from_future_anchor_steps_once() {
        assert_eq!(
            next_daily(d("20240101"), d("20240201"), 3).unwrap(),
            d("20240204")
        );
    }

    #[test]
    fn weekly_same_weekday_means_next_week() {
        // 2024-03-05 is a Tuesday.
        assert_eq!(next_weekly(d("20240305"), [2].into_iter()), Some(d("20240312")));
    }

    #[test]
    fn monthly_from_future_anchor_starts_at_the_anchor() {
        let rule: RecurrenceRule = "m 15".parse().unwrap();
        assert_eq!(
            next_occurrence(d("20240101"), d("20240601"), &rule).unwrap(),
            d("20240615")
        );
        // The anchor day itself is not an occurrence after it.
        assert_eq!(
            next_occurrence(d("20240101"), d("20240615"), &rule).unwrap(),
            d("20240715")
        );
    }

    #[test]
    fn yearly_near_max_year_fails_cleanly() {
        let err = next_yearly(d("99991231"), d("99990101")).unwrap_err();
        assert!(matches!(err, EngineError::NoOccurrence(_)));
    }

    #[test]
    fn monthly_without_any_real_day_hits_the_cap() {
        let rule: RecurrenceRule = "m 31 2,4".parse().unwrap();
        let err = next_occurrence(d("20240101"), d("20240101"), &rule).unwrap_err();
        assert!(matches!(err, EngineError::NoOccurrence(_)));
    }
}
