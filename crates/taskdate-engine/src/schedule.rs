//! Task-date rules applied around persistence.
//!
//! A storage layer calls [`normalize_task_date`] before saving a created or
//! edited task and [`complete_task`] when the user marks it done. Both take
//! `today` explicitly so results stay reproducible.

use serde::{Deserialize, Serialize};

use crate::date::Date;
use crate::error::Result;
use crate::next::next_date;

/// What happens to a task once it is marked done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "date", rename_all = "snake_case")]
pub enum Completion {
    /// The task recurs; move it to this date.
    Reschedule(Date),
    /// The task does not recur and is finished.
    Retire,
}

/// Resolve the date a task should be stored with.
///
/// An empty `date` means `today`, and a date before `today` becomes `today`
/// whether or not the task repeats. A non-empty `repeat` must be a valid rule;
/// it is checked by computing its next occurrence from the stored date, and
/// the computed date is discarded.
///
/// # Errors
/// Propagates `EngineError::InvalidDate` for a malformed `date` and any rule
/// error from [`next_date`].
pub fn normalize_task_date(today: Date, date: &str, repeat: &str) -> Result<Date> {
    let stored = if date.is_empty() {
        today
    } else {
        Date::parse(date)?.max(today)
    };

    if !repeat.is_empty() {
        next_date(today, &stored.to_string(), repeat)?;
    }
    Ok(stored)
}

/// Decide what marking a task done does to it.
///
/// A recurring task moves to its next occurrence after both `today` and its
/// current date, so completing a future-dated task never moves it earlier.
///
/// # Errors
/// Propagates date and rule errors from [`next_date`]; a non-recurring task
/// still needs a well-formed `date`.
pub fn complete_task(today: Date, date: &str, repeat: &str) -> Result<Completion> {
    let current = Date::parse(date)?;
    if repeat.is_empty() {
        return Ok(Completion::Retire);
    }
    next_date(today.max(current), date, repeat).map(Completion::Reschedule)
}
