//! Successive occurrences of a rule, built by chaining [`next_occurrence`].

use crate::date::Date;
use crate::error::Result;
use crate::next::next_occurrence;
use crate::rule::RecurrenceRule;

/// Iterator over the occurrences of a rule after a reference date.
///
/// Each item is the next occurrence after the previous item (or after `now`
/// for the first one). The iterator ends after yielding its first error.
#[derive(Debug, Clone)]
pub struct Occurrences {
    cursor: Date,
    anchor: Date,
    rule: RecurrenceRule,
    finished: bool,
}

impl Iterator for Occurrences {
    type Item = Result<Date>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match next_occurrence(self.cursor, self.anchor, &self.rule) {
            Ok(date) => {
                self.cursor = date;
                Some(Ok(date))
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

impl std::iter::FusedIterator for Occurrences {}

/// Iterate the occurrences of `rule` strictly after `now`.
pub fn occurrences(now: Date, anchor: Date, rule: RecurrenceRule) -> Occurrences {
    Occurrences {
        cursor: now,
        anchor,
        rule,
        finished: false,
    }
}

/// Collect the next `count` occurrences of `rule` after `now`.
///
/// # Errors
/// Returns the first error hit while stepping forward; no partial list is
/// returned.
pub fn upcoming(now: Date, anchor: Date, rule: &RecurrenceRule, count: usize) -> Result<Vec<Date>> {
    occurrences(now, anchor, rule.clone()).take(count).collect()
}
