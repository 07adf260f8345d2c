//! Recurrence rules and their textual grammar.
//!
//! ```text
//! rule         := "y" | "d " interval | "w " weekday-list | "m " day-list [" " month-list]
//! interval     := integer in [1,400]
//! weekday-list := weekday ("," weekday)*      ; weekday in [1,7], 1=Monday
//! day-list     := day ("," day)*              ; day in [-31,31], day != 0
//! month-list   := month ("," month)*          ; month in [1,12]
//! ```
//!
//! Fields are separated by exactly one ASCII space. Anything else is rejected
//! rather than coerced: grammar violations become
//! [`EngineError::InvalidRuleFormat`], numbers outside their domain become
//! [`EngineError::InvalidRuleRange`].

use std::collections::BTreeSet;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Largest interval accepted by a daily rule.
pub const MAX_DAILY_INTERVAL: u32 = 400;

/// A parsed recurrence rule.
///
/// Build values through [`FromStr`] or the validating constructors; the engine
/// re-validates on every call, so a hand-assembled variant with out-of-domain
/// fields is reported as an error rather than evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecurrenceRule {
    /// Every `interval` days from the anchor date.
    Daily { interval: u32 },
    /// On the listed weekdays, 1 = Monday through 7 = Sunday.
    Weekly { days: BTreeSet<u32> },
    /// On the listed days of the listed months. Negative days count back from
    /// the end of the month, -1 being the last day.
    Monthly {
        days: BTreeSet<i32>,
        months: BTreeSet<u32>,
    },
    /// Once a year on the anchor's month and day.
    Yearly,
}

impl RecurrenceRule {
    /// Daily rule with the given interval.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRuleRange` unless `1 <= interval <= 400`.
    pub fn daily(interval: u32) -> Result<Self> {
        let rule = Self::Daily { interval };
        rule.validate()?;
        Ok(rule)
    }

    /// Weekly rule on the given weekday numbers.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRuleFormat` for an empty set and
    /// `EngineError::InvalidRuleRange` for numbers outside `1..=7`.
    pub fn weekly(days: impl IntoIterator<Item = u32>) -> Result<Self> {
        let rule = Self::Weekly {
            days: days.into_iter().collect(),
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Monthly rule. An empty `months` iterator means every month.
    ///
    /// # Errors
    /// Returns `EngineError::InvalidRuleFormat` for an empty day set and
    /// `EngineError::InvalidRuleRange` for days outside `-31..=31`, day 0, or
    /// months outside `1..=12`.
    pub fn monthly(
        days: impl IntoIterator<Item = i32>,
        months: impl IntoIterator<Item = u32>,
    ) -> Result<Self> {
        let mut months: BTreeSet<u32> = months.into_iter().collect();
        if months.is_empty() {
            months = (1..=12).collect();
        }
        let rule = Self::Monthly {
            days: days.into_iter().collect(),
            months,
        };
        rule.validate()?;
        Ok(rule)
    }

    /// Parse rule text where the empty string means "does not repeat".
    ///
    /// # Errors
    /// Same as [`RecurrenceRule::from_str`] for non-empty input.
    pub fn parse_optional(s: &str) -> Result<Option<Self>> {
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }

    /// Check every field against its domain.
    ///
    /// # Errors
    /// `EngineError::InvalidRuleFormat` for empty lists,
    /// `EngineError::InvalidRuleRange` for out-of-domain numbers.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Daily { interval } => {
                check_range(i64::from(*interval), 1, i64::from(MAX_DAILY_INTERVAL), "interval")?;
            }
            Self::Weekly { days } => {
                if days.is_empty() {
                    return Err(EngineError::InvalidRuleFormat(
                        "weekly rule needs at least one weekday".to_string(),
                    ));
                }
                for day in days {
                    check_range(i64::from(*day), 1, 7, "weekday")?;
                }
            }
            Self::Monthly { days, months } => {
                if days.is_empty() {
                    return Err(EngineError::InvalidRuleFormat(
                        "monthly rule needs at least one day".to_string(),
                    ));
                }
                if months.is_empty() {
                    return Err(EngineError::InvalidRuleFormat(
                        "monthly rule needs at least one month".to_string(),
                    ));
                }
                for day in days {
                    check_day_of_month(i64::from(*day))?;
                }
                for month in months {
                    check_range(i64::from(*month), 1, 12, "month")?;
                }
            }
            Self::Yearly => {}
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() {
            return Err(EngineError::EmptyRule);
        }

        let mut fields = s.split(' ');
        let kind = fields.next().unwrap_or_default();
        let args: Vec<&str> = fields.collect();

        match (kind, args.as_slice()) {
            ("y", []) => Ok(Self::Yearly),
            ("d", [interval]) => {
                let interval = check_range(
                    parse_number(interval)?,
                    1,
                    i64::from(MAX_DAILY_INTERVAL),
                    "interval",
                )?;
                Ok(Self::Daily {
                    interval: interval as u32,
                })
            }
            ("w", [days]) => {
                let days = parse_list(days)?
                    .into_iter()
                    .map(|d| check_range(d, 1, 7, "weekday").map(|d| d as u32))
                    .collect::<Result<BTreeSet<u32>>>()?;
                Ok(Self::Weekly { days })
            }
            ("m", [days, rest @ ..]) if rest.len() <= 1 => {
                let days = parse_list(days)?
                    .into_iter()
                    .map(|d| check_day_of_month(d).map(|d| d as i32))
                    .collect::<Result<BTreeSet<i32>>>()?;
                let months = match rest.first() {
                    Some(months) => parse_list(months)?
                        .into_iter()
                        .map(|m| check_range(m, 1, 12, "month").map(|m| m as u32))
                        .collect::<Result<BTreeSet<u32>>>()?,
                    None => (1..=12).collect(),
                };
                Ok(Self::Monthly { days, months })
            }
            ("y" | "d" | "w" | "m", _) => Err(EngineError::InvalidRuleFormat(format!(
                "wrong number of fields in {:?}",
                s
            ))),
            _ => Err(EngineError::InvalidRuleFormat(format!(
                "unknown rule kind {:?}",
                kind
            ))),
        }
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { interval } => write!(f, "d {}", interval),
            Self::Weekly { days } => write!(f, "w {}", join(days)),
            Self::Monthly { days, months } => {
                write!(f, "m {}", join(days))?;
                if months.len() < 12 {
                    write!(f, " {}", join(months))?;
                }
                Ok(())
            }
            Self::Yearly => f.write_str("y"),
        }
    }
}

impl TryFrom<String> for RecurrenceRule {
    type Error = EngineError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<RecurrenceRule> for String {
    fn from(rule: RecurrenceRule) -> Self {
        rule.to_string()
    }
}

fn join<T: fmt::Display>(values: &BTreeSet<T>) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse one integer field. Overflowing numbers are a range problem, anything
/// else that is not an integer is a format problem.
fn parse_number(field: &str) -> Result<i64> {
    field.parse::<i64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => {
            EngineError::InvalidRuleRange(format!("{:?} does not fit in any rule field", field))
        }
        _ => EngineError::InvalidRuleFormat(format!("{:?} is not an integer", field)),
    })
}

fn parse_list(field: &str) -> Result<Vec<i64>> {
    field.split(',').map(parse_number).collect()
}

fn check_range(value: i64, min: i64, max: i64, what: &str) -> Result<i64> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(EngineError::InvalidRuleRange(format!(
            "{} {} not in {}..={}",
            what, value, min, max
        )))
    }
}

fn check_day_of_month(value: i64) -> Result<i64> {
    if value == 0 {
        return Err(EngineError::InvalidRuleRange(
            "day 0 is not a day of the month".to_string(),
        ));
    }
    check_range(value, -31, 31, "day")
}
