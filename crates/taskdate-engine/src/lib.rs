//! # taskdate-engine
//!
//! Deterministic next-occurrence computation for recurring tasks.
//!
//! Given a reference date, a task's anchor date and a recurrence rule such as
//! `"d 7"`, `"w 1,3"`, `"m -1 2,8"` or `"y"`, the engine returns the first
//! occurrence strictly after the reference date. It performs no I/O and holds
//! no state, so it can be called from any number of threads at once.
//!
//! ```rust
//! use taskdate_engine::{next_date, Date};
//!
//! let now = Date::parse("20240305").unwrap(); // a Tuesday
//! let next = next_date(now, "20240301", "w 1,3").unwrap();
//! assert_eq!(next.to_string(), "20240306");
//! ```
//!
//! ## Modules
//!
//! - [`date`] — `YYYYMMDD` calendar dates
//! - [`rule`] — recurrence rule type and its textual grammar
//! - [`next`] — next-occurrence computation
//! - [`occurrences`] — iterate several occurrences in a row
//! - [`schedule`] — task-date normalization and completion
//! - [`error`] — Error types

pub mod date;
pub mod error;
pub mod next;
pub mod occurrences;
pub mod rule;
pub mod schedule;

pub use date::Date;
pub use error::EngineError;
pub use next::{next_date, next_occurrence};
pub use occurrences::{occurrences, upcoming, Occurrences};
pub use rule::RecurrenceRule;
pub use schedule::{complete_task, normalize_task_date, Completion};
