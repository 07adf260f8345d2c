//! Error types for taskdate-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The date string is not a valid `YYYYMMDD` calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// No recurrence rule was supplied where one is required.
    #[error("Empty recurrence rule")]
    EmptyRule,

    /// The rule text violates the grammar (wrong token count, non-numeric field).
    #[error("Invalid rule format: {0}")]
    InvalidRuleFormat(String),

    /// A numeric field is outside the domain allowed for its rule kind.
    #[error("Rule value out of range: {0}")]
    InvalidRuleRange(String),

    /// The forward search could not reach a representable date.
    #[error("No occurrence: {0}")]
    NoOccurrence(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
