//! Error types for the query crate.

use thiserror::Error;

/// Errors raised while evaluating a single condition.
///
/// These never abort a filter run. The filter logs them, reports them in
/// [`Processed::errors`](crate::Processed::errors) and lets the record pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// The condition names an operator that does not exist.
    #[error("unknown operator '{name}' on field '{field}'")]
    UnknownOperator { field: String, name: String },

    /// The pattern of a `regexp` condition does not compile.
    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// The option of a `regexp` condition contains an unsupported flag.
    #[error("unsupported regular expression flag '{flag}'")]
    InvalidRegexFlag { flag: char },
}

/// Errors that can occur when building queries or pagers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// Page size must be at least one record.
    #[error("page size must be greater than zero")]
    ZeroPageSize,

    /// Page window must show at least one page number.
    #[error("page window must show at least one page")]
    ZeroWindow,

    /// A condition written as `field:op[:value[:option]]` could not be parsed.
    #[error("invalid condition '{input}': {reason}")]
    InvalidCondition { input: String, reason: String },

    /// An ordering written as `field[:asc|desc]` could not be parsed.
    #[error("invalid ordering '{input}': expected 'asc' or 'desc' direction")]
    InvalidOrdering { input: String },
}

impl QueryError {
    pub(crate) fn condition(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidCondition {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
