//! Configuration error type.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::ParentStatus;

/// Errors detected before any network call is made.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Invalid status '{0}'. Use: active|completed|abandoned|all")]
    InvalidStatus(String),

    #[error("Status 'all' cannot be combined with other statuses")]
    StatusAllCombined,

    #[error("Status '{0}' was given more than once")]
    DuplicateStatus(ParentStatus),

    #[error("Invalid timestamp '{0}'. Use YYYY-MM-DD or RFC 3339")]
    InvalidTimestamp(String),

    #[error("Time window is empty: {before} is not later than {after}")]
    EmptyWindow { after: DateTime<Utc>, before: DateTime<Utc> },

    #[error("Invalid child URL strategy '{0}'. Use: self-link|parent-url")]
    InvalidUrlStrategy(String),

    #[error("Projection schema for {0} must name at least one field")]
    EmptySchema(&'static str),

    #[error("Page size must be at least 1")]
    ZeroPageSize,

    #[error("Invalid {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
