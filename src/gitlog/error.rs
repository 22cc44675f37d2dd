//! Error types for git log export.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitLogError {
    #[error("Invalid date '{0}'. Use MM/DD/YYYY or YYYY-MM-DD")]
    InvalidDate(String),

    #[error("End date ({end}) must be later than start date ({start})")]
    EmptyRange { start: NaiveDate, end: NaiveDate },

    #[error("Repository list is missing the '{0}' column")]
    MissingColumn(&'static str),

    #[error("Failed to read repository list: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to clone {url}: {source}")]
    Clone {
        url: String,
        #[source]
        source: git2::Error,
    },

    #[error("git log failed for {repo}: {stderr}")]
    CommandFailed { repo: String, stderr: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
