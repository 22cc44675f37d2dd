//! Parent status, time window and child selection policies.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use super::ConfigError;

/// Status filter for parent records. `All` is a query value, never a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParentStatus {
    Active,
    Completed,
    Abandoned,
    All,
}

impl ParentStatus {
    /// Value for Azure DevOps `searchCriteria.status`.
    pub fn azure_value(self) -> &'static str {
        match self {
            ParentStatus::Active => "active",
            ParentStatus::Completed => "completed",
            ParentStatus::Abandoned => "abandoned",
            ParentStatus::All => "all",
        }
    }

    /// Value for the GitLab `state` query parameter.
    pub fn gitlab_value(self) -> &'static str {
        match self {
            ParentStatus::Active => "opened",
            ParentStatus::Completed => "merged",
            ParentStatus::Abandoned => "closed",
            ParentStatus::All => "all",
        }
    }
}

impl FromStr for ParentStatus {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "open" | "opened" => Ok(ParentStatus::Active),
            "completed" | "merged" => Ok(ParentStatus::Completed),
            "abandoned" | "closed" => Ok(ParentStatus::Abandoned),
            "all" => Ok(ParentStatus::All),
            other => Err(ConfigError::InvalidStatus(other.to_string())),
        }
    }
}

impl fmt::Display for ParentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.azure_value())
    }
}

/// Check a list of requested statuses. An empty list means "source default";
/// `all` may not be mixed with anything else and duplicates are rejected so
/// concatenated status queries cannot repeat records.
pub fn validate_statuses(statuses: &[ParentStatus]) -> Result<(), ConfigError> {
    if statuses.len() > 1 && statuses.contains(&ParentStatus::All) {
        return Err(ConfigError::StatusAllCombined);
    }
    for (i, status) in statuses.iter().enumerate() {
        if statuses[..i].contains(status) {
            return Err(ConfigError::DuplicateStatus(*status));
        }
    }
    Ok(())
}

/// Optional creation-time window for parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub after: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
}

impl TimeWindow {
    pub fn new(
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Result<Self, ConfigError> {
        if let (Some(a), Some(b)) = (after, before) {
            if b <= a {
                return Err(ConfigError::EmptyWindow { after: a, before: b });
            }
        }
        Ok(Self { after, before })
    }

    pub fn is_unbounded(&self) -> bool {
        self.after.is_none() && self.before.is_none()
    }
}

/// Parse an RFC 3339 timestamp or a plain `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let trimmed = value.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| ConfigError::InvalidTimestamp(trimmed.to_string()))
}

/// What a parent filter asks of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentFilter {
    pub statuses: Vec<ParentStatus>,
    pub window: TimeWindow,
}

/// Which children survive flattening.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChildFilter {
    #[default]
    TextOnly,
    All,
}

/// Where a child's `url` cell comes from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UrlStrategy {
    #[default]
    SelfLink,
    ParentUrl,
}

impl FromStr for UrlStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "self-link" | "self_link" | "self" => Ok(UrlStrategy::SelfLink),
            "parent-url" | "parent_url" | "parent" => Ok(UrlStrategy::ParentUrl),
            other => Err(ConfigError::InvalidUrlStrategy(other.to_string())),
        }
    }
}
