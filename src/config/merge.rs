//! Merge CLI arguments over file configuration and platform defaults.

use std::path::PathBuf;
use std::time::Duration;

use super::FileConfig;
use crate::domain::{
    parse_timestamp, validate_statuses, ChildFilter, ConfigError, ParentFilter, ParentStatus,
    Schema, TimeWindow, UrlStrategy,
};
use crate::pipeline::{ExportConfig, DEFAULT_PAGE_SIZE};
use crate::source::http::DEFAULT_TIMEOUT_SECS;

/// Values given on the command line. `None`/empty means "not given".
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub statuses: Vec<String>,
    pub since: Option<String>,
    pub until: Option<String>,
    pub output: Option<PathBuf>,
    pub include_system: bool,
    pub child_url: Option<String>,
    pub page_size: Option<usize>,
    pub parent_fields: Option<Vec<String>>,
    pub child_fields: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
}

/// Per-platform fallbacks used when neither CLI nor file set a value.
#[derive(Debug, Clone)]
pub struct PlatformDefaults {
    pub parent_fields: &'static [&'static str],
    pub child_fields: &'static [&'static str],
    pub output: PathBuf,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub export: ExportConfig,
    pub timeout: Duration,
}

pub fn merge_cli_with_config(
    file: FileConfig,
    cli: CliOverrides,
    defaults: PlatformDefaults,
) -> Result<RunSettings, ConfigError> {
    let statuses = cli
        .statuses
        .iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse::<ParentStatus>)
        .collect::<Result<Vec<_>, _>>()?;
    validate_statuses(&statuses)?;

    let after = cli.since.as_deref().map(parse_timestamp).transpose()?;
    let before = cli.until.as_deref().map(parse_timestamp).transpose()?;
    let window = TimeWindow::new(after, before)?;

    let page_size = cli.page_size.or(file.page_size).unwrap_or(DEFAULT_PAGE_SIZE);
    if page_size == 0 {
        return Err(ConfigError::ZeroPageSize);
    }

    let include_system = cli.include_system || file.include_system_comments.unwrap_or(false);
    let child_filter = if include_system { ChildFilter::All } else { ChildFilter::TextOnly };

    let url_strategy = match cli.child_url.as_deref() {
        Some(value) => value.parse::<UrlStrategy>()?,
        None => file.child_url.unwrap_or_default(),
    };

    let parent_fields = cli
        .parent_fields
        .or_else(|| file.parent_fields.map(|f| f.into_vec()))
        .unwrap_or_else(|| defaults.parent_fields.iter().map(|f| f.to_string()).collect());
    let child_fields = cli
        .child_fields
        .or_else(|| file.child_fields.map(|f| f.into_vec()))
        .unwrap_or_else(|| defaults.child_fields.iter().map(|f| f.to_string()).collect());

    let destination = cli.output.or(file.output).unwrap_or(defaults.output);
    let timeout =
        Duration::from_secs(cli.timeout_secs.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS));

    Ok(RunSettings {
        export: ExportConfig {
            filter: ParentFilter { statuses, window },
            parent_schema: Schema::new("parent records", parent_fields)?,
            child_schema: Schema::new("child records", child_fields)?,
            child_filter,
            url_strategy,
            page_size,
            destination,
        },
        timeout,
    })
}
