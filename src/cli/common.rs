//! Options shared by the pull/merge request exporters.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::{counted, parse_csv};
use crate::config::{
    load_config, merge_cli_with_config, CliOverrides, PlatformDefaults, RunSettings,
};
use crate::pipeline::ExportReport;

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Status filter (repeatable or comma-separated): active, completed, abandoned, all
    #[arg(short, long = "status", value_name = "STATUS")]
    pub statuses: Vec<String>,

    /// Only records created at or after this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "TIME")]
    pub since: Option<String>,

    /// Only records created before this time (RFC 3339 or YYYY-MM-DD)
    #[arg(long, value_name = "TIME")]
    pub until: Option<String>,

    /// Output CSV path
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to config file (pr-export.toml or pr-export.yml)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Include platform-generated (system) comments
    #[arg(long)]
    pub include_system: bool,

    /// URL written for each comment: self-link or parent-url
    #[arg(long, value_name = "STRATEGY")]
    pub child_url: Option<String>,

    /// Records requested per page
    #[arg(long, value_name = "N")]
    pub page_size: Option<usize>,

    /// Parent columns (comma-separated)
    #[arg(long, value_name = "FIELDS")]
    pub parent_fields: Option<String>,

    /// Comment columns (comma-separated)
    #[arg(long, value_name = "FIELDS")]
    pub child_fields: Option<String>,

    /// HTTP timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,
}

impl CommonArgs {
    /// Load the config file and merge these options over it.
    pub fn resolve(&self, defaults: PlatformDefaults) -> Result<RunSettings> {
        let cwd = std::env::current_dir()?;
        let file_config = load_config(&cwd, self.config.as_deref())?;

        let overrides = CliOverrides {
            statuses: self.statuses.clone(),
            since: self.since.clone(),
            until: self.until.clone(),
            output: self.output.clone(),
            include_system: self.include_system,
            child_url: self.child_url.clone(),
            page_size: self.page_size,
            parent_fields: parse_csv(&self.parent_fields),
            child_fields: parse_csv(&self.child_fields),
            timeout_secs: self.timeout_secs,
        };
        merge_cli_with_config(file_config, overrides, defaults).context("Invalid configuration")
    }
}

pub fn print_report(report: &ExportReport, kind: &str) {
    println!("Exported {} to {}", counted(report.summary.parents, kind), report.path.display());
    if report.summary.children > 0 {
        tracing::info!(children = report.summary.children, "comments exported");
    }
}
