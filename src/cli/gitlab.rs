//! `gitlab` command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::{print_report, CommonArgs};
use super::utils::file_stem;
use crate::config::PlatformDefaults;
use crate::pipeline::run_export;
use crate::source::gitlab::DEFAULT_FIELDS;
use crate::source::{GitLabSettings, GitLabSource};

#[derive(Args)]
pub struct GitLabArgs {
    /// GitLab instance URL
    #[arg(long, value_name = "URL", default_value = "https://gitlab.com")]
    pub base_url: String,

    /// Project id or full path (group/project)
    #[arg(long, value_name = "PROJECT")]
    pub project: String,

    /// Access token with read_api scope
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: GitLabArgs) -> Result<()> {
    let defaults = PlatformDefaults {
        parent_fields: DEFAULT_FIELDS,
        child_fields: DEFAULT_FIELDS,
        output: PathBuf::from(format!("gitlab_{}_merge_requests.csv", file_stem(&args.project))),
    };
    let settings = args.common.resolve(defaults)?;

    let mut source = GitLabSource::new(&GitLabSettings {
        base_url: args.base_url,
        project: args.project,
        token: args.token.unwrap_or_default(),
        timeout: settings.timeout,
    })?;

    let report = run_export(&mut source, &settings.export)
        .with_context(|| format!("Failed exporting to {}", settings.export.destination.display()))?;
    print_report(&report, "merge request");
    Ok(())
}
