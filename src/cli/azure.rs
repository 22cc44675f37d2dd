//! `azure-devops` command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::common::{print_report, CommonArgs};
use super::utils::file_stem;
use crate::config::PlatformDefaults;
use crate::pipeline::run_export;
use crate::source::azure::{DEFAULT_CHILD_FIELDS, DEFAULT_PARENT_FIELDS};
use crate::source::{AzureDevOpsSettings, AzureDevOpsSource};

#[derive(Args)]
pub struct AzureArgs {
    /// Organization URL, e.g. https://dev.azure.com/contoso
    #[arg(long, value_name = "URL")]
    pub org_url: String,

    /// Project name
    #[arg(long, value_name = "NAME")]
    pub project: String,

    /// Repository name or id
    #[arg(long, value_name = "NAME")]
    pub repository: String,

    /// Personal access token with Code (Read) scope
    #[arg(long, env = "AZURE_DEVOPS_PAT", hide_env_values = true, value_name = "TOKEN")]
    pub token: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run(args: AzureArgs) -> Result<()> {
    let defaults = PlatformDefaults {
        parent_fields: DEFAULT_PARENT_FIELDS,
        child_fields: DEFAULT_CHILD_FIELDS,
        output: PathBuf::from(format!(
            "azure_devops_{}_pull_requests.csv",
            file_stem(&args.repository)
        )),
    };
    let settings = args.common.resolve(defaults)?;

    let mut source = AzureDevOpsSource::new(&AzureDevOpsSettings {
        organization_url: args.org_url,
        project: args.project,
        repository: args.repository,
        token: args.token.unwrap_or_default(),
        timeout: settings.timeout,
    })?;

    let report = run_export(&mut source, &settings.export)
        .with_context(|| format!("Failed exporting to {}", settings.export.destination.display()))?;
    print_report(&report, "pull request");
    Ok(())
}
