//! `git-log` command implementation

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use super::utils::counted;
use crate::gitlog::{export_git_logs, LogWindow};

#[derive(Args)]
pub struct GitLogArgs {
    /// CSV listing repositories (GitHub Org, GitHub Repository, Non-GitHub Git clone URL)
    #[arg(value_name = "REPO_LIST_CSV")]
    pub repo_list: PathBuf,

    /// First day to include (MM/DD/YYYY or YYYY-MM-DD)
    #[arg(value_name = "START_DATE")]
    pub start: String,

    /// Last day to include (MM/DD/YYYY or YYYY-MM-DD)
    #[arg(value_name = "END_DATE")]
    pub end: String,

    /// Directory receiving one log file per repository
    #[arg(long, value_name = "DIR", default_value = "git_log_files")]
    pub output_dir: PathBuf,
}

pub fn run(args: GitLogArgs) -> Result<()> {
    let window = LogWindow::parse(&args.start, &args.end)?;
    let written = export_git_logs(&args.repo_list, &window, &args.output_dir)
        .with_context(|| format!("Failed exporting git logs from {}", args.repo_list.display()))?;
    println!("Exported {} to {}", counted(written.len(), "git log"), args.output_dir.display());
    Ok(())
}
