//! Command-line interface for pr-export
//!
//! Provides `azure-devops`, `gitlab` and `git-log` subcommands.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod azure;
mod common;
mod git_log;
mod gitlab;
mod utils;

/// Export pull/merge requests and their comments to CSV
#[derive(Parser)]
#[command(name = "pr-export")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (sets log level to DEBUG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export Azure DevOps pull requests and their comment threads
    AzureDevops(Box<azure::AzureArgs>),

    /// Export GitLab merge requests and their notes
    Gitlab(Box<gitlab::GitLabArgs>),

    /// Write `git log --stat` for every repository in a list
    GitLog(git_log::GitLogArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG in the environment always takes precedence; --verbose falls back to DEBUG.
    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    match cli.command {
        Commands::AzureDevops(args) => azure::run(*args),
        Commands::Gitlab(args) => gitlab::run(*args),
        Commands::GitLog(args) => git_log::run(args),
    }
}
