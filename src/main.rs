//! pr-export command-line entry point.

use anyhow::Result;

fn main() -> Result<()> {
    pr_export::cli::run()
}
