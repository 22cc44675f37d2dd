//! pr-export: export pull/merge requests and their discussions to CSV.
//!
//! Fetches paginated parent records (pull requests, merge requests) and
//! their comment threads from Azure DevOps or GitLab, and writes them as a
//! two-level tagged CSV. Also bulk-exports `git log` for a list of
//! repositories.

pub mod cli;
pub mod config;
pub mod domain;
pub mod gitlog;
pub mod pipeline;
pub mod source;
