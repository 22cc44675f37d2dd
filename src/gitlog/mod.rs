//! Bulk `git log` export.
//!
//! Reads a repository list, bare-clones each repository into a scoped
//! temporary directory and writes its `git log --stat` for a date window
//! to a text file.

use chrono::{Duration as ChronoDuration, NaiveDate};
use git2::build::RepoBuilder;
use git2::{Cred, CredentialType, FetchOptions, RemoteCallbacks};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

pub mod error;

pub use error::GitLogError;

const GITHUB_ORG_COLUMN: &str = "GitHub Org";
const GITHUB_REPO_COLUMN: &str = "GitHub Repository";
const CLONE_URL_COLUMN: &str = "Non-GitHub Git clone URL";

/// One repository to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoEntry {
    pub name: String,
    pub clone_url: String,
}

/// Inclusive calendar-date range of commits to export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl LogWindow {
    pub fn parse(start: &str, end: &str) -> Result<Self, GitLogError> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        if end <= start {
            return Err(GitLogError::EmptyRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// `--after` bound: the day before `start`.
    pub fn after_arg(&self) -> String {
        format!("--after={}", (self.start - ChronoDuration::days(1)).format("%Y-%m-%d"))
    }

    /// `--before` bound: the day after `end`.
    pub fn before_arg(&self) -> String {
        format!("--before={}", (self.end + ChronoDuration::days(1)).format("%Y-%m-%d"))
    }

    pub fn file_name(&self, repo: &str) -> String {
        format!(
            "{repo}_git_log_{}-{}.txt",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// Accepts `MM/DD/YYYY` or `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, GitLogError> {
    let trimmed = value.trim();
    ["%m/%d/%Y", "%Y-%m-%d"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .ok_or_else(|| GitLogError::InvalidDate(trimmed.to_string()))
}

/// Read the repository list CSV. Rows naming neither a GitHub repository
/// nor a clone URL are skipped.
pub fn read_repo_list(path: &Path) -> Result<Vec<RepoEntry>, GitLogError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &'static str| {
        headers.iter().position(|h| h.trim() == name).ok_or(GitLogError::MissingColumn(name))
    };
    let org_idx = column(GITHUB_ORG_COLUMN)?;
    let repo_idx = column(GITHUB_REPO_COLUMN)?;
    let url_idx = column(CLONE_URL_COLUMN)?;

    let mut entries = Vec::new();
    for (line, row) in reader.records().enumerate() {
        let row = row?;
        let cell = |idx: usize| row.get(idx).unwrap_or("").trim();
        match repo_entry(cell(org_idx), cell(repo_idx), cell(url_idx)) {
            Some(entry) => entries.push(entry),
            None => tracing::warn!(
                row = line + 2,
                "skipping repository row without org/repo or clone URL"
            ),
        }
    }
    Ok(entries)
}

fn repo_entry(org: &str, repo: &str, clone_url: &str) -> Option<RepoEntry> {
    if !org.is_empty() && !repo.is_empty() {
        let name = repo.to_lowercase();
        return Some(RepoEntry { clone_url: format!("git@github.com:{org}/{name}.git"), name });
    }
    if clone_url.is_empty() {
        return None;
    }
    let last = clone_url.trim_end_matches('/').rsplit('/').next().unwrap_or(clone_url);
    let name = last.split(".git").next().unwrap_or(last).to_string();
    Some(RepoEntry { name, clone_url: clone_url.to_string() })
}

/// Hands out each kind of credential at most once, since libgit2 asks
/// again after every rejected credential.
#[derive(Debug, Default)]
struct CredentialAttempts {
    ssh_agent: bool,
    helper: bool,
    default: bool,
}

impl CredentialAttempts {
    fn next(
        &mut self,
        remote_url: &str,
        username: Option<&str>,
        allowed: CredentialType,
    ) -> Result<Cred, git2::Error> {
        if allowed.contains(CredentialType::SSH_KEY) && !self.ssh_agent {
            self.ssh_agent = true;
            return Cred::ssh_key_from_agent(username.unwrap_or("git"));
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) && !self.helper {
            self.helper = true;
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, remote_url, username);
        }
        if allowed.contains(CredentialType::DEFAULT) && !self.default {
            self.default = true;
            return Cred::default();
        }
        Err(git2::Error::from_str(&format!("no accepted credentials for {remote_url}")))
    }
}

/// A bare clone that lives as long as this value.
pub struct ScopedClone {
    dir: TempDir,
}

impl ScopedClone {
    pub fn bare(url: &str) -> Result<Self, GitLogError> {
        let dir = tempfile::Builder::new().prefix("pr-export-clone-").tempdir()?;

        let mut attempts = CredentialAttempts::default();
        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |remote_url, username, allowed| {
            attempts.next(remote_url, username, allowed)
        });
        let mut fetch = FetchOptions::new();
        fetch.remote_callbacks(callbacks);

        RepoBuilder::new()
            .bare(true)
            .fetch_options(fetch)
            .clone(url, dir.path())
            .map_err(|source| GitLogError::Clone { url: url.to_string(), source })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

/// `git log --all --stat` of `repo_dir` within `window`.
pub fn git_log(repo_dir: &Path, repo: &str, window: &LogWindow) -> Result<Vec<u8>, GitLogError> {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(["log", "--all", "--pretty=medium", "--no-color", "--date=default", "--stat"])
        .arg(window.after_arg())
        .arg(window.before_arg())
        .output()?;

    if !output.status.success() {
        return Err(GitLogError::CommandFailed {
            repo: repo.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output.stdout)
}

/// Export one log file per listed repository into `output_dir`.
///
/// The first failing repository aborts the run; clones are removed either way.
pub fn export_git_logs(
    repo_list: &Path,
    window: &LogWindow,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, GitLogError> {
    let entries = read_repo_list(repo_list)?;
    fs::create_dir_all(output_dir)?;
    tracing::info!(
        repos = entries.len(),
        after = %window.after_arg(),
        before = %window.before_arg(),
        "exporting git logs"
    );

    let mut written = Vec::with_capacity(entries.len());
    for entry in &entries {
        tracing::info!(repo = %entry.name, url = %entry.clone_url, "cloning");
        let clone = ScopedClone::bare(&entry.clone_url)?;
        let log = git_log(clone.path(), &entry.name, window)?;
        let path = output_dir.join(window.file_name(&entry.name));
        fs::write(&path, log)?;
        tracing::debug!(path = %path.display(), "wrote git log");
        written.push(path);
    }
    Ok(written)
}
