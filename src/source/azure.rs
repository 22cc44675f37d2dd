//! Azure DevOps pull requests and comment threads.

use chrono::SecondsFormat;
use serde_json::Value;
use std::time::Duration;

use super::http::{join_segments, ApiClient, Auth};
use super::json::{array_items, field_at, int_at, str_at};
use super::{ExportSource, FetchError};
use crate::domain::{
    ChildKind, ChildRecord, ConfigError, ParentFilter, ParentRecord, ParentStatus, Record, RowTags,
    Thread,
};
use crate::pipeline::{fetch_all, Cursor, Page, PagedEndpoint};

const API_VERSION: &str = "7.1";

/// Statuses exported when none are requested: merged first, then open.
pub const DEFAULT_STATUSES: [ParentStatus; 2] = [ParentStatus::Completed, ParentStatus::Active];

pub const DEFAULT_PARENT_FIELDS: &[&str] = &[
    "pull_request_id",
    "merge_id",
    "title",
    "status",
    "merge_status",
    "author",
    "creation_date",
    "closed_date",
    "description",
    "url",
];

pub const DEFAULT_CHILD_FIELDS: &[&str] =
    &["content", "published_date", "last_updated_date", "url", "author"];

/// Connection settings for one repository.
#[derive(Debug, Clone)]
pub struct AzureDevOpsSettings {
    /// `https://dev.azure.com/{org}` or `https://{org}.visualstudio.com`.
    pub organization_url: String,
    pub project: String,
    /// Repository name or id.
    pub repository: String,
    pub token: String,
    pub timeout: Duration,
}

pub struct AzureDevOpsSource {
    api: ApiClient,
    /// `{org}/{project}/_apis/git/repositories/{repo}`
    repository_api: String,
    /// `{org}/{project}/_git/{repo}`
    repository_web: String,
}

impl AzureDevOpsSource {
    pub fn new(settings: &AzureDevOpsSettings) -> anyhow::Result<Self> {
        if settings.token.trim().is_empty() {
            return Err(ConfigError::MissingCredentials(
                "Azure DevOps personal access token (use --token or AZURE_DEVOPS_PAT)".to_string(),
            )
            .into());
        }
        let repository_api = join_segments(
            &settings.organization_url,
            &[
                settings.project.as_str(),
                "_apis",
                "git",
                "repositories",
                settings.repository.as_str(),
            ],
        )?;
        let repository_web = join_segments(
            &settings.organization_url,
            &[settings.project.as_str(), "_git", settings.repository.as_str()],
        )?;
        let auth = Auth::Basic { user: String::new(), password: settings.token.clone() };
        let api = ApiClient::new(auth, settings.timeout)?;
        Ok(Self { api, repository_api, repository_web })
    }

    fn pull_request_web_url(&self, pr: &Value, id: i64) -> String {
        match str_at(pr, "/repository/webUrl") {
            Some(web) => format!("{}/pullrequest/{id}", web.trim_end_matches('/')),
            None => format!("{}/pullrequest/{id}", self.repository_web),
        }
    }

    fn to_parent(&self, pr: &Value) -> Result<ParentRecord, FetchError> {
        let id = int_at(pr, "/pullRequestId").ok_or_else(|| FetchError::Decode {
            url: self.repository_api.clone(),
            reason: "pull request without pullRequestId".to_string(),
        })?;
        let web_url = self.pull_request_web_url(pr, id);

        let mut record = Record::new()
            .with("pull_request_id", id)
            .with("merge_id", field_at(pr, "/mergeId"))
            .with("title", field_at(pr, "/title"))
            .with("status", field_at(pr, "/status"))
            .with("merge_status", field_at(pr, "/mergeStatus"))
            .with("author", field_at(pr, "/createdBy/uniqueName"))
            .with("creation_date", field_at(pr, "/creationDate"))
            .with("closed_date", field_at(pr, "/closedDate"))
            .with("description", field_at(pr, "/description"))
            .with("url", field_at(pr, "/url"))
            .with("web_url", web_url.as_str())
            .with("is_draft", field_at(pr, "/isDraft"));
        record.insert("source_branch", str_at(pr, "/sourceRefName").map(strip_ref));
        record.insert("target_branch", str_at(pr, "/targetRefName").map(strip_ref));

        Ok(ParentRecord { id, web_url: Some(web_url), record })
    }

    fn to_thread(&self, parent: &ParentRecord, thread: &Value) -> Thread {
        let thread_id = int_at(thread, "/id");
        let comments = thread
            .get("comments")
            .and_then(Value::as_array)
            .map(|comments| {
                comments
                    .iter()
                    .filter(|c| c.get("isDeleted").and_then(Value::as_bool) != Some(true))
                    .filter_map(|c| to_comment(parent, thread_id, c))
                    .collect()
            })
            .unwrap_or_default();
        Thread { id: thread_id.map(|id| id.to_string()), comments }
    }
}

fn strip_ref(name: &str) -> String {
    name.strip_prefix("refs/heads/").unwrap_or(name).to_string()
}

fn to_comment(
    parent: &ParentRecord,
    thread_id: Option<i64>,
    comment: &Value,
) -> Option<ChildRecord> {
    let id = int_at(comment, "/id")?;
    let kind = match str_at(comment, "/commentType") {
        Some("system") => ChildKind::System,
        _ => ChildKind::Text,
    };
    let parent_link = match (&parent.web_url, thread_id) {
        (Some(web), Some(thread)) => Some(format!("{web}?discussionId={thread}")),
        (Some(web), None) => Some(web.clone()),
        _ => None,
    };
    let record = Record::new()
        .with("id", id)
        .with("thread_id", thread_id)
        .with("pull_request_id", parent.id)
        .with("content", field_at(comment, "/content"))
        .with("comment_type", field_at(comment, "/commentType"))
        .with("published_date", field_at(comment, "/publishedDate"))
        .with("last_updated_date", field_at(comment, "/lastUpdatedDate"))
        .with("author", field_at(comment, "/author/uniqueName"))
        .with("parent_comment_id", field_at(comment, "/parentCommentId"));
    Some(ChildRecord {
        id,
        parent_id: parent.id,
        kind,
        self_link: str_at(comment, "/_links/self/href").map(str::to_string),
        parent_link,
        record,
    })
}

/// Offset-paginated `pullrequests` listing for one status.
struct PullRequestPages<'a> {
    api: &'a ApiClient,
    url: &'a str,
    query: Vec<(&'static str, String)>,
}

impl PagedEndpoint for PullRequestPages<'_> {
    type Item = Value;

    fn first_cursor(&self) -> Cursor {
        Cursor::Offset(0)
    }

    fn fetch_page(&mut self, cursor: &Cursor, page_size: usize) -> Result<Page<Value>, FetchError> {
        let Cursor::Offset(skip) = cursor else {
            return Err(FetchError::Decode {
                url: self.url.to_string(),
                reason: format!("offset listing cannot resume from {cursor:?}"),
            });
        };
        let mut query = self.query.clone();
        query.push(("$top", page_size.to_string()));
        query.push(("$skip", skip.to_string()));

        let response = self.api.get_json(self.url, &query)?;
        let items = value_array(response.body, self.url)?;
        Ok(Page::last(items))
    }
}

/// The `value` array of an Azure DevOps list response.
fn value_array(mut body: Value, url: &str) -> Result<Vec<Value>, FetchError> {
    body.get_mut("value")
        .map(Value::take)
        .and_then(array_items)
        .ok_or_else(|| FetchError::Decode {
            url: url.to_string(),
            reason: "missing 'value' array".to_string(),
        })
}

impl ExportSource for AzureDevOpsSource {
    fn tags(&self) -> RowTags {
        RowTags::AZURE_DEVOPS
    }

    fn list_parents(
        &mut self,
        filter: &ParentFilter,
        page_size: usize,
    ) -> Result<Vec<ParentRecord>, FetchError> {
        let url = format!("{}/pullrequests", self.repository_api);
        let statuses: &[ParentStatus] = if filter.statuses.is_empty() {
            &DEFAULT_STATUSES[..]
        } else {
            filter.statuses.as_slice()
        };

        let mut parents = Vec::new();
        for status in statuses {
            let mut query = vec![
                ("api-version", API_VERSION.to_string()),
                ("searchCriteria.status", status.azure_value().to_string()),
            ];
            if !filter.window.is_unbounded() {
                query.push(("searchCriteria.queryTimeRangeType", "created".to_string()));
            }
            if let Some(after) = filter.window.after {
                query.push((
                    "searchCriteria.minTime",
                    after.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }
            if let Some(before) = filter.window.before {
                query.push((
                    "searchCriteria.maxTime",
                    before.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }

            let mut pages = PullRequestPages { api: &self.api, url: &url, query };
            let raw = fetch_all(&mut pages, page_size)?;
            tracing::info!(status = %status, count = raw.len(), "fetched pull requests");
            for pr in &raw {
                parents.push(self.to_parent(pr)?);
            }
        }
        Ok(parents)
    }

    fn list_threads(
        &mut self,
        parent: &ParentRecord,
        _page_size: usize,
    ) -> Result<Vec<Thread>, FetchError> {
        // The threads listing is not paginated.
        let url = format!("{}/pullRequests/{}/threads", self.repository_api, parent.id);
        let response = self.api.get_json(&url, &[("api-version", API_VERSION.to_string())])?;
        let threads = value_array(response.body, &url)?;
        Ok(threads.iter().map(|t| self.to_thread(parent, t)).collect())
    }
}
