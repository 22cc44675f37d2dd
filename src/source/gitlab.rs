//! GitLab merge requests and notes.

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

const NEXT_PAGE_HEADER: &str = "x-next-page";

/// GitLab silently truncates larger `per_page` values to this.
const MAX_PER_PAGE: usize = 100;

/// Columns shared by merge request and note rows.
pub const DEFAULT_FIELDS: &[&str] = &[
    "iid",
    "title",
    "state",
    "created_at",
    "closed_at",
    "web_url",
    "type",
    "body",
    "noteable_id",
    "author",
    "description",
];

#[derive(Debug, Clone)]
pub struct GitLabSettings {
    /// `https://gitlab.com` or a self-hosted instance.
    pub base_url: String,
    /// Numeric project id or `group/project` path.
    pub project: String,
    pub token: String,
    pub timeout: Duration,
}

pub struct GitLabSource {
    api: ApiClient,
    /// `{base}/api/v4/projects/{id}`
    project_api: String,
}

impl GitLabSource {
    pub fn new(settings: &GitLabSettings) -> anyhow::Result<Self> {
        if settings.token.trim().is_empty() {
            return Err(ConfigError::MissingCredentials(
                "GitLab access token with read_api scope (use --token or GITLAB_TOKEN)".to_string(),
            )
            .into());
        }
        let project_api = join_segments(
            &settings.base_url,
            &["api", "v4", "projects", settings.project.trim()],
        )?;
        let auth = Auth::Header { name: "PRIVATE-TOKEN", value: settings.token.clone() };
        let api = ApiClient::new(auth, settings.timeout)?;
        Ok(Self { api, project_api })
    }

    fn merge_requests_url(&self) -> String {
        format!("{}/merge_requests", self.project_api)
    }

    fn notes_url(&self, iid: i64) -> String {
        format!("{}/merge_requests/{iid}/notes", self.project_api)
    }

    fn to_parent(&self, mr: &Value) -> Result<ParentRecord, FetchError> {
        let iid = int_at(mr, "/iid").ok_or_else(|| FetchError::Decode {
            url: self.merge_requests_url(),
            reason: "merge request without iid".to_string(),
        })?;
        let web_url = str_at(mr, "/web_url").map(str::to_string);

        let record = Record::new()
            .with("id", field_at(mr, "/id"))
            .with("iid", iid)
            .with("title", field_at(mr, "/title"))
            .with("state", field_at(mr, "/state"))
            .with("created_at", field_at(mr, "/created_at"))
            .with("closed_at", field_at(mr, "/closed_at"))
            .with("merged_at", field_at(mr, "/merged_at"))
            .with("web_url", web_url.clone())
            .with("author", field_at(mr, "/author/username"))
            .with("description", field_at(mr, "/description"))
            .with("draft", field_at(mr, "/draft"))
            .with("source_branch", field_at(mr, "/source_branch"))
            .with("target_branch", field_at(mr, "/target_branch"))
            .with("merge_commit_sha", field_at(mr, "/merge_commit_sha"));

        Ok(ParentRecord { id: iid, web_url, record })
    }

    /// Each note is its own single-comment thread.
    fn to_thread(&self, parent: &ParentRecord, note: &Value) -> Option<Thread> {
        let id = int_at(note, "/id")?;
        let kind = if note.get("system").and_then(Value::as_bool) == Some(true) {
            ChildKind::System
        } else {
            ChildKind::Text
        };
        let record = Record::new()
            .with("id", id)
            .with("noteable_id", field_at(note, "/noteable_id"))
            .with("noteable_iid", field_at(note, "/noteable_iid"))
            .with("type", field_at(note, "/type"))
            .with("body", field_at(note, "/body"))
            .with("author", field_at(note, "/author/username"))
            .with("created_at", field_at(note, "/created_at"))
            .with("updated_at", field_at(note, "/updated_at"))
            .with("system", field_at(note, "/system"));
        let child = ChildRecord {
            id,
            parent_id: parent.id,
            kind,
            self_link: Some(format!("{}/{id}", self.notes_url(parent.id))),
            parent_link: parent.web_url.as_ref().map(|web| format!("{web}#note_{id}")),
            record,
        };
        Some(Thread { id: Some(id.to_string()), comments: vec![child] })
    }
}

/// Page-number listing that follows the `x-next-page` header.
struct GitLabPages<'a> {
    api: &'a ApiClient,
    url: String,
    query: Vec<(&'static str, String)>,
}

impl PagedEndpoint for GitLabPages<'_> {
    type Item = Value;

    fn first_cursor(&self) -> Cursor {
        Cursor::Token("1".to_string())
    }

    fn max_page_size(&self) -> Option<usize> {
        Some(MAX_PER_PAGE)
    }

    fn fetch_page(&mut self, cursor: &Cursor, page_size: usize) -> Result<Page<Value>, FetchError> {
        let Cursor::Token(page) = cursor else {
            return Err(FetchError::Decode {
                url: self.url.clone(),
                reason: format!("page-number listing cannot resume from {cursor:?}"),
            });
        };
        let page = page.clone();
        let mut query = self.query.clone();
        query.push(("page", page));
        query.push(("per_page", page_size.to_string()));

        let response = self.api.get_json(&self.url, &query)?;
        let next_token =
            response.header(NEXT_PAGE_HEADER).filter(|t| !t.is_empty()).map(str::to_string);
        let items = array_items(response.body).ok_or_else(|| FetchError::Decode {
            url: self.url.clone(),
            reason: "expected a JSON array".to_string(),
        })?;
        Ok(Page::new(items, next_token))
    }
}

impl ExportSource for GitLabSource {
    fn tags(&self) -> RowTags {
        RowTags::GITLAB
    }

    fn list_parents(
        &mut self,
        filter: &ParentFilter,
        page_size: usize,
    ) -> Result<Vec<ParentRecord>, FetchError> {
        // No status means every state, which is also GitLab's own default.
        let statuses: Vec<Option<ParentStatus>> = if filter.statuses.is_empty() {
            vec![None]
        } else {
            filter.statuses.iter().copied().map(Some).collect()
        };

        let mut parents = Vec::new();
        for status in statuses {
            let mut query = Vec::new();
            if let Some(status) = status {
                query.push(("state", status.gitlab_value().to_string()));
            }
            if let Some(after) = filter.window.after {
                query.push(("created_after", after.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }
            if let Some(before) = filter.window.before {
                query.push(("created_before", before.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }

            let mut pages = GitLabPages { api: &self.api, url: self.merge_requests_url(), query };
            let raw = fetch_all(&mut pages, page_size)?;
            tracing::info!(state = ?status, count = raw.len(), "fetched merge requests");
            for mr in &raw {
                parents.push(self.to_parent(mr)?);
            }
        }
        Ok(parents)
    }

    fn list_threads(
        &mut self,
        parent: &ParentRecord,
        page_size: usize,
    ) -> Result<Vec<Thread>, FetchError> {
        let mut pages =
            GitLabPages { api: &self.api, url: self.notes_url(parent.id), query: Vec::new() };
        let notes = fetch_all(&mut pages, page_size)?;
        Ok(notes.iter().filter_map(|note| self.to_thread(parent, note)).collect())
    }
}
