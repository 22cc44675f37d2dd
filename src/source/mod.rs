//! Source collaborators: platforms that list parents and their threads.

use crate::domain::{ParentFilter, ParentRecord, RowTags, Thread};

pub mod azure;
pub mod error;
pub mod gitlab;
pub mod http;
pub mod json;

pub use azure::{AzureDevOpsSettings, AzureDevOpsSource};
pub use error::FetchError;
pub use gitlab::{GitLabSettings, GitLabSource};

/// A platform exposing pull/merge requests and their discussion threads.
pub trait ExportSource {
    /// Column-0 tags for this platform's rows.
    fn tags(&self) -> RowTags;

    /// Every parent matching `filter`, walking all pages.
    fn list_parents(
        &mut self,
        filter: &ParentFilter,
        page_size: usize,
    ) -> Result<Vec<ParentRecord>, FetchError>;

    /// Threads of one parent, in source order.
    fn list_threads(
        &mut self,
        parent: &ParentRecord,
        page_size: usize,
    ) -> Result<Vec<Thread>, FetchError>;
}
