//! Paginated export pipeline: fetch parents, resolve children per parent,
//! project both onto fixed schemas and write a two-level CSV.

use std::path::PathBuf;

pub mod error;
pub mod paginate;
pub mod project;
pub mod resolve;
pub mod sink;
pub mod writer;

pub use error::ExportError;
pub use paginate::{fetch_all, Cursor, Page, PagedEndpoint};
pub use project::project;
pub use resolve::{ChildResolver, ResolveChildren};
pub use sink::CsvSink;
pub use writer::{emit, EmitSummary, RowLayout};

use crate::domain::{ChildFilter, ParentFilter, Schema, UrlStrategy};
use crate::source::ExportSource;

/// Default number of records requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Everything one export run needs besides the source itself.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub filter: ParentFilter,
    pub parent_schema: Schema,
    pub child_schema: Schema,
    pub child_filter: ChildFilter,
    pub url_strategy: UrlStrategy,
    pub page_size: usize,
    pub destination: PathBuf,
}

/// Outcome of a completed export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub path: PathBuf,
    pub summary: EmitSummary,
}

/// Run one export from `source` into `config.destination`.
///
/// The destination is replaced only when every fetch and write succeeded.
pub fn run_export<S: ExportSource + ?Sized>(
    source: &mut S,
    config: &ExportConfig,
) -> Result<ExportReport, ExportError> {
    tracing::info!(statuses = ?config.filter.statuses, "fetching parent records");
    let parents = source.list_parents(&config.filter, config.page_size)?;
    tracing::info!(count = parents.len(), "fetched parent records");

    let layout = RowLayout {
        tags: source.tags(),
        parent_schema: config.parent_schema.clone(),
        child_schema: config.child_schema.clone(),
    };

    let mut sink = CsvSink::create(&config.destination)?;
    let mut resolver =
        ChildResolver::new(source, config.child_filter, config.url_strategy, config.page_size);
    let summary = emit(sink.writer_mut(), &layout, &parents, &mut resolver)?;
    let path = sink.finish()?;

    tracing::info!(
        parents = summary.parents,
        children = summary.children,
        rows = summary.rows,
        path = %path.display(),
        "export complete"
    );
    Ok(ExportReport { path, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChildKind, ChildRecord, ParentRecord, Record, RowTags, Thread};
    use crate::source::FetchError;
    use std::fs;
    use tempfile::TempDir;

    /// Source over fixed data that records the calls made against it.
    struct FixtureSource {
        parents: Vec<ParentRecord>,
        threads: Vec<(i64, Vec<Thread>)>,
        fail_threads_for: Option<i64>,
        calls: Vec<String>,
    }

    impl ExportSource for FixtureSource {
        fn tags(&self) -> RowTags {
            RowTags::GITLAB
        }

        fn list_parents(
            &mut self,
            _filter: &ParentFilter,
            _page_size: usize,
        ) -> Result<Vec<ParentRecord>, FetchError> {
            self.calls.push("parents".to_string());
            Ok(self.parents.clone())
        }

        fn list_threads(
            &mut self,
            parent: &ParentRecord,
            _page_size: usize,
        ) -> Result<Vec<Thread>, FetchError> {
            self.calls.push(format!("threads:{}", parent.id));
            if self.fail_threads_for == Some(parent.id) {
                return Err(FetchError::Status { status: 500, url: "fixture".to_string() });
            }
            Ok(self
                .threads
                .iter()
                .find(|(id, _)| *id == parent.id)
                .map(|(_, t)| t.clone())
                .unwrap_or_default())
        }
    }

    fn note(id: i64, parent_id: i64, kind: ChildKind, body: &str) -> ChildRecord {
        ChildRecord {
            id,
            parent_id,
            kind,
            self_link: None,
            parent_link: Some(format!("https://gitlab.example/mr/{parent_id}#note_{id}")),
            record: Record::new().with("id", id).with("body", body),
        }
    }

    fn fixture() -> FixtureSource {
        let mr = |id: i64, title: &str| ParentRecord {
            id,
            web_url: Some(format!("https://gitlab.example/mr/{id}")),
            record: Record::new().with("iid", id).with("title", title),
        };
        FixtureSource {
            parents: vec![mr(1, "A"), mr(2, "B")],
            threads: vec![(
                2,
                vec![
                    Thread { id: None, comments: vec![note(10, 2, ChildKind::Text, "hi")] },
                    Thread { id: None, comments: vec![note(11, 2, ChildKind::System, "merged")] },
                ],
            )],
            fail_threads_for: None,
            calls: Vec::new(),
        }
    }

    fn config(dest: PathBuf, child_filter: ChildFilter) -> ExportConfig {
        ExportConfig {
            filter: ParentFilter::default(),
            parent_schema: Schema::new("parent", ["iid", "title"]).expect("schema"),
            child_schema: Schema::new("child", ["id", "body", "url"]).expect("schema"),
            child_filter,
            url_strategy: UrlStrategy::ParentUrl,
            page_size: DEFAULT_PAGE_SIZE,
            destination: dest,
        }
    }

    #[test]
    fn export_streams_children_after_each_parent() {
        let tmp = TempDir::new().expect("tmp");
        let dest = tmp.path().join("mrs.csv");
        let mut source = fixture();

        let report =
            run_export(&mut source, &config(dest.clone(), ChildFilter::TextOnly)).expect("export");

        assert_eq!(source.calls, vec!["parents", "threads:1", "threads:2"]);
        let content = fs::read_to_string(&dest).expect("read");
        similar_asserts::assert_eq!(
            content.lines().collect::<Vec<_>>(),
            vec![
                "object,iid,title",
                "merge_request,1,A",
                "merge_request,2,B",
                "object,id,body,url",
                "note,10,hi,https://gitlab.example/mr/2#note_10",
            ]
        );
        assert_eq!(report.summary.rows, 5);
        assert_eq!(report.path, dest);
    }

    #[test]
    fn including_system_children_adds_rows() {
        let tmp = TempDir::new().expect("tmp");
        let dest = tmp.path().join("mrs.csv");
        let report = run_export(&mut fixture(), &config(dest, ChildFilter::All)).expect("export");
        assert_eq!(report.summary.children, 2);
        assert_eq!(report.summary.rows, 1 + 2 + 1 + 2);
    }

    #[test]
    fn fetch_failure_keeps_previous_output() {
        let tmp = TempDir::new().expect("tmp");
        let dest = tmp.path().join("mrs.csv");
        fs::write(&dest, "last good run\n").expect("seed");
        let mut source = fixture();
        source.fail_threads_for = Some(2);

        let err = run_export(&mut source, &config(dest.clone(), ChildFilter::All)).unwrap_err();

        assert!(matches!(err, ExportError::Fetch(_)));
        assert_eq!(fs::read_to_string(&dest).expect("read"), "last good run\n");
        assert_eq!(fs::read_dir(tmp.path()).expect("dir").count(), 1);
    }
}
