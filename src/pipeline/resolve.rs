//! Per-parent child resolution: flatten threads, pick URLs, filter.

use crate::domain::{ChildFilter, ChildKind, ChildRecord, ParentRecord, Thread, UrlStrategy};
use crate::source::{ExportSource, FetchError};

/// Anything that can list the children of an already-written parent.
pub trait ResolveChildren {
    fn children_of(&mut self, parent: &ParentRecord) -> Result<Vec<ChildRecord>, FetchError>;
}

impl<F> ResolveChildren for F
where
    F: FnMut(&ParentRecord) -> Result<Vec<ChildRecord>, FetchError>,
{
    fn children_of(&mut self, parent: &ParentRecord) -> Result<Vec<ChildRecord>, FetchError> {
        self(parent)
    }
}

/// Resolves children through an [`ExportSource`], one parent at a time.
pub struct ChildResolver<'a, S: ExportSource + ?Sized> {
    source: &'a mut S,
    filter: ChildFilter,
    urls: UrlStrategy,
    page_size: usize,
}

impl<'a, S: ExportSource + ?Sized> ChildResolver<'a, S> {
    pub fn new(
        source: &'a mut S,
        filter: ChildFilter,
        urls: UrlStrategy,
        page_size: usize,
    ) -> Self {
        Self { source, filter, urls, page_size }
    }
}

impl<S: ExportSource + ?Sized> ResolveChildren for ChildResolver<'_, S> {
    fn children_of(&mut self, parent: &ParentRecord) -> Result<Vec<ChildRecord>, FetchError> {
        let threads = self.source.list_threads(parent, self.page_size)?;
        let children = flatten_threads(parent, threads, self.filter, self.urls);
        tracing::debug!(parent = parent.id, children = children.len(), "resolved children");
        Ok(children)
    }
}

/// Flatten `threads` into one sequence, keeping thread order and the order
/// of comments within each thread, then apply the URL strategy and filter.
pub fn flatten_threads(
    parent: &ParentRecord,
    threads: Vec<Thread>,
    filter: ChildFilter,
    urls: UrlStrategy,
) -> Vec<ChildRecord> {
    threads
        .into_iter()
        .flat_map(|thread| thread.comments)
        .filter(|child| {
            if child.parent_id != parent.id {
                tracing::warn!(
                    child = child.id,
                    parent = parent.id,
                    "dropping child of a different parent"
                );
                return false;
            }
            keep(child, filter)
        })
        .map(|mut child| {
            let url = choose_url(&child, urls);
            child.record.insert("url", url);
            child
        })
        .collect()
}

fn keep(child: &ChildRecord, filter: ChildFilter) -> bool {
    match filter {
        ChildFilter::All => true,
        ChildFilter::TextOnly => child.kind == ChildKind::Text,
    }
}

/// Preferred URL for the strategy, falling back to the other one.
fn choose_url(child: &ChildRecord, urls: UrlStrategy) -> Option<String> {
    let (first, second) = match urls {
        UrlStrategy::SelfLink => (&child.self_link, &child.parent_link),
        UrlStrategy::ParentUrl => (&child.parent_link, &child.self_link),
    };
    first.clone().or_else(|| second.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Record;

    fn parent(id: i64) -> ParentRecord {
        ParentRecord { id, web_url: None, record: Record::new().with("id", id) }
    }

    fn child(id: i64, parent_id: i64, kind: ChildKind) -> ChildRecord {
        ChildRecord {
            id,
            parent_id,
            kind,
            self_link: Some(format!("https://api.example/comments/{id}")),
            parent_link: Some(format!("https://example/pr/{parent_id}#c{id}")),
            record: Record::new().with("id", id),
        }
    }

    fn ids(children: &[ChildRecord]) -> Vec<i64> {
        children.iter().map(|c| c.id).collect()
    }

    fn threads() -> Vec<Thread> {
        vec![
            Thread {
                id: Some("t1".to_string()),
                comments: vec![child(3, 1, ChildKind::Text), child(1, 1, ChildKind::System)],
            },
            Thread { id: Some("t2".to_string()), comments: vec![] },
            Thread {
                id: Some("t3".to_string()),
                comments: vec![child(2, 1, ChildKind::Text), child(5, 1, ChildKind::Text)],
            },
        ]
    }

    #[test]
    fn flattening_preserves_inter_and_intra_thread_order() {
        let all = flatten_threads(&parent(1), threads(), ChildFilter::All, UrlStrategy::SelfLink);
        assert_eq!(ids(&all), vec![3, 1, 2, 5]);
    }

    #[test]
    fn text_only_drops_system_children() {
        let text =
            flatten_threads(&parent(1), threads(), ChildFilter::TextOnly, UrlStrategy::SelfLink);
        assert_eq!(ids(&text), vec![3, 2, 5]);
    }

    #[test]
    fn filtering_is_deterministic() {
        let first =
            flatten_threads(&parent(1), threads(), ChildFilter::TextOnly, UrlStrategy::SelfLink);
        let second =
            flatten_threads(&parent(1), threads(), ChildFilter::TextOnly, UrlStrategy::SelfLink);
        assert_eq!(first, second);
    }

    #[test]
    fn url_strategy_selects_cell_with_fallback() {
        let mut no_self = child(9, 1, ChildKind::Text);
        no_self.self_link = None;
        let input =
            vec![Thread { id: None, comments: vec![child(8, 1, ChildKind::Text), no_self] }];

        let by_self =
            flatten_threads(&parent(1), input.clone(), ChildFilter::All, UrlStrategy::SelfLink);
        assert_eq!(by_self[0].record.text("url"), Some("https://api.example/comments/8"));
        assert_eq!(by_self[1].record.text("url"), Some("https://example/pr/1#c9"));

        let by_parent =
            flatten_threads(&parent(1), input, ChildFilter::All, UrlStrategy::ParentUrl);
        assert_eq!(by_parent[0].record.text("url"), Some("https://example/pr/1#c8"));
    }

    #[test]
    fn children_of_other_parents_are_dropped() {
        let input = vec![Thread {
            id: None,
            comments: vec![child(1, 1, ChildKind::Text), child(2, 99, ChildKind::Text)],
        }];
        let kept = flatten_threads(&parent(1), input, ChildFilter::All, UrlStrategy::SelfLink);
        assert_eq!(ids(&kept), vec![1]);
    }
}
