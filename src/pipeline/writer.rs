//! Two-level row emission.
//!
//! Layout of the output:
//!
//! ```text
//! object,<parent fields...>
//! <parent tag>,<parent cells...>
//! object,<child fields...>          (only when the parent has children)
//! <child tag>,<child cells...>
//! ...
//! ```
//!
//! The child header is repeated for every parent that has children and
//! marks the start of that parent's nested block.

use csv::Writer;
use std::io::Write;

use super::project::tagged_row;
use super::resolve::ResolveChildren;
use super::ExportError;
use crate::domain::{ParentRecord, RowTags, Schema};

/// Counts gathered while emitting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub parents: usize,
    pub parents_with_children: usize,
    pub children: usize,
    pub rows: usize,
}

/// Column schemas and tags for one export.
#[derive(Debug, Clone)]
pub struct RowLayout {
    pub tags: RowTags,
    pub parent_schema: Schema,
    pub child_schema: Schema,
}

/// Write the global header, then each parent followed by its children.
///
/// Children are resolved immediately after their parent's row is written;
/// a resolution failure aborts the emission.
pub fn emit<W, R>(
    writer: &mut Writer<W>,
    layout: &RowLayout,
    parents: &[ParentRecord],
    resolver: &mut R,
) -> Result<EmitSummary, ExportError>
where
    W: Write,
    R: ResolveChildren + ?Sized,
{
    let mut summary = EmitSummary::default();

    writer.write_record(layout.parent_schema.header_row())?;
    summary.rows += 1;

    for parent in parents {
        writer.write_record(tagged_row(layout.tags.parent, &parent.record, &layout.parent_schema))?;
        summary.parents += 1;
        summary.rows += 1;

        let children = resolver.children_of(parent)?;
        if children.is_empty() {
            continue;
        }

        writer.write_record(layout.child_schema.header_row())?;
        summary.parents_with_children += 1;
        summary.rows += 1;

        for child in &children {
            writer.write_record(tagged_row(
                layout.tags.child,
                &child.record,
                &layout.child_schema,
            ))?;
            summary.children += 1;
            summary.rows += 1;
        }
    }

    writer.flush()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChildKind, ChildRecord, Record};
    use crate::source::FetchError;
    use csv::WriterBuilder;
    use std::collections::HashMap;

    const TAGS: RowTags = RowTags { parent: "parent_record", child: "child_record" };

    fn layout(parent: &[&str], child: &[&str]) -> RowLayout {
        RowLayout {
            tags: TAGS,
            parent_schema: Schema::new("parent", parent.iter().copied()).expect("schema"),
            child_schema: Schema::new("child", child.iter().copied()).expect("schema"),
        }
    }

    fn parent(id: i64, title: &str) -> ParentRecord {
        ParentRecord {
            id,
            web_url: None,
            record: Record::new().with("id", id).with("title", title),
        }
    }

    fn child(id: i64, parent_id: i64, body: &str) -> ChildRecord {
        ChildRecord {
            id,
            parent_id,
            kind: ChildKind::Text,
            self_link: None,
            parent_link: None,
            record: Record::new().with("id", id).with("body", body),
        }
    }

    fn run(
        layout: &RowLayout,
        parents: &[ParentRecord],
        children: HashMap<i64, Vec<ChildRecord>>,
    ) -> (EmitSummary, Vec<String>) {
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        let mut resolver = |p: &ParentRecord| -> Result<Vec<ChildRecord>, FetchError> {
            Ok(children.get(&p.id).cloned().unwrap_or_default())
        };
        let summary = emit(&mut writer, layout, parents, &mut resolver).expect("emit");
        let bytes = writer.into_inner().expect("into inner");
        let text = String::from_utf8(bytes).expect("utf8");
        (summary, text.lines().map(str::to_string).collect())
    }

    #[test]
    fn parent_without_children_gets_no_child_header() {
        let layout = layout(&["id", "title"], &["id", "body"]);
        let parents = vec![parent(1, "A"), parent(2, "B")];
        let children = HashMap::from([(2, vec![child(10, 2, "hi")])]);

        let (summary, lines) = run(&layout, &parents, children);

        similar_asserts::assert_eq!(
            lines,
            vec![
                "object,id,title",
                "parent_record,1,A",
                "parent_record,2,B",
                "object,id,body",
                "child_record,10,hi",
            ]
        );
        assert_eq!(summary.rows, 5);
    }

    #[test]
    fn child_header_repeats_per_parent_with_children() {
        let layout = layout(&["id"], &["body"]);
        let parents = vec![parent(1, "A"), parent(2, "B"), parent(3, "C")];
        let children = HashMap::from([
            (1, vec![child(10, 1, "x"), child(11, 1, "y")]),
            (3, vec![child(30, 3, "z")]),
        ]);

        let (summary, lines) = run(&layout, &parents, children);

        assert_eq!(lines.iter().filter(|l| *l == "object,body").count(), 2);
        assert_eq!(
            summary,
            EmitSummary { parents: 3, parents_with_children: 2, children: 3, rows: 1 + 3 + 2 + 3 }
        );
        assert_eq!(lines.len(), summary.rows);
    }

    #[test]
    fn empty_parent_list_writes_only_the_header() {
        let layout = layout(&["id"], &["body"]);
        let (summary, lines) = run(&layout, &[], HashMap::new());
        assert_eq!(lines, vec!["object,id"]);
        assert_eq!(summary.rows, 1);
    }

    #[test]
    fn cells_with_commas_and_newlines_are_quoted() {
        let layout = layout(&["title"], &["body"]);
        let parents = vec![parent(1, "fix, then test")];
        let children = HashMap::from([(1, vec![child(5, 1, "line one\nline two")])]);

        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        let mut resolver = |p: &ParentRecord| -> Result<Vec<ChildRecord>, FetchError> {
            Ok(children.get(&p.id).cloned().unwrap_or_default())
        };
        emit(&mut writer, &layout, &parents, &mut resolver).expect("emit");
        let text = String::from_utf8(writer.into_inner().expect("inner")).expect("utf8");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let rows: Vec<Vec<String>> = reader
            .records()
            .map(|r| r.expect("record").iter().map(str::to_string).collect())
            .collect();
        assert_eq!(rows[1], vec!["parent_record", "fix, then test"]);
        assert_eq!(rows[3], vec!["child_record", "line one\nline two"]);
    }

    #[test]
    fn resolver_failure_aborts_after_parent_row() {
        let layout = layout(&["id"], &["body"]);
        let parents = vec![parent(1, "A"), parent(2, "B")];
        let mut writer = WriterBuilder::new().flexible(true).from_writer(Vec::new());
        let mut calls = 0;
        let mut resolver = |_: &ParentRecord| -> Result<Vec<ChildRecord>, FetchError> {
            calls += 1;
            Err(FetchError::Status { status: 404, url: "https://example/threads".to_string() })
        };

        let err = emit(&mut writer, &layout, &parents, &mut resolver).unwrap_err();
        assert!(matches!(err, ExportError::Fetch(FetchError::Status { status: 404, .. })));
        assert_eq!(calls, 1);
    }
}
