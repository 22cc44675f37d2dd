//! Core data model: records, schemas, row tags and filters.

pub mod error;
pub mod filter;
pub mod record;

pub use error::ConfigError;
pub use filter::{
    parse_timestamp, validate_statuses, ChildFilter, ParentFilter, ParentStatus, TimeWindow,
    UrlStrategy,
};
pub use record::{ChildKind, ChildRecord, FieldValue, ParentRecord, Record, Thread};

/// Tag in column 0 of every header row.
pub const HEADER_TAG: &str = "object";

/// Ordered list of field names defining output columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<String>,
}

impl Schema {
    /// Build a schema; `level` names the record kind for the error message.
    pub fn new<I, S>(level: &'static str, fields: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields
            .into_iter()
            .map(Into::into)
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(ConfigError::EmptySchema(level));
        }
        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `["object"] + fields`.
    pub fn header_row(&self) -> Vec<String> {
        std::iter::once(HEADER_TAG.to_string()).chain(self.fields.iter().cloned()).collect()
    }
}

/// Column-0 tags that tell parent rows from child rows in a shared file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowTags {
    pub parent: &'static str,
    pub child: &'static str,
}

impl RowTags {
    pub const AZURE_DEVOPS: RowTags = RowTags { parent: "pull_request", child: "comment" };
    pub const GITLAB: RowTags = RowTags { parent: "merge_request", child: "note" };
}
