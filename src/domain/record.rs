//! Source-independent record representation.
//!
//! Every adapter converts its platform objects into [`Record`] maps so the
//! projector and writer never depend on a particular API shape.

use serde_json::Value;
use std::collections::BTreeMap;

/// A single field value as carried from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
}

impl FieldValue {
    /// Render the value as a CSV cell. `Null` renders as an empty string.
    pub fn to_cell(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(n) => n.to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Convert a JSON value taken verbatim from an API response.
    ///
    /// Nested arrays and objects are kept as their compact JSON text; adapters
    /// reduce the nested values they care about (authors, links) themselves.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Text(n.to_string()),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// Mapping from field name to value. Field order is irrelevant; output
/// order always comes from the projection schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<FieldValue>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_text)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }
}

/// A pull request or merge request.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentRecord {
    pub id: i64,
    /// Canonical (browser) URL, used when deriving child URLs.
    pub web_url: Option<String>,
    pub record: Record,
}

/// Whether a child was written by a person or generated by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    Text,
    System,
}

/// A comment or note attached to exactly one parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildRecord {
    pub id: i64,
    pub parent_id: i64,
    pub kind: ChildKind,
    /// API self-link for the comment, when the platform provides one.
    pub self_link: Option<String>,
    /// Browser URL derived from the parent URL plus a platform anchor.
    pub parent_link: Option<String>,
    pub record: Record,
}

/// An ordered group of children as returned by the source.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Thread {
    pub id: Option<String>,
    pub comments: Vec<ChildRecord>,
}
