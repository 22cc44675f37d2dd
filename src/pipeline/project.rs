//! Project a record onto a fixed, ordered field schema.

use crate::domain::{FieldValue, Record, Schema};

/// One cell per schema field, in schema order. Fields the record lacks
/// become empty cells; this never fails.
pub fn project(record: &Record, schema: &Schema) -> Vec<String> {
    schema
        .fields()
        .iter()
        .map(|field| record.get(field).map(FieldValue::to_cell).unwrap_or_default())
        .collect()
}

/// `[tag] + project(record, schema)`.
pub fn tagged_row(tag: &str, record: &Record, schema: &Schema) -> Vec<String> {
    let mut row = Vec::with_capacity(schema.len() + 1);
    row.push(tag.to_string());
    row.extend(project(record, schema));
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(fields: &[&str]) -> Schema {
        Schema::new("test", fields.iter().copied()).expect("schema")
    }

    #[test]
    fn output_follows_schema_order_not_record_order() {
        let record = Record::new().with("title", "Fix").with("id", 7i64).with("draft", false);
        assert_eq!(project(&record, &schema(&["draft", "id", "title"])), vec!["false", "7", "Fix"]);
    }

    #[test]
    fn missing_fields_project_to_empty_cells() {
        let record = Record::new().with("id", 1i64);
        assert_eq!(
            project(&record, &schema(&["missing", "id", "also_missing"])),
            vec!["", "1", ""]
        );
        assert_eq!(project(&Record::new(), &schema(&["a", "b"])), vec!["", ""]);
    }

    #[test]
    fn null_values_project_to_empty_cells() {
        let record = Record::new().with("closed_date", None::<String>);
        assert_eq!(project(&record, &schema(&["closed_date"])), vec![""]);
    }

    #[test]
    fn tagged_row_prefixes_the_tag() {
        let record = Record::new().with("id", 3i64);
        assert_eq!(tagged_row("note", &record, &schema(&["id"])), vec!["note", "3"]);
    }
}
