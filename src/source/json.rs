//! Helpers for pulling fields out of API JSON.

use serde_json::Value;

use crate::domain::FieldValue;

/// Value at a JSON pointer (`/createdBy/uniqueName`), `Null` when absent.
pub fn field_at(value: &Value, pointer: &str) -> FieldValue {
    value.pointer(pointer).map(FieldValue::from_json).unwrap_or(FieldValue::Null)
}

pub fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

pub fn int_at(value: &Value, pointer: &str) -> Option<i64> {
    value.pointer(pointer).and_then(Value::as_i64)
}

/// Items of a JSON array, or `None` when `value` is not an array.
pub fn array_items(value: Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        _ => None,
    }
}
