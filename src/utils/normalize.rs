//! List-field normalization
//!
//! Generation output is schema-inconsistent: a field meant to hold a list of
//! strings may hold objects, numbers, or a bare string. These helpers coerce such
//! fields to `Vec<String>` and never fail.

use crate::types::Document;
use serde_json::Value;

/// Key whose value stands in for an object element.
const DESCRIPTION_KEY: &str = "description";

/// Normalize a sequence of arbitrary values into strings, preserving order.
pub fn normalize(items: &[Value]) -> Vec<String> {
    items.iter().map(element_to_string).collect()
}

fn element_to_string(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(map) => match map.get(DESCRIPTION_KEY) {
            Some(Value::String(description)) => description.clone(),
            Some(other) => other.to_string(),
            None => item.to_string(),
        },
        other => other.to_string(),
    }
}

/// Normalize an arbitrary field value into a string list.
///
/// A missing or null value becomes an empty list; a non-list value becomes a
/// one-element list.
pub fn normalize_value(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => normalize(items),
        Some(other) => vec![element_to_string(other)],
    }
}

/// Normalize `doc[key]` in place, inserting an empty list when absent.
pub fn normalize_field(doc: &mut Document, key: &str) {
    let normalized = normalize_value(doc.get(key));
    doc.insert(
        key.to_string(),
        Value::Array(normalized.into_iter().map(Value::String).collect()),
    );
}
