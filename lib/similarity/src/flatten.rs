//! Nested record flattening
//!
//! Turns `{"user": {"age": 30, "tags": ["a", "b"]}}` into
//! `{"user_age": 30, "user_tags_0": "a", "user_tags_1": "b"}` so nested
//! records can be trained and tested field by field.

use serde_json::{Map, Value};

/// Separator between the segments of a composite key
pub const KEY_SEPARATOR: char = '_';

/// Flatten a nested JSON value into a single-level map.
///
/// Objects and arrays are inlined recursively (array elements keyed by
/// index), scalars are copied under their composite key. Nulls and empty
/// containers contribute nothing. When two paths produce the same key the
/// one visited last wins. A scalar at the top level yields an empty map.
pub fn flatten(value: &Value) -> Map<String, Value> {
    let mut target = Map::new();
    flatten_into(value, None, &mut target);
    target
}

fn flatten_into(value: &Value, prefix: Option<&str>, target: &mut Map<String, Value>) {
    match value {
        Value::Object(entries) => {
            for (key, child) in entries {
                descend(child, join(prefix, key), target);
            }
        }
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                descend(child, join(prefix, &index.to_string()), target);
            }
        }
        _ => {}
    }
}

fn descend(value: &Value, key: String, target: &mut Map<String, Value>) {
    match value {
        Value::Object(_) | Value::Array(_) => flatten_into(value, Some(&key), target),
        Value::Null => {}
        scalar => {
            target.insert(key, scalar.clone());
        }
    }
}

fn join(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}{}{}", prefix, KEY_SEPARATOR, key),
        None => key.to_string(),
    }
}
