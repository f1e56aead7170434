//! JSON inventory normalization.
//!
//! Accepted shapes, all normalized to one flat row per entry:
//!
//! - a list of objects;
//! - an AboutCode Manager export (`aboutcode_manager_notice` + `components`);
//! - a ScanCode scan (`scancode_notice` + `files`);
//! - a mapping of mappings keyed by path or id;
//! - a single flat object.
//!
//! For a mapping of mappings, the outer key becomes `about_resource` only when
//! the entry does not carry its own `about_resource`: inner keys always win.

use super::Row;
use crate::error::{AboutError, InventoryErrorKind, Result};
use crate::model::fields::ABOUT_RESOURCE;
use serde_json::{Map, Value};

/// Normalize a parsed JSON document into inventory rows.
pub fn rows_from_value(value: Value) -> Result<Vec<Row>> {
    match value {
        Value::Array(items) => items.into_iter().map(row_from_entry).collect(),
        Value::Object(mut object) => {
            if object.contains_key("aboutcode_manager_notice") {
                return wrapped_list(&mut object, "components");
            }
            if object.contains_key("scancode_notice") {
                return wrapped_list(&mut object, "files");
            }
            if !object.is_empty() && object.values().all(Value::is_object) {
                return Ok(object
                    .into_iter()
                    .map(|(key, entry)| keyed_row(key, entry))
                    .collect());
            }
            Ok(vec![flatten(object)])
        }
        other => Err(AboutError::inventory(
            "JSON inventory",
            InventoryErrorKind::InvalidStructure(format!(
                "expected a list or an object, found {}",
                value_kind(&other)
            )),
        )),
    }
}

fn wrapped_list(object: &mut Map<String, Value>, field: &str) -> Result<Vec<Row>> {
    match object.remove(field) {
        Some(Value::Array(items)) => items.into_iter().map(row_from_entry).collect(),
        Some(other) => Err(AboutError::inventory(
            "JSON inventory",
            InventoryErrorKind::InvalidStructure(format!(
                "\"{field}\" must be a list, found {}",
                value_kind(&other)
            )),
        )),
        None => Ok(Vec::new()),
    }
}

fn row_from_entry(entry: Value) -> Result<Row> {
    match entry {
        Value::Object(object) => Ok(flatten(object)),
        other => Err(AboutError::inventory(
            "JSON inventory",
            InventoryErrorKind::InvalidStructure(format!(
                "inventory entries must be objects, found {}",
                value_kind(&other)
            )),
        )),
    }
}

fn keyed_row(key: String, entry: Value) -> Row {
    let Value::Object(object) = entry else {
        return Row::new();
    };
    let inner = flatten(object);
    if inner.contains_key(ABOUT_RESOURCE) {
        return inner;
    }
    let mut row = Row::with_capacity(inner.len() + 1);
    row.insert(ABOUT_RESOURCE.to_string(), key);
    row.extend(inner);
    row
}

fn flatten(object: Map<String, Value>) -> Row {
    object
        .into_iter()
        .map(|(key, value)| (key, value_to_text(value)))
        .collect()
}

/// Convert a JSON value to the text form used by inventory rows.
pub fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(true) => "yes".to_string(),
        Value::Bool(false) => "no".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s,
        Value::Array(items) if items.iter().all(Value::is_string) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keys(row: &Row) -> Vec<&str> {
        row.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_list_of_objects() {
        let rows = rows_from_value(json!([
            {"about_resource": "a.zip", "name": "a"},
            {"about_resource": "b.zip", "name": "b", "extra": "kept"}
        ]))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(keys(&rows[1]), vec!["about_resource", "name", "extra"]);
    }

    #[test]
    fn test_wrapped_exports() {
        let rows = rows_from_value(json!({
            "aboutcode_manager_notice": "x",
            "components": [{"about_resource": "c", "license_expression": "mit"}]
        }))
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["license_expression"], "mit");

        let rows = rows_from_value(json!({
            "scancode_notice": "x",
            "files": [{"about_resource": "f"}, {"about_resource": "g"}]
        }))
        .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_mapping_of_mappings_inner_key_wins() {
        let rows = rows_from_value(json!({
            "lib/a.zip": {"name": "a"},
            "lib/b.zip": {"name": "b", "about_resource": "other/b.zip"}
        }))
        .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(keys(&rows[0]), vec!["about_resource", "name"]);
        assert_eq!(rows[0]["about_resource"], "lib/a.zip");
        assert_eq!(rows[1]["about_resource"], "other/b.zip");
    }

    #[test]
    fn test_single_flat_object() {
        let rows = rows_from_value(json!({
            "about_resource": ".",
            "name": "x",
            "nested": {"k": 1}
        }))
        .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["nested"], "{\"k\":1}");
    }

    #[test]
    fn test_value_conversion() {
        assert_eq!(value_to_text(json!(null)), "");
        assert_eq!(value_to_text(json!(true)), "yes");
        assert_eq!(value_to_text(json!(1.5)), "1.5");
        assert_eq!(value_to_text(json!(["a", "b"])), "a\nb");
        assert_eq!(value_to_text(json!([1, "b"])), "[1,\"b\"]");
    }

    #[test]
    fn test_invalid_shapes() {
        assert!(rows_from_value(json!("just a string")).is_err());
        assert!(rows_from_value(json!([1, 2])).is_err());
        assert!(rows_from_value(json!({"scancode_notice": "x", "files": {}})).is_err());
    }
}
