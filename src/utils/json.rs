//! JSON helpers: pointer edits for config files and order-insensitive
//! structural comparison for policy documents.

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Set the value at an RFC 6901 pointer, creating intermediate objects.
pub fn set_json_pointer(root: &mut Value, pointer: &str, new_value: Value) -> Result<()> {
    let tokens = pointer_tokens(pointer)?;
    let Some((last, parents)) = tokens.split_last() else {
        *root = new_value;
        return Ok(());
    };

    let mut current = root;
    for token in parents {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .map(|obj| obj.entry(token.clone()).or_insert(Value::Object(Map::new())))
            .ok_or_else(|| Error::internal_unexpected("pointer parent is not an object"))?;
    }

    match current {
        Value::Object(obj) => {
            obj.insert(last.clone(), new_value);
            Ok(())
        }
        _ => Err(Error::validation_invalid_argument(
            "pointer",
            format!("Cannot set '{}' on a non-object value", pointer),
            None,
            None,
        )),
    }
}

/// Remove the value at an RFC 6901 pointer.
pub fn remove_json_pointer(root: &mut Value, pointer: &str) -> Result<()> {
    let tokens = pointer_tokens(pointer)?;
    let Some((last, parents)) = tokens.split_last() else {
        return Err(Error::validation_invalid_argument(
            "pointer",
            "Cannot remove the root JSON value",
            None,
            None,
        ));
    };

    let parent_pointer: String = parents
        .iter()
        .map(|t| format!("/{}", t.replace('~', "~0").replace('/', "~1")))
        .collect();

    let removed = root
        .pointer_mut(&parent_pointer)
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.remove(last));

    match removed {
        Some(_) => Ok(()),
        None => Err(Error::validation_invalid_argument(
            "pointer",
            format!("JSON pointer path not found: {}", pointer),
            None,
            None,
        )),
    }
}

fn pointer_tokens(pointer: &str) -> Result<Vec<String>> {
    if pointer.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = pointer.strip_prefix('/') else {
        return Err(Error::validation_invalid_argument(
            "pointer",
            "JSON pointer must start with '/'",
            None,
            None,
        ));
    };
    Ok(rest
        .split('/')
        .map(|t| t.replace("~1", "/").replace("~0", "~"))
        .collect())
}

/// Canonical form of a JSON value: object keys sorted and arrays sorted by
/// the serialization of their (canonical) elements, recursively.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(obj) => {
            let mut sorted: Vec<(&String, &Value)> = obj.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k.clone(), canonicalize(v));
            }
            Value::Object(out)
        }
        Value::Array(items) => {
            let mut canon: Vec<Value> = items.iter().map(canonicalize).collect();
            canon.sort_by_key(|v| v.to_string());
            Value::Array(canon)
        }
        other => other.clone(),
    }
}

/// Structural equality ignoring key order and array order.
pub fn structurally_equal(a: &Value, b: &Value) -> bool {
    canonicalize(a).to_string() == canonicalize(b).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_pointer_creates_intermediate_objects() {
        let mut root = json!({});
        set_json_pointer(&mut root, "/defaults/polling/delaySeconds", json!(1)).unwrap();
        assert_eq!(root, json!({"defaults": {"polling": {"delaySeconds": 1}}}));
    }

    #[test]
    fn set_pointer_requires_leading_slash() {
        let mut root = json!({});
        assert!(set_json_pointer(&mut root, "defaults", json!(1)).is_err());
    }

    #[test]
    fn remove_pointer_deletes_key() {
        let mut root = json!({"defaults": {"branch": "dev", "commitBatchSize": 10}});
        remove_json_pointer(&mut root, "/defaults/branch").unwrap();
        assert_eq!(root, json!({"defaults": {"commitBatchSize": 10}}));
    }

    #[test]
    fn remove_missing_pointer_fails() {
        let mut root = json!({"defaults": {}});
        assert!(remove_json_pointer(&mut root, "/defaults/branch").is_err());
    }

    #[test]
    fn structural_equality_ignores_order() {
        let a = json!({
            "Effect": "Allow",
            "Principal": {"Service": ["glue.amazonaws.com", "datazone.amazonaws.com"]},
            "Action": ["sts:AssumeRole", "sts:TagSession"]
        });
        let b = json!({
            "Action": ["sts:TagSession", "sts:AssumeRole"],
            "Principal": {"Service": ["datazone.amazonaws.com", "glue.amazonaws.com"]},
            "Effect": "Allow"
        });
        assert!(structurally_equal(&a, &b));
    }

    #[test]
    fn structural_equality_detects_value_changes() {
        let a = json!({"Effect": "Allow", "Action": "sts:AssumeRole"});
        let b = json!({"Effect": "Deny", "Action": "sts:AssumeRole"});
        assert!(!structurally_equal(&a, &b));
    }
}
