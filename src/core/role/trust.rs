use serde_json::Value;

use crate::json::structurally_equal;

/// Statements of a policy document. A lone statement object counts as a
/// one-element list.
pub fn statements(policy: &Value) -> Vec<Value> {
    match policy.get("Statement") {
        Some(Value::Array(items)) => items.clone(),
        Some(single @ Value::Object(_)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

/// `base` plus every statement of `extra` not already present (compared
/// structurally, ignoring key and array order).
pub fn combine_trust_policies(base: &Value, extra: &Value) -> Value {
    let mut combined = base.clone();
    let mut merged = statements(base);

    for statement in statements(extra) {
        if !merged.iter().any(|existing| structurally_equal(existing, &statement)) {
            merged.push(statement);
        }
    }

    if let Some(doc) = combined.as_object_mut() {
        doc.insert("Statement".to_string(), Value::Array(merged));
    } else {
        combined = serde_json::json!({ "Version": "2012-10-17", "Statement": merged });
    }
    combined
}
