use serde_json::{Map, Value};

/// Recursive equality over two JSON values under the crate's normalization
/// policy (see the crate docs).
///
/// # Examples
///
/// ```
/// use multiedit_equal::deep_equal;
/// use serde_json::json;
///
/// assert!(deep_equal(&json!({"a": null}), &json!({})));
/// assert!(!deep_equal(&json!({"a": ""}), &json!({})));
/// assert!(!deep_equal(&json!(1), &json!(1.0)));
/// ```
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,

        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| deep_equal(x, y))
        }

        (Value::Object(a), Value::Object(b)) => object_equal(a, b),

        // Different types are never equal.
        _ => false,
    }
}

/// Equality over two records, comparing the union of their keys.
///
/// A key present on only one side compares against `null`, so a record that
/// spells an empty field as `null` equals one that omits the key entirely.
pub fn object_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    for (key, val_a) in a {
        let val_b = b.get(key).unwrap_or(&Value::Null);
        if !deep_equal(val_a, val_b) {
            return false;
        }
    }
    for (key, val_b) in b {
        if !a.contains_key(key) && !deep_equal(&Value::Null, val_b) {
            return false;
        }
    }
    true
}
