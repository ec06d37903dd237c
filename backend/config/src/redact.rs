//! Produce safe-to-log config snapshots by masking secrets.

use serde_json::Value;

static SENSITIVE_KEYS: &[&str] = &[
    "apiKey",
    "api_key",
    "apikey",
    "token",
    "secret",
    "password",
];

const MASK: &str = "***";

/// Redact a config JSON value, replacing every sensitive string with `"***"`.
pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => {
            Value::String(MASK.to_string())
        }
        Value::Array(arr) => Value::Array(arr.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_recursive(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}
