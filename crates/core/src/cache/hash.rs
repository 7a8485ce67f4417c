//! Canonical fingerprints for cache keys.
//!
//! Values are first encoded as canonical JSON (object keys sorted at every
//! level, no whitespace) and the result is hashed with SHA-256. Two values that
//! serialize to the same JSON tree always share a key, whatever order their
//! fields or map entries were inserted in.

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::Error;

/// Compute the cache key for any serializable request description.
///
/// # Errors
///
/// Returns `Error::Serialization` if the value cannot be represented as JSON
/// (e.g. a map with non-string keys).
pub fn fingerprint<K: Serialize + ?Sized>(source: &K) -> Result<String, Error> {
    let value = serde_json::to_value(source)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(&value).as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Encode a JSON tree with recursively sorted object keys.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(s, out),
        Value::Array(items) => {
            out.push('[');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (idx, key) in keys.into_iter().enumerate() {
                if idx > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[key], out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // serializing a &str cannot fail
    out.push_str(&Value::String(s.to_owned()).to_string());
}
