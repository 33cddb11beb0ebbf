//! Deterministic query fingerprints.
//!
//! A fingerprint is the SHA-256 digest (lowercase hex, 64 chars) of a
//! canonical JSON document `{"api": <name>, "params": <params>}`. Object keys
//! are written in sorted order at every nesting level, so two parameter maps
//! that differ only in insertion order hash identically.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 64;

/// Build the fingerprint for `api` called with `params`.
///
/// Types are not coerced: `10` and `"10"` produce different fingerprints,
/// so callers must normalise parameters before fingerprinting.
pub fn make_key(api: &str, params: &Value) -> String {
    let mut canonical = String::with_capacity(64);
    canonical.push_str("{\"api\":");
    write_string(api, &mut canonical);
    canonical.push_str(",\"params\":");
    write_canonical(params, &mut canonical);
    canonical.push('}');

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Serialise `value` as compact JSON with object keys sorted.
///
/// Does not rely on the map ordering of `serde_json::Map`, which changes when
/// any crate in the graph enables `preserve_order`.
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
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
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
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
    }
}

fn write_string(s: &str, out: &mut String) {
    // Serialising a &str cannot fail.
    match serde_json::to_string(s) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => out.push_str(&format!("{s:?}")),
    }
}
