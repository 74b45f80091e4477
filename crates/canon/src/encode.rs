//! Deterministic byte encoding of payload values
//!
//! The encoder emits minimal JSON text with NFC-normalized strings and
//! byte-wise sorted object keys. See the crate docs for the full rule set.

use crate::error::CanonError;
use chronicle_core::Value;
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;

/// Default nesting-depth limit for payload trees
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Encode a value to its canonical byte representation
///
/// Equivalent to [`encode_with_depth`] with [`DEFAULT_MAX_DEPTH`].
pub fn encode(value: &Value) -> Result<Vec<u8>, CanonError> {
    encode_with_depth(value, DEFAULT_MAX_DEPTH)
}

/// Encode a value to its canonical byte representation, bounding recursion
///
/// Encoding the same logical value always yields byte-identical output,
/// regardless of map insertion order or the Unicode composition form of any
/// string in the tree.
pub fn encode_with_depth(value: &Value, max_depth: usize) -> Result<Vec<u8>, CanonError> {
    let mut out = String::new();
    let mut path = String::from("$");
    encode_value(value, &mut out, &mut path, 0, max_depth)?;
    Ok(out.into_bytes())
}

fn encode_value(
    value: &Value,
    out: &mut String,
    path: &mut String,
    depth: usize,
    max_depth: usize,
) -> Result<(), CanonError> {
    if depth > max_depth {
        return Err(CanonError::DepthExceeded {
            path: path.clone(),
            max: max_depth,
        });
    }

    match value {
        Value::Null => {
            out.push_str("null");
            Ok(())
        }
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Int(i) => {
            out.push_str(&i.to_string());
            Ok(())
        }
        Value::Float(_) => Err(CanonError::NumericPolicyViolation { path: path.clone() }),
        Value::String(s) => {
            encode_string(&normalize(s), out);
            Ok(())
        }
        Value::Array(items) => encode_array(items, out, path, depth, max_depth),
        Value::Object(map) => encode_object(map, out, path, depth, max_depth),
    }
}

fn encode_array(
    items: &[Value],
    out: &mut String,
    path: &mut String,
    depth: usize,
    max_depth: usize,
) -> Result<(), CanonError> {
    out.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let rollback = path.len();
        path.push_str(&format!("[{}]", i));
        encode_value(item, out, path, depth + 1, max_depth)?;
        path.truncate(rollback);
    }
    out.push(']');
    Ok(())
}

fn encode_object(
    map: &HashMap<String, Value>,
    out: &mut String,
    path: &mut String,
    depth: usize,
    max_depth: usize,
) -> Result<(), CanonError> {
    // Normalize keys first, drop null-valued entries, then sort by the
    // normalized bytes. Two raw keys collapsing to one normalized form would
    // make the output ambiguous, so that is rejected.
    let mut entries: Vec<(String, &Value)> = Vec::with_capacity(map.len());
    for (k, v) in map {
        if v.is_null() {
            continue;
        }
        entries.push((normalize(k), v));
    }
    entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

    for pair in entries.windows(2) {
        if pair[0].0 == pair[1].0 {
            return Err(CanonError::DuplicateKey {
                path: path.clone(),
                key: pair[0].0.clone(),
            });
        }
    }

    out.push('{');
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        encode_string(key, out);
        out.push(':');
        let rollback = path.len();
        path.push('.');
        path.push_str(key);
        encode_value(value, out, path, depth + 1, max_depth)?;
        path.truncate(rollback);
    }
    out.push('}');
    Ok(())
}

fn normalize(s: &str) -> String {
    s.nfc().collect()
}

/// Encode a string with minimal JSON escaping
fn encode_string(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
