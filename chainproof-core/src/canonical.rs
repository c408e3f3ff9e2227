//! Canonical JSON hashing
//!
//! The notarizer and the verifier must compute identical digests from the
//! same semantic content, so hashing runs over an RFC 8785-style canonical
//! form: object keys sorted by UTF-16 code unit, no insignificant
//! whitespace, serde_json number formatting.

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::{VerifyError, VerifyResult};

/// Hash a JSON document's content into a lowercase hex SHA-256 digest.
///
/// Documents that differ only in key order, whitespace, or numeric literal
/// formatting that round-trips to the same value produce the same digest.
pub fn hash_content(content: &str) -> VerifyResult<String> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| VerifyError::MalformedContent(e.to_string()))?;

    let canonical = canonicalize(&value);
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Serialize a JSON value into its canonical text form.
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::Number(n) => write_number(n, out),
        Value::String(s) => write_escaped(s, out),
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
            // Sort keys by UTF-16 code units (RFC 8785 §3.2.3)
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|(a, _), (b, _)| {
                a.encode_utf16().cmp(b.encode_utf16())
            });

            out.push('{');
            for (i, (key, val)) in entries.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_escaped(key, out);
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        }
    }
}

/// Fold whole-valued floats into integers so `2` and `2.0` canonicalize
/// identically (RFC 8785 number behavior).
///
/// Only |value| <= 2^53 converts losslessly (f64 mantissa is 52 bits);
/// anything else keeps serde_json's own formatting.
fn write_number(n: &serde_json::Number, out: &mut String) {
    const MAX_SAFE_INT: f64 = (1_i64 << 53) as f64;

    if let Some(f) = n.as_f64()
        && f.fract() == 0.0
        && f.abs() <= MAX_SAFE_INT
    {
        out.push_str(&(f as i64).to_string());
        return;
    }
    out.push_str(&n.to_string());
}

/// JSON string escaping: short forms for the usual control characters,
/// `\u00XX` for the rest, everything else verbatim.
fn write_escaped(s: &str, out: &mut String) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{0008}' => out.push_str("\\b"),
            '\u{000C}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
