//! Deterministic fingerprints of handler calls.
//!
//! A fingerprint is the SHA-256 digest of the handler identity and the
//! canonical text of its (filtered) arguments, truncated to 128 bits and hex
//! encoded. The canonical text is produced by a dedicated writer rather than
//! `serde_json::to_string`, so object key order never depends on which
//! `serde_json` features happen to be enabled in the final build.
//!
//! ```text
//! identity \0 {"named":{"limit":10},"positional":[42]}
//!          └────────── sha256 ──────────┘ -> first 16 bytes -> 32 hex chars
//! ```

use crate::arguments::{ArgumentSet, ExclusionSet};
use crate::errors::KeyError;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Length of a fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 32;

/// Derives the local key for a call.
///
/// Excluded arguments are removed first, so two calls differing only in an
/// excluded argument always share a fingerprint.
pub fn fingerprint(
    identity: &str,
    args: &ArgumentSet,
    excluded: &ExclusionSet,
) -> Result<String, KeyError> {
    let filtered = args.without(excluded);
    let canonical = canonicalize(&filtered)?;
    Ok(digest(identity, &canonical))
}

/// Renders an argument set as canonical JSON text.
///
/// Fails with [`KeyError::Unserializable`] when any remaining argument could
/// not be converted to a JSON value.
pub fn canonicalize(args: &ArgumentSet) -> Result<String, KeyError> {
    let mut out = String::with_capacity(64);

    out.push_str("{\"named\":{");
    for (i, (name, arg)) in args.named_args().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let value = arg.value().map_err(|message| KeyError::Unserializable {
            argument: name.to_string(),
            message: message.to_string(),
        })?;
        push_string(&mut out, name);
        out.push(':');
        write_value(&mut out, value);
    }

    out.push_str("},\"positional\":[");
    for (i, arg) in args.positional_args().enumerate() {
        if i > 0 {
            out.push(',');
        }
        let value = arg.value().map_err(|message| KeyError::Unserializable {
            argument: arg
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{i}")),
            message: message.to_string(),
        })?;
        write_value(&mut out, value);
    }
    out.push_str("]}");

    Ok(out)
}

fn digest(identity: &str, canonical: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.as_bytes());
    hasher.update([0u8]);
    hasher.update(canonical.as_bytes());
    let hash = hasher.finalize();
    hex::encode(&hash[..FINGERPRINT_LEN / 2])
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => push_string(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                push_string(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

/// Writes `s` as a JSON string literal.
fn push_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}
