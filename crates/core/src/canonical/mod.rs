//! Deterministic canonical JSON encoding.
//!
//! Every content-addressed identity in the engine is derived from the byte
//! sequence produced here. The encoder knows nothing about game semantics;
//! it maps any `serde_json::Value` to exactly one byte representation:
//!
//! - map keys in lexicographic order by Unicode code point
//! - no insignificant whitespace
//! - integers without leading zeros or decimal point
//! - floats in their shortest round-trippable decimal form, always with a
//!   fractional digit
//! - strings as UTF-8 with only the minimal required escapes
//! - explicit `null` for present-but-null fields
//! - lowercase `true`/`false`

mod hash;

pub use hash::{content_hash, normalized, state_hash};

use serde::Serialize;
use serde_json::Value;

/// Failure to produce canonical bytes. Indicates a caller bug (e.g. a
/// non-finite float smuggled into a payload), never a transient condition.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("non-finite float cannot be canonically encoded")]
    NonFiniteFloat,

    #[error("value is not representable as canonical JSON: {0}")]
    Unrepresentable(String),
}

/// Encodes a JSON value into its unique canonical byte sequence.
pub fn encode(value: &Value) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::with_capacity(128);
    write_value(&mut out, value)?;
    Ok(out)
}

/// Serializes any value and encodes it canonically in one step.
pub fn to_canonical_json<T: Serialize>(value: &T) -> Result<Vec<u8>, EncodeError> {
    let json =
        serde_json::to_value(value).map_err(|e| EncodeError::Unrepresentable(e.to_string()))?;
    encode(&json)
}

fn write_value(out: &mut Vec<u8>, value: &Value) -> Result<(), EncodeError> {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => write_number(out, n)?,
        Value::String(s) => write_string(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_value(out, item)?;
            }
            out.push(b']');
        }
        Value::Object(map) => {
            // String ordering over UTF-8 bytes is code-point order, which is
            // exactly the key ordering the canonical form requires.
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort_unstable();
            out.push(b'{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                write_string(out, key);
                out.push(b':');
                write_value(out, &map[key])?;
            }
            out.push(b'}');
        }
    }
    Ok(())
}

fn write_number(out: &mut Vec<u8>, n: &serde_json::Number) -> Result<(), EncodeError> {
    if let Some(i) = n.as_i64() {
        out.extend_from_slice(i.to_string().as_bytes());
    } else if let Some(u) = n.as_u64() {
        out.extend_from_slice(u.to_string().as_bytes());
    } else {
        let f = n.as_f64().ok_or(EncodeError::NonFiniteFloat)?;
        out.extend_from_slice(format_float(f)?.as_bytes());
    }
    Ok(())
}

/// Shortest round-trippable decimal with at least one fractional digit.
fn format_float(f: f64) -> Result<String, EncodeError> {
    if !f.is_finite() {
        return Err(EncodeError::NonFiniteFloat);
    }
    // Rust's Debug formatting for floats is the shortest representation that
    // parses back to the same value, and renders integral values as "1.0".
    // Exponent forms like "1e300" carry no fractional digit, so one is
    // reinstated before the exponent.
    let mut repr = format!("{f:?}");
    match repr.find('e') {
        Some(pos) if !repr[..pos].contains('.') => repr.insert_str(pos, ".0"),
        None if !repr.contains('.') => repr.push_str(".0"),
        _ => {}
    }
    Ok(repr)
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    for c in s.chars() {
        match c {
            '"' => out.extend_from_slice(b"\\\""),
            '\\' => out.extend_from_slice(b"\\\\"),
            '\u{0008}' => out.extend_from_slice(b"\\b"),
            '\t' => out.extend_from_slice(b"\\t"),
            '\n' => out.extend_from_slice(b"\\n"),
            '\u{000C}' => out.extend_from_slice(b"\\f"),
            '\r' => out.extend_from_slice(b"\\r"),
            c if (c as u32) < 0x20 => {
                let escaped = format!("\\u{:04x}", c as u32);
                out.extend_from_slice(escaped.as_bytes());
            }
            c => {
                let mut buf = [0u8; 4];
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            }
        }
    }
    out.push(b'"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encoded(value: &Value) -> String {
        String::from_utf8(encode(value).unwrap()).unwrap()
    }

    #[test]
    fn keys_are_sorted_by_code_point() {
        let value = json!({"b": 1, "a": 2, "aa": 3, "B": 4});
        assert_eq!(encoded(&value), r#"{"B":4,"a":2,"aa":3,"b":1}"#);
    }

    #[test]
    fn no_whitespace_between_tokens() {
        let value = json!({"list": [1, 2, 3], "nested": {"x": true}});
        assert_eq!(encoded(&value), r#"{"list":[1,2,3],"nested":{"x":true}}"#);
    }

    #[test]
    fn integers_have_no_decimal_point() {
        assert_eq!(encoded(&json!(42)), "42");
        assert_eq!(encoded(&json!(-7)), "-7");
        assert_eq!(encoded(&json!(0)), "0");
    }

    #[test]
    fn floats_keep_a_fractional_digit() {
        assert_eq!(encoded(&json!(1.0)), "1.0");
        assert_eq!(encoded(&json!(2.5)), "2.5");
        assert_eq!(encoded(&json!(-0.125)), "-0.125");
    }

    #[test]
    fn exponent_floats_keep_a_fractional_digit() {
        assert_eq!(encoded(&json!(1e300)), "1.0e300");
        assert_eq!(encoded(&json!(-1e300)), "-1.0e300");
        assert_eq!(encoded(&json!(1e-7)), "1.0e-7");
        assert_eq!(encoded(&json!(1.5e300)), "1.5e300");
    }

    #[test]
    fn null_is_explicit() {
        assert_eq!(encoded(&json!({"runner": null})), r#"{"runner":null}"#);
    }

    #[test]
    fn strings_use_minimal_escapes() {
        assert_eq!(encoded(&json!("a\"b\\c\nd")), r#""a\"b\\c\nd""#);
        assert_eq!(encoded(&json!("\u{0001}")), "\"\\u0001\"");
        assert_eq!(encoded(&json!("über ⚾")), r#""über ⚾""#);
    }

    #[test]
    fn non_finite_floats_are_rejected() {
        assert_eq!(format_float(f64::NAN), Err(EncodeError::NonFiniteFloat));
        assert_eq!(
            format_float(f64::INFINITY),
            Err(EncodeError::NonFiniteFloat)
        );
    }

    #[test]
    fn identical_values_encode_identically() {
        let a = json!({"x": [1, {"k": "v"}], "y": null});
        let b = json!({"y": null, "x": [1, {"k": "v"}]});
        assert_eq!(encode(&a).unwrap(), encode(&b).unwrap());
    }
}
