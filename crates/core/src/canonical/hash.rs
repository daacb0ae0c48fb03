//! Content-addressed digests over canonical bytes.
//!
//! A digest here is SHA-256 over `join(prefix_parts, "|") + "|" + canonical
//! bytes of the payload`, rendered as 64 lowercase hex characters. Event IDs
//! use `[schema_version, event_type]` as the prefix; state comparison hashes
//! first pass the value through [`normalized`] so wall-clock metadata never
//! affects identity.

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::{encode, EncodeError};
use crate::state::GameState;

/// Keys stripped everywhere during normalization.
const TIME_KEYS: [&str; 3] = ["created_at", "updated_at", "timestamp"];

/// Computes the 64-hex-char SHA-256 digest of a prefixed canonical payload.
pub fn content_hash(prefix_parts: &[&str], payload: &Value) -> Result<String, EncodeError> {
    let mut hasher = Sha256::new();
    for part in prefix_parts {
        hasher.update(part.as_bytes());
        hasher.update(b"|");
    }
    hasher.update(encode(payload)?);
    Ok(hex::encode(hasher.finalize()))
}

/// Strips time-like fields recursively so logically-equal values hash equal.
///
/// `event_id` is additionally stripped from objects that look like event
/// envelopes (those carrying an `event_type` key), since the ID of a nested
/// event reference is itself derived content, not a fact.
pub fn normalized(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let is_envelope = map.contains_key("event_type");
            let stripped = map
                .iter()
                .filter(|(key, _)| {
                    !TIME_KEYS.contains(&key.as_str())
                        && !(is_envelope && key.as_str() == "event_id")
                })
                .map(|(key, val)| (key.clone(), normalized(val)))
                .collect();
            Value::Object(stripped)
        }
        Value::Array(items) => Value::Array(items.iter().map(normalized).collect()),
        other => other.clone(),
    }
}

/// Normalized content hash of a full game state.
///
/// Two states reached through equivalent transitions hash identically even
/// when their recorded envelope timestamps differ.
pub fn state_hash(state: &GameState) -> Result<String, EncodeError> {
    let json = serde_json::to_value(state)
        .map_err(|e| EncodeError::Unrepresentable(e.to_string()))?;
    content_hash(&["game_state.v1"], &normalized(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn prefix_parts_are_pipe_joined() {
        let payload = json!({"a": 1});
        let joined = content_hash(&["1", "hit.v1"], &payload).unwrap();

        let mut hasher = Sha256::new();
        hasher.update(b"1|hit.v1|");
        hasher.update(encode(&payload).unwrap());
        assert_eq!(joined, hex::encode(hasher.finalize()));
    }

    #[test]
    fn digest_is_64_lowercase_hex() {
        let digest = content_hash(&["1", "walk.v1"], &json!({})).unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn normalization_strips_time_keys_recursively() {
        let value = json!({
            "created_at": "2026-04-01T00:00:00Z",
            "facts": {"timestamp": 7, "batter_id": "b1"},
            "items": [{"updated_at": "x", "keep": true}]
        });
        let expected = json!({
            "facts": {"batter_id": "b1"},
            "items": [{"keep": true}]
        });
        assert_eq!(normalized(&value), expected);
    }

    #[test]
    fn normalization_strips_event_id_only_inside_envelopes() {
        let value = json!({
            "event_id": "outer-not-an-envelope",
            "history": [{"event_type": "hit.v1", "event_id": "abc", "facts": 1}]
        });
        let norm = normalized(&value);
        assert_eq!(norm["event_id"], "outer-not-an-envelope");
        assert!(norm["history"][0].get("event_id").is_none());
        assert_eq!(norm["history"][0]["facts"], 1);
    }

    #[test]
    fn differing_facts_hash_differently() {
        let a = content_hash(&["1", "hit.v1"], &json!({"batter_id": "b1"})).unwrap();
        let b = content_hash(&["1", "hit.v1"], &json!({"batter_id": "b2"})).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn prefix_changes_the_digest() {
        let payload = json!({"batter_id": "b1"});
        let v1 = content_hash(&["1", "hit.v1"], &payload).unwrap();
        let v2 = content_hash(&["2", "hit.v2"], &payload).unwrap();
        assert_ne!(v1, v2);
    }
}
