//! Event envelope/payload model.
//!
//! An [`Event`] splits into an [`Envelope`] carrying identity and provenance
//! metadata and a [`Payload`] carrying only the facts needed to replay the
//! play. The envelope's `event_id` is derived, never author-supplied:
//! SHA-256 over `schema_version|event_type|` plus the canonical payload
//! bytes. Timestamps and provenance are excluded from identity, so two
//! events recording the same facts always share an ID.

mod payload;

pub use payload::{
    credited_rbis, Advance, BaserunAction, BaserunFacts, BaserunMove, FieldPosition,
    GameEndFacts, GameEndReason, HalfInningFacts, HitFacts, HitKind, OutFacts, OutKind, Payload,
    PitchFacts, PlacedRunner, PlateFacts, PlayContext, SubstitutionFacts,
};

use serde::{Deserialize, Serialize};

use crate::canonical::{content_hash, EncodeError};

/// Schema version the engine currently writes and replays.
pub const SCHEMA_VERSION: &str = "1";

/// Identity and provenance metadata. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// 64-hex-char content digest; derived, never author-supplied.
    pub event_id: String,
    /// Type name with version suffix, e.g. `hit.v1`.
    pub event_type: String,
    pub schema_version: String,
    /// Informational wall-clock timestamp, excluded from identity.
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Back-reference to the event this one was migrated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrated_from: Option<String>,
}

/// A sealed transition record: envelope plus replayable facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub envelope: Envelope,
    pub payload: Payload,
}

/// Caller-supplied envelope inputs. The core never reads a clock; the
/// runtime stamps `created_at` before sealing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventMeta {
    pub schema_version: String,
    pub created_at: String,
    pub actor: Option<String>,
    pub source: Option<String>,
}

impl EventMeta {
    pub fn at(created_at: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            created_at: created_at.into(),
            actor: None,
            source: None,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>) -> Self {
        self.actor = Some(actor.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Event {
    /// Seals a payload: derives the content-addressed ID and wraps the
    /// payload in its envelope.
    pub fn seal(payload: Payload, meta: &EventMeta) -> Result<Self, EncodeError> {
        let event_type = format!("{}.v{}", payload.kind(), meta.schema_version);
        let event_id = generate_event_id(&payload, &event_type, &meta.schema_version)?;
        Ok(Self {
            envelope: Envelope {
                event_id,
                event_type,
                schema_version: meta.schema_version.clone(),
                created_at: meta.created_at.clone(),
                actor: meta.actor.clone(),
                source: meta.source.clone(),
                migrated_from: None,
            },
            payload,
        })
    }

    /// Produces a new envelope under a new schema version with an explicit
    /// back-reference to this event. The original is left untouched.
    pub fn migrate(&self, meta: &EventMeta) -> Result<Self, EncodeError> {
        let mut migrated = Self::seal(self.payload.clone(), meta)?;
        migrated.envelope.migrated_from = Some(self.envelope.event_id.clone());
        Ok(migrated)
    }

    pub fn event_id(&self) -> &str {
        &self.envelope.event_id
    }
}

/// Derives the content-addressed event ID for a payload.
///
/// The digest covers `schema_version`, `event_type`, and the canonical
/// payload bytes; envelope metadata (timestamps, provenance) never
/// participates.
pub fn generate_event_id(
    payload: &Payload,
    event_type: &str,
    schema_version: &str,
) -> Result<String, EncodeError> {
    let value = serde_json::to_value(payload)
        .map_err(|e| EncodeError::Unrepresentable(e.to_string()))?;
    content_hash(&[schema_version, event_type], &value)
}

/// Reference kept in `GameState::event_history`: either the full event
/// inline or just its content digest. Which one is a storage policy decided
/// by the caller; resolution happens behind the runtime's resolver.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "ref_type", content = "value", rename_all = "snake_case")]
pub enum EventRef {
    Inline(Box<Event>),
    Digest(String),
}

impl EventRef {
    pub fn event_id(&self) -> &str {
        match self {
            EventRef::Inline(event) => event.event_id(),
            EventRef::Digest(id) => id,
        }
    }
}
