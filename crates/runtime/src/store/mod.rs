//! Store contracts for the append-only event log and snapshots.
//!
//! Events are content-addressed: the body lives under its `event_id` and an
//! append-only sequence index records log order. Snapshots pair a full
//! [`GameState`] with the log sequence it was taken at and a recomputable
//! hash, so a resumed replay can prove the snapshot is intact before
//! trusting it.

mod file;
mod memory;

pub use file::{FileEventStore, FileSnapshotStore};
pub use memory::{MemoryEventStore, MemorySnapshotStore};

use baselom_core::{state_hash, Event, EventRef, GameState};
use serde::{Deserialize, Serialize};

use crate::error::{ReplayError, StoreError};

/// One position in the append-only sequence index. The id locates the
/// body; the type and timestamp let a reader scan the log without
/// fetching every event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub sequence: u64,
    pub event_id: String,
    pub event_type: String,
    pub created_at: String,
}

impl IndexEntry {
    pub fn describe(sequence: u64, event: &Event) -> Self {
        Self {
            sequence,
            event_id: event.event_id().to_string(),
            event_type: event.envelope.event_type.clone(),
            created_at: event.envelope.created_at.clone(),
        }
    }
}

/// Append-only, content-addressed event persistence.
pub trait EventStore: Send + Sync {
    /// Store the event body under its `event_id`. Idempotent: the body is
    /// immutable, so re-putting the same id is a no-op.
    fn put(&self, event: &Event) -> Result<(), StoreError>;

    /// Fetch a stored event body by id.
    fn get(&self, event_id: &str) -> Result<Option<Event>, StoreError>;

    /// Append the event to the sequence index, returning its sequence
    /// number (0-based position in the log).
    fn append_index(&self, event: &Event) -> Result<u64, StoreError>;

    /// The full sequence index in log order.
    fn index(&self) -> Result<Vec<IndexEntry>, StoreError>;

    /// Index entries with sequences in `from..to` (`to` exclusive; `None`
    /// means the end of the log).
    fn index_range(&self, from: u64, to: Option<u64>) -> Result<Vec<IndexEntry>, StoreError> {
        let index = self.index()?;
        let end = match to {
            Some(limit) => (limit as usize).min(index.len()),
            None => index.len(),
        };
        let start = (from as usize).min(end);
        Ok(index[start..end].to_vec())
    }

    /// Number of events in the log.
    fn len(&self) -> Result<u64, StoreError>;

    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Store the body and append it to the log in one call.
    fn record(&self, event: &Event) -> Result<u64, StoreError> {
        self.put(event)?;
        self.append_index(event)
    }

    /// Fetch an event the log claims to contain.
    fn fetch(&self, event_id: &str) -> Result<Event, StoreError> {
        self.get(event_id)?
            .ok_or_else(|| StoreError::MissingEvent(event_id.to_string()))
    }
}

/// Resolves `GameState::event_history` references back to full events.
///
/// Inline references resolve without touching storage; digest references
/// are fetched from the backing event store.
pub trait EventResolver {
    fn resolve(&self, reference: &EventRef) -> Result<Event, StoreError>;
}

impl<T: EventStore + ?Sized> EventResolver for T {
    fn resolve(&self, reference: &EventRef) -> Result<Event, StoreError> {
        match reference {
            EventRef::Inline(event) => Ok((**event).clone()),
            EventRef::Digest(event_id) => self.fetch(event_id),
        }
    }
}

/// Snapshot persistence keyed by log sequence.
pub trait SnapshotStore: Send + Sync {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError>;

    /// The most recent snapshot taken at or before `sequence`.
    fn latest_at_or_before(&self, sequence: u64) -> Result<Option<Snapshot>, StoreError>;

    /// Sequences of every stored snapshot, ascending.
    fn sequences(&self) -> Result<Vec<u64>, StoreError>;
}

/// A full state capture tied to a position in the event log.
///
/// `sequence` counts events applied: a snapshot at sequence `n` reflects
/// the state after log entries `0..n`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub state: GameState,
    /// Normalized SHA-256 of `state`, recomputed on load.
    pub state_hash: String,
    pub created_at: String,
}

impl Snapshot {
    pub fn capture(
        sequence: u64,
        state: &GameState,
        created_at: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let hash = state_hash(state)
            .map_err(|e| StoreError::Corrupted(format!("state hash failed: {e}")))?;
        Ok(Self {
            sequence,
            state: state.clone(),
            state_hash: hash,
            created_at: created_at.into(),
        })
    }

    /// Recomputes the state hash and compares it with the recorded one.
    pub fn verify(&self) -> Result<(), ReplayError> {
        let recomputed = state_hash(&self.state)?;
        if recomputed != self.state_hash {
            return Err(ReplayError::SnapshotHashMismatch {
                sequence: self.sequence,
                recorded: self.state_hash.clone(),
                recomputed,
            });
        }
        Ok(())
    }
}
