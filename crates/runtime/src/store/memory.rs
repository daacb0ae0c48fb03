//! In-memory store implementations for tests and local runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use baselom_core::Event;

use crate::error::StoreError;
use crate::store::{EventStore, IndexEntry, Snapshot, SnapshotStore};

/// In-memory implementation of [`EventStore`].
#[derive(Default)]
pub struct MemoryEventStore {
    bodies: RwLock<HashMap<String, Event>>,
    index: RwLock<Vec<IndexEntry>>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for MemoryEventStore {
    fn put(&self, event: &Event) -> Result<(), StoreError> {
        let mut bodies = self.bodies.write().map_err(|_| StoreError::LockPoisoned)?;
        bodies
            .entry(event.event_id().to_string())
            .or_insert_with(|| event.clone());
        Ok(())
    }

    fn get(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        let bodies = self.bodies.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(bodies.get(event_id).cloned())
    }

    fn append_index(&self, event: &Event) -> Result<u64, StoreError> {
        let mut index = self.index.write().map_err(|_| StoreError::LockPoisoned)?;
        let sequence = index.len() as u64;
        index.push(IndexEntry::describe(sequence, event));
        Ok(sequence)
    }

    fn index(&self) -> Result<Vec<IndexEntry>, StoreError> {
        let index = self.index.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.clone())
    }

    fn len(&self) -> Result<u64, StoreError> {
        let index = self.index.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(index.len() as u64)
    }
}

/// In-memory implementation of [`SnapshotStore`].
#[derive(Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<BTreeMap<u64, Snapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let mut snapshots = self
            .snapshots
            .write()
            .map_err(|_| StoreError::LockPoisoned)?;
        snapshots.insert(snapshot.sequence, snapshot.clone());
        Ok(())
    }

    fn latest_at_or_before(&self, sequence: u64) -> Result<Option<Snapshot>, StoreError> {
        let snapshots = self.snapshots.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(snapshots
            .range(..=sequence)
            .next_back()
            .map(|(_, snapshot)| snapshot.clone()))
    }

    fn sequences(&self) -> Result<Vec<u64>, StoreError> {
        let snapshots = self.snapshots.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(snapshots.keys().copied().collect())
    }
}
