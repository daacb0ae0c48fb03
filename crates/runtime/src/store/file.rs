//! File-based store implementations.
//!
//! Layout under the base directory:
//!
//! ```text
//! events/<event_id>.json   one canonical event body per file
//! index.jsonl              one entry per line: sequence, id, type, timestamp
//! snapshots/<sequence>.json
//! ```
//!
//! Event bodies are immutable once written; the index is the only
//! append-target, so a crash can at worst lose the tail of the log, never
//! corrupt an existing entry.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use baselom_core::Event;

use crate::error::StoreError;
use crate::store::{EventStore, IndexEntry, Snapshot, SnapshotStore};

/// File-based implementation of [`EventStore`].
pub struct FileEventStore {
    base_dir: PathBuf,
    /// Serializes index appends; bodies need no lock (idempotent writes).
    index_lock: Mutex<()>,
}

impl FileEventStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(base_dir.join("events"))?;
        Ok(Self {
            base_dir,
            index_lock: Mutex::new(()),
        })
    }

    fn event_path(&self, event_id: &str) -> PathBuf {
        self.base_dir.join("events").join(format!("{event_id}.json"))
    }

    fn index_path(&self) -> PathBuf {
        self.base_dir.join("index.jsonl")
    }

    fn read_index(&self) -> Result<Vec<IndexEntry>, StoreError> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path)?;
        let mut entries = Vec::new();
        for line in raw.lines().filter(|line| !line.trim().is_empty()) {
            entries.push(serde_json::from_str(line)?);
        }
        Ok(entries)
    }
}

impl EventStore for FileEventStore {
    fn put(&self, event: &Event) -> Result<(), StoreError> {
        let path = self.event_path(event.event_id());
        if path.exists() {
            return Ok(());
        }
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(event)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;
        tracing::debug!(event_id = event.event_id(), "stored event body");
        Ok(())
    }

    fn get(&self, event_id: &str) -> Result<Option<Event>, StoreError> {
        let path = self.event_path(event_id);
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(&path)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn append_index(&self, event: &Event) -> Result<u64, StoreError> {
        let _guard = self.index_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        let sequence = self.read_index()?.len() as u64;
        let entry = IndexEntry::describe(sequence, event);
        let mut line = serde_json::to_string(&entry)?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.index_path())?;
        file.write_all(line.as_bytes())?;
        tracing::debug!(sequence, event_id = entry.event_id, "appended to event index");
        Ok(sequence)
    }

    fn index(&self) -> Result<Vec<IndexEntry>, StoreError> {
        let _guard = self.index_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        self.read_index()
    }

    fn len(&self) -> Result<u64, StoreError> {
        let _guard = self.index_lock.lock().map_err(|_| StoreError::LockPoisoned)?;
        Ok(self.read_index()?.len() as u64)
    }
}

/// File-based implementation of [`SnapshotStore`].
pub struct FileSnapshotStore {
    base_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;
        Ok(Self { base_dir })
    }

    fn snapshot_path(&self, sequence: u64) -> PathBuf {
        self.base_dir.join(format!("{sequence}.json"))
    }

    fn stored_sequences(&self) -> Result<Vec<u64>, StoreError> {
        let mut sequences = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let path = entry?.path();
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|s| s.parse::<u64>().ok());
            if let Some(sequence) = stem {
                sequences.push(sequence);
            }
        }
        sequences.sort_unstable();
        Ok(sequences)
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = self.snapshot_path(snapshot.sequence);
        let temp_path = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&temp_path, bytes)?;
        fs::rename(&temp_path, &path)?;
        tracing::debug!(sequence = snapshot.sequence, "saved snapshot");
        Ok(())
    }

    fn latest_at_or_before(&self, sequence: u64) -> Result<Option<Snapshot>, StoreError> {
        let candidate = self
            .stored_sequences()?
            .into_iter()
            .filter(|stored| *stored <= sequence)
            .next_back();
        let Some(found) = candidate else {
            return Ok(None);
        };
        let bytes = fs::read(self.snapshot_path(found))?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn sequences(&self) -> Result<Vec<u64>, StoreError> {
        self.stored_sequences()
    }
}
