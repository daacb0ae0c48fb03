//! Error types raised by stores, sessions, and replay.

use baselom_core::{EncodeError, ExecuteError};
use thiserror::Error;

/// Errors surfaced by event and snapshot store implementations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store lock was poisoned")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("no event stored under id {0}")]
    MissingEvent(String),

    #[error("corrupted data: {0}")]
    Corrupted(String),
}

/// Errors surfaced while rebuilding state from the event log.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("event {sequence} carries unsupported schema version '{version}'")]
    UnknownSchemaVersion { sequence: u64, version: String },

    #[error("snapshot at sequence {sequence} failed hash validation: recorded {recorded}, recomputed {recomputed}")]
    SnapshotHashMismatch {
        sequence: u64,
        recorded: String,
        recomputed: String,
    },

    #[error("replay of event {sequence} produced id {reproduced}, log records {recorded}")]
    DigestMismatch {
        sequence: u64,
        recorded: String,
        reproduced: String,
    },

    #[error("transition failed during replay of event {sequence}: {source}")]
    Engine {
        sequence: u64,
        #[source]
        source: ExecuteError,
    },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

/// Top-level error type for session operations.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Engine(#[from] ExecuteError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Replay(#[from] ReplayError),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
