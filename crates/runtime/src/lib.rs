//! Runtime orchestration for the deterministic scoring engine.
//!
//! This crate wires the pure engine from `baselom-core` to durable stores
//! and wall-clock provenance. Consumers embed [`GameSession`] to score a
//! live game, and use [`replay`] to rebuild any past state from the log.
//!
//! Modules are organized by responsibility:
//! - [`session`] drives a live game and records sealed events
//! - [`store`] holds the event-log and snapshot contracts plus the memory
//!   and file implementations
//! - [`replay`] rebuilds states from snapshots and the log tail
pub mod error;
pub mod replay;
pub mod session;
pub mod store;

pub use error::{ReplayError, Result, RuntimeError, StoreError};
pub use session::{GameSession, SnapshotPolicy};
pub use store::{
    EventResolver, EventStore, FileEventStore, FileSnapshotStore, IndexEntry, MemoryEventStore,
    MemorySnapshotStore, Snapshot, SnapshotStore,
};
