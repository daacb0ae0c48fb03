//! Rebuilding state from the event log.
//!
//! Replay re-dispatches each recorded payload through the live engine, so
//! a rebuilt state is produced by the same transitions that produced the
//! original. Every reproduced event ID is compared against the log; any
//! divergence (a tampered body, a changed engine) stops the replay with a
//! [`ReplayError::DigestMismatch`].

use baselom_core::{ExecuteError, GameEngine, GameState};

use crate::error::ReplayError;
use crate::store::{EventStore, Snapshot, SnapshotStore};

/// Applies log entries `start_sequence..upto` on top of `start_state`.
///
/// `upto` is exclusive; `None` replays to the end of the log. Returns the
/// rebuilt state and the next sequence to apply.
pub fn replay_events<E: EventStore + ?Sized>(
    engine: &GameEngine,
    events: &E,
    start_state: &GameState,
    start_sequence: u64,
    upto: Option<u64>,
) -> Result<(GameState, u64), ReplayError> {
    let index = events.index().map_err(ReplayError::Store)?;
    let end = match upto {
        Some(limit) => (limit as usize).min(index.len()),
        None => index.len(),
    };

    let mut state = start_state.clone();
    let mut sequence = start_sequence;
    for entry in index.iter().take(end).skip(start_sequence as usize) {
        let recorded = events.fetch(&entry.event_id).map_err(ReplayError::Store)?;
        let (next, reproduced) =
            engine
                .apply_event(&state, &recorded)
                .map_err(|error| match error {
                    ExecuteError::UnsupportedSchema { version } => {
                        ReplayError::UnknownSchemaVersion { sequence, version }
                    }
                    other => ReplayError::Engine {
                        sequence,
                        source: other,
                    },
                })?;
        if reproduced.event_id() != recorded.event_id() {
            return Err(ReplayError::DigestMismatch {
                sequence,
                recorded: recorded.event_id().to_string(),
                reproduced: reproduced.event_id().to_string(),
            });
        }
        state = next;
        sequence += 1;
    }

    tracing::debug!(
        from = start_sequence,
        to = sequence,
        "replayed event log segment"
    );
    Ok((state, sequence))
}

/// Rebuilds the state at log position `upto` (exclusive; `None` means the
/// whole log), starting from the newest usable snapshot.
///
/// The snapshot's hash is re-verified before any event is applied; a
/// corrupt snapshot fails the rebuild rather than silently seeding it.
/// When no snapshot lies at or before the target, `initial_state` supplies
/// the starting point and the whole prefix is replayed.
pub fn rebuild<E, S, F>(
    engine: &GameEngine,
    events: &E,
    snapshots: &S,
    initial_state: F,
    upto: Option<u64>,
) -> Result<(GameState, u64), ReplayError>
where
    E: EventStore + ?Sized,
    S: SnapshotStore + ?Sized,
    F: FnOnce() -> GameState,
{
    let target = match upto {
        Some(limit) => limit,
        None => events.len().map_err(ReplayError::Store)?,
    };
    let (base, start) = match snapshots
        .latest_at_or_before(target)
        .map_err(ReplayError::Store)?
    {
        Some(snapshot) => {
            snapshot.verify()?;
            tracing::info!(
                snapshot = snapshot.sequence,
                target,
                "rebuilding state from snapshot"
            );
            (snapshot.state, snapshot.sequence)
        }
        None => {
            tracing::info!(target, "no usable snapshot; rebuilding from the initial state");
            (initial_state(), 0)
        }
    };
    replay_events(engine, events, &base, start, upto)
}

/// Rebuilds and returns the newest usable snapshot alongside the state,
/// for callers that also need the resume point (e.g. session recovery).
pub fn rebuild_with_snapshot<E, S>(
    engine: &GameEngine,
    events: &E,
    snapshots: &S,
) -> Result<(GameState, u64, Snapshot), ReplayError>
where
    E: EventStore + ?Sized,
    S: SnapshotStore + ?Sized,
{
    let target = events.len().map_err(ReplayError::Store)?;
    let snapshot = snapshots
        .latest_at_or_before(target)
        .map_err(ReplayError::Store)?
        .ok_or_else(|| {
            ReplayError::Store(crate::error::StoreError::Corrupted(
                "no snapshot available to resume from".to_string(),
            ))
        })?;
    snapshot.verify()?;
    let (state, sequence) =
        replay_events(engine, events, &snapshot.state, snapshot.sequence, None)?;
    Ok((state, sequence, snapshot))
}
