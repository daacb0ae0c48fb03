//! Live game orchestration over an engine and a pair of stores.

use baselom_core::{
    Advance, BaserunAction, BattedBall, Event, EventMeta, GameEngine, GameState, GameStatus,
    PitchResult, PlayerId, SubstitutionRequest, Team,
};
use chrono::Utc;

use crate::error::Result;
use crate::replay;
use crate::store::{EventStore, Snapshot, SnapshotStore};

/// When the session captures snapshots on its own.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SnapshotPolicy {
    /// Only on explicit [`GameSession::snapshot_now`] calls.
    Manual,
    /// After every `n` recorded events.
    EveryNEvents(u64),
    /// Whenever a play crosses a half-inning boundary or ends the game.
    #[default]
    HalfInningBoundary,
}

/// A live scoring session: applies inputs through the engine, records the
/// sealed events, and captures snapshots per policy.
///
/// The session always writes a snapshot at sequence 0 so a replay or
/// resume never lacks a starting state.
pub struct GameSession<E: EventStore, S: SnapshotStore> {
    engine: GameEngine,
    events: E,
    snapshots: S,
    state: GameState,
    sequence: u64,
    policy: SnapshotPolicy,
    source: Option<String>,
}

impl<E: EventStore, S: SnapshotStore> GameSession<E, S> {
    /// Starts a fresh session and captures the initial-state snapshot.
    pub fn new(engine: GameEngine, events: E, snapshots: S, initial: GameState) -> Result<Self> {
        let session = Self {
            engine,
            events,
            snapshots,
            state: initial,
            sequence: 0,
            policy: SnapshotPolicy::default(),
            source: None,
        };
        let snapshot = Snapshot::capture(0, &session.state, now())?;
        session.snapshots.save(&snapshot)?;
        tracing::info!(rules = %session.engine.rules().version, "session started");
        Ok(session)
    }

    /// Rebuilds a session from existing stores: newest verified snapshot
    /// plus the log tail.
    pub fn resume(engine: GameEngine, events: E, snapshots: S) -> Result<Self> {
        let (state, sequence, snapshot) =
            replay::rebuild_with_snapshot(&engine, &events, &snapshots)?;
        tracing::info!(
            sequence,
            snapshot = snapshot.sequence,
            "session resumed from stores"
        );
        Ok(Self {
            engine,
            events,
            snapshots,
            state,
            sequence,
            policy: SnapshotPolicy::default(),
            source: None,
        })
    }

    pub fn with_snapshot_policy(mut self, policy: SnapshotPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Provenance recorded on every sealed envelope (e.g. a feed name).
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Events applied so far; also the next sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn events(&self) -> &E {
        &self.events
    }

    pub fn snapshots(&self) -> &S {
        &self.snapshots
    }

    pub fn pitch(
        &mut self,
        result: PitchResult,
        batted: Option<BattedBall>,
        advances: Option<Vec<Advance>>,
    ) -> Result<Event> {
        let meta = self.meta();
        let (next, event) = self
            .engine
            .apply_pitch(&self.state, result, batted, advances, &meta)?;
        self.commit(next, event)
    }

    pub fn batter_action(
        &mut self,
        action: BaserunAction,
        runner: Option<PlayerId>,
        target_base: Option<u8>,
    ) -> Result<Event> {
        let meta = self.meta();
        let (next, event) =
            self.engine
                .apply_batter_action(&self.state, action, runner, target_base, &meta)?;
        self.commit(next, event)
    }

    pub fn substitute(&mut self, request: SubstitutionRequest) -> Result<Event> {
        let meta = self.meta();
        let (next, event) = self
            .engine
            .force_substitution(&self.state, request, &meta)?;
        self.commit(next, event)
    }

    pub fn end_half_inning(&mut self) -> Result<Event> {
        let meta = self.meta();
        let (next, event) = self.engine.end_half_inning(&self.state, &meta)?;
        self.commit(next, event)
    }

    pub fn check_game_end(&self) -> (bool, Option<Team>) {
        self.engine.check_game_end(&self.state)
    }

    /// Captures a snapshot of the current state at the current sequence.
    pub fn snapshot_now(&self) -> Result<Snapshot> {
        let snapshot = Snapshot::capture(self.sequence, &self.state, now())?;
        self.snapshots.save(&snapshot)?;
        Ok(snapshot)
    }

    fn meta(&self) -> EventMeta {
        let mut meta = EventMeta::at(now());
        if let Some(source) = &self.source {
            meta = meta.with_source(source.clone());
        }
        meta
    }

    fn commit(&mut self, next: GameState, event: Event) -> Result<Event> {
        let sequence = self.events.record(&event)?;
        let crossed_boundary = next.half != self.state.half
            || next.inning != self.state.inning
            || next.game_status != GameStatus::InProgress;
        self.state = next;
        self.sequence = sequence + 1;

        tracing::info!(
            sequence,
            event_id = event.event_id(),
            event_type = %event.envelope.event_type,
            "recorded event"
        );

        let due = match self.policy {
            SnapshotPolicy::Manual => false,
            SnapshotPolicy::EveryNEvents(n) => n > 0 && self.sequence % n == 0,
            SnapshotPolicy::HalfInningBoundary => crossed_boundary,
        };
        if due {
            self.snapshot_now()?;
        }
        Ok(event)
    }
}

fn now() -> String {
    Utc::now().to_rfc3339()
}
