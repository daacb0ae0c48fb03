//! Deterministic baseball scoring: pure rules engine, canonical
//! serialization, and content-addressed events.
//!
//! `baselom-core` defines the canonical game model (state, rules, events)
//! and exposes pure APIs reused by the runtime and offline tools. All state
//! mutation flows through [`engine::GameEngine`]; given the same initial
//! state and the same event log, every replay reproduces identical states,
//! identical canonical bytes, and identical event IDs.
pub mod canonical;
pub mod engine;
pub mod event;
pub mod rules;
pub mod state;

pub use canonical::{state_hash, to_canonical_json, EncodeError};
pub use engine::{
    check_game_end, BaserunError, BattedBall, ExecuteError, GameEngine, HistoryMode, InningError,
    PitchError, PitchResult, SubstitutionError, SubstitutionRequest, TransitionPhase,
    TransitionPhaseError,
};
pub use event::{
    credited_rbis, Advance, BaserunAction, Envelope, Event, EventMeta, EventRef, FieldPosition,
    GameEndReason, HitKind, OutKind, Payload, PlayContext, SCHEMA_VERSION,
};
pub use rules::{GameRules, MercyRule, Tiebreaker};
pub use state::{
    validate_state, Bases, GameState, GameStatus, Half, PlayerId, Score, StateValidationError,
    Team, TeamSheet, BATTER, FIRST_BASE, HOME_PLATE, SECOND_BASE, THIRD_BASE,
};
