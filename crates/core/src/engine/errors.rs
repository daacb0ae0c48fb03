//! Error types for the transition pipeline.

use crate::canonical::EncodeError;

use super::baserun::BaserunError;
use super::inning::InningError;
use super::pitch::PitchError;
use super::substitution::SubstitutionError;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

/// Errors surfaced while executing an input through the engine.
///
/// Nothing here is retryable: every transition either returns a valid
/// `(state, event)` pair or fails deterministically.
#[derive(Clone, Debug, thiserror::Error)]
pub enum ExecuteError {
    /// The game has already been finalized; no further transitions apply.
    #[error("game already finalized")]
    GameEnded,

    #[error("pitch could not be applied: {0}")]
    Pitch(TransitionPhaseError<PitchError>),

    #[error("base-running action could not be applied: {0}")]
    Baserun(TransitionPhaseError<BaserunError>),

    #[error("substitution could not be applied: {0}")]
    Substitution(TransitionPhaseError<SubstitutionError>),

    #[error("half-inning transition could not be applied: {0}")]
    Inning(TransitionPhaseError<InningError>),

    /// A recorded event carries a schema version this engine cannot replay.
    #[error("event schema version '{version}' has no known migration path")]
    UnsupportedSchema { version: String },

    #[error("unrecognized pitch result '{0}' in recorded event")]
    UnknownPitchResult(String),

    #[error(transparent)]
    Encoding(#[from] EncodeError),
}
