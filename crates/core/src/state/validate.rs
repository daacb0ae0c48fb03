//! State consistency checks.
//!
//! Run by every transition's post-validate phase, so an engine bug that
//! produces an out-of-range count or a duplicated runner surfaces at the
//! transition that introduced it.

use super::{GameState, PlayerId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateValidationError {
    #[error("inning must be at least 1")]
    InningOutOfRange,

    #[error("outs must be between 0 and 2, got {0}")]
    OutsOutOfRange(u8),

    #[error("balls must be between 0 and 3, got {0}")]
    BallsOutOfRange(u8),

    #[error("strikes must be between 0 and 2, got {0}")]
    StrikesOutOfRange(u8),

    #[error("batting and fielding team must be distinct")]
    TeamsNotDistinct,

    #[error("runner {0} occupies more than one base")]
    DuplicateRunner(PlayerId),

    #[error("lineup index must be between 0 and 8, got {0}")]
    LineupIndexOutOfRange(u8),

    #[error("lineup contains duplicate player {0}")]
    DuplicateLineupPlayer(PlayerId),
}

/// Validates the invariants every [`GameState`] value must uphold.
pub fn validate_state(state: &GameState) -> Result<(), StateValidationError> {
    if state.inning == 0 {
        return Err(StateValidationError::InningOutOfRange);
    }
    if state.outs > 2 {
        return Err(StateValidationError::OutsOutOfRange(state.outs));
    }
    if state.balls > 3 {
        return Err(StateValidationError::BallsOutOfRange(state.balls));
    }
    if state.strikes > 2 {
        return Err(StateValidationError::StrikesOutOfRange(state.strikes));
    }
    if state.batting_team == state.fielding_team {
        return Err(StateValidationError::TeamsNotDistinct);
    }

    let occupied: Vec<&PlayerId> = state.bases.runners().into_iter().map(|(_, r)| r).collect();
    for (i, runner) in occupied.iter().enumerate() {
        if occupied[..i].contains(runner) {
            return Err(StateValidationError::DuplicateRunner((*runner).clone()));
        }
    }

    for sheet in [&state.home, &state.away] {
        if sheet.lineup_index > 8 {
            return Err(StateValidationError::LineupIndexOutOfRange(
                sheet.lineup_index,
            ));
        }
        for (i, player) in sheet.lineup.iter().enumerate() {
            if sheet.lineup[..i].contains(player) {
                return Err(StateValidationError::DuplicateLineupPlayer(player.clone()));
            }
        }
    }

    Ok(())
}
