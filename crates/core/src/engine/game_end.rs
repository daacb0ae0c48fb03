//! Read-only game-end probe.

use crate::rules::GameRules;
use crate::state::{GameState, GameStatus, Half, Team};

/// Reports whether the game is over and, if so, the winner (`None` for a
/// tie recorded after the extra-inning limit exhausts).
///
/// This is a pure read: half-inning boundary outcomes are settled by the
/// inning transition itself, while this probe additionally recognizes
/// mid-play endings such as a walk-off lead or a mercy-rule margin.
pub fn check_game_end(state: &GameState, rules: &GameRules) -> (bool, Option<Team>) {
    match state.game_status {
        GameStatus::Final => return (true, state.score.leader()),
        GameStatus::Suspended => return (true, None),
        GameStatus::InProgress => {}
    }

    if mercy_applies(state, rules) {
        return (true, state.score.leader());
    }

    // Walk-off: the home team takes the lead while batting in or after the
    // final regulation inning. The game ends the moment the run scores.
    if state.half == Half::Bottom
        && state.inning >= rules.max_innings
        && state.score.home > state.score.away
    {
        return (true, Some(Team::Home));
    }

    if let Some(max_extra) = rules.max_extra_innings {
        if state.inning > rules.max_innings + max_extra {
            return (true, None);
        }
    }

    (false, None)
}

/// Mercy rule check: the margin meets the configured threshold once the
/// minimum inning has been reached.
pub(crate) fn mercy_applies(state: &GameState, rules: &GameRules) -> bool {
    match &rules.mercy_rule {
        Some(mercy) => {
            state.inning >= mercy.min_inning && state.score.differential() >= mercy.threshold
        }
        None => false,
    }
}
