//! Half-inning transitions and extra-inning tiebreaker placement.

use crate::event::{
    GameEndFacts, GameEndReason, HalfInningFacts, Payload, PlacedRunner,
};
use crate::rules::{GameRules, Tiebreaker};
use crate::state::{
    GameState, GameStatus, Half, StateValidationError, Team, FIRST_BASE, SECOND_BASE,
};

use super::{game_end, play_context, PlayTransition};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InningError {
    #[error(transparent)]
    Invalid(#[from] StateValidationError),
}

/// Explicit half-inning boundary, for forfeits and special rule situations.
/// The same flip runs automatically when a play records the third out.
pub(crate) struct InningPlay;

impl PlayTransition for InningPlay {
    type Error = InningError;

    fn pre_validate(&self, _state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        Ok(())
    }

    fn apply(&self, state: &mut GameState, rules: &GameRules) -> Result<Payload, Self::Error> {
        let context = play_context(state);
        let flip = flip_half(state, rules);
        match flip.outcome {
            Some((winner, reason)) => Ok(Payload::GameEnd(GameEndFacts {
                context,
                winner,
                reason,
            })),
            None => Ok(Payload::HalfInning(HalfInningFacts {
                context,
                placed: flip.placed,
            })),
        }
    }

    fn post_validate(&self, state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        crate::state::validate_state(state)?;
        Ok(())
    }
}

pub(crate) struct HalfFlip {
    pub placed: Vec<PlacedRunner>,
    /// `Some` when the completed half decided the game.
    pub outcome: Option<(Option<Team>, GameEndReason)>,
}

/// Records outs and, when the count reaches three, runs the half-inning
/// transition. Returns whether the half ended.
pub(crate) fn add_outs(state: &mut GameState, rules: &GameRules, outs: u8) -> bool {
    state.outs += outs;
    if state.outs >= 3 {
        flip_half(state, rules);
        true
    } else {
        false
    }
}

/// Ends the current half-inning: clears bases and count, swaps the batting
/// and fielding teams, and increments the inning when the bottom half
/// closes. If the completed half decided the game, the state is finalized
/// instead of flipped. Entering an extra inning applies the configured
/// tiebreaker placement.
pub(crate) fn flip_half(state: &mut GameState, rules: &GameRules) -> HalfFlip {
    let outcome = half_complete_outcome(state, rules);

    state.bases.clear();
    state.outs = 0;
    state.balls = 0;
    state.strikes = 0;

    if let Some((winner, _)) = &outcome {
        state.game_status = if winner.is_some() {
            GameStatus::Final
        } else {
            GameStatus::Suspended
        };
        return HalfFlip {
            placed: Vec::new(),
            outcome,
        };
    }

    let (inning, half) = match state.half {
        Half::Top => (state.inning, Half::Bottom),
        Half::Bottom => (state.inning + 1, Half::Top),
    };
    state.inning = inning;
    state.half = half;
    state.batting_team = half.batting_team();
    state.fielding_team = state.batting_team.opponent();
    state.current_batter_id = Some(state.batting_sheet().due_up().clone());
    state.current_pitcher_id = Some(state.sheet(state.fielding_team).pitcher.clone());

    let placed = if state.inning > rules.max_innings {
        place_tiebreaker_runners(state, rules)
    } else {
        Vec::new()
    };

    HalfFlip {
        placed,
        outcome: None,
    }
}

/// Tiebreaker placement: the batting team's last completed batter starts on
/// second; with the two-runner variant, the batter before him starts on
/// first.
fn place_tiebreaker_runners(state: &mut GameState, rules: &GameRules) -> Vec<PlacedRunner> {
    let sheet = state.batting_sheet();
    let mut placed = Vec::new();
    match rules.extra_innings_tiebreaker {
        Tiebreaker::None => {}
        Tiebreaker::RunnerOnSecond => {
            placed.push(PlacedRunner {
                runner_id: sheet.previous_batter(1).clone(),
                base: SECOND_BASE,
            });
        }
        Tiebreaker::RunnersOnFirstAndSecond => {
            placed.push(PlacedRunner {
                runner_id: sheet.previous_batter(1).clone(),
                base: SECOND_BASE,
            });
            placed.push(PlacedRunner {
                runner_id: sheet.previous_batter(2).clone(),
                base: FIRST_BASE,
            });
        }
    }
    for runner in &placed {
        state.bases.put(runner.base, runner.runner_id.clone());
    }
    placed
}

/// Whether the half-inning that just completed decided the game.
///
/// After the top of the final regulation inning (or later), a leading home
/// team does not bat. After the bottom, any lead is decisive; a tie
/// continues into extras until the configured limit exhausts, at which
/// point the game is recorded as a suspended tie.
fn half_complete_outcome(
    state: &GameState,
    rules: &GameRules,
) -> Option<(Option<Team>, GameEndReason)> {
    if state.game_status != GameStatus::InProgress {
        return None;
    }
    let regulation = rules.max_innings;
    match state.half {
        Half::Top => {
            if state.inning >= regulation && state.score.home > state.score.away {
                Some((Some(Team::Home), boundary_reason(state, rules)))
            } else {
                None
            }
        }
        Half::Bottom => {
            if state.inning < regulation {
                return None;
            }
            if let Some(winner) = state.score.leader() {
                Some((Some(winner), boundary_reason(state, rules)))
            } else if let Some(max_extra) = rules.max_extra_innings {
                if state.inning >= regulation + max_extra {
                    Some((None, GameEndReason::MaxInningsExhausted))
                } else {
                    None
                }
            } else {
                None
            }
        }
    }
}

fn boundary_reason(state: &GameState, rules: &GameRules) -> GameEndReason {
    if game_end::mercy_applies(state, rules) {
        GameEndReason::Mercy
    } else {
        GameEndReason::Regulation
    }
}
