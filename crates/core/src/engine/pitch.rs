//! Count bookkeeping and plate-appearance resolution for a single pitch.

use crate::event::{Advance, Payload, PitchFacts, PlateFacts};
use crate::rules::GameRules;
use crate::state::{
    GameState, PlayerId, StateValidationError, BATTER, FIRST_BASE, HOME_PLATE, SECOND_BASE,
    THIRD_BASE,
};

use super::{batted, inning, play_context, BattedBall, PitchResult, PlayTransition};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PitchError {
    #[error("no batter is due up")]
    NoBatter,

    #[error("pitch result 'in_play' requires a batted-ball result")]
    MissingBattedBall,

    #[error("batted-ball result is only valid with pitch result 'in_play'")]
    UnexpectedBattedBall,

    #[error("advance for {runner} has invalid bases {from} -> {to}")]
    InvalidAdvance { runner: PlayerId, from: u8, to: u8 },

    #[error("runner {runner} is not on base {base}")]
    RunnerNotOnBase { runner: PlayerId, base: u8 },

    #[error("two advances target base {base}")]
    AdvanceCollision { base: u8 },

    #[error("advance to base {base} is blocked by {occupant}")]
    AdvanceBlocked { occupant: PlayerId, base: u8 },

    #[error("double play requires a forced runner")]
    DoublePlayNeedsForce,

    #[error("triple play requires two forced runners")]
    TriplePlayNeedsForce,

    #[error(transparent)]
    Invalid(#[from] StateValidationError),
}

pub(crate) struct PitchPlay {
    pub result: PitchResult,
    pub batted: Option<BattedBall>,
    pub manual: Option<Vec<Advance>>,
}

impl PlayTransition for PitchPlay {
    type Error = PitchError;

    fn pre_validate(&self, state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        let batter = state.current_batter_id.as_ref().ok_or(PitchError::NoBatter)?;

        match (self.result, self.batted) {
            (PitchResult::InPlay, None) => return Err(PitchError::MissingBattedBall),
            (PitchResult::InPlay, Some(_)) => {}
            (_, Some(_)) => return Err(PitchError::UnexpectedBattedBall),
            (_, None) => {}
        }

        if let Some(advances) = &self.manual {
            validate_advances(state, batter, advances)?;
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, rules: &GameRules) -> Result<Payload, Self::Error> {
        let context = play_context(state);
        match self.result {
            PitchResult::Ball => {
                if state.balls < 3 {
                    state.balls += 1;
                    Ok(count_payload(context, self.result))
                } else {
                    resolve_walk(state, context)
                }
            }
            PitchResult::StrikeCalled | PitchResult::StrikeSwinging => {
                if state.strikes < 2 {
                    state.strikes += 1;
                    Ok(count_payload(context, self.result))
                } else {
                    let swinging = self.result == PitchResult::StrikeSwinging;
                    Ok(resolve_strikeout(state, rules, context, swinging))
                }
            }
            PitchResult::Foul => {
                // A foul at two strikes leaves the count unchanged.
                if state.strikes < 2 {
                    state.strikes += 1;
                }
                Ok(count_payload(context, self.result))
            }
            PitchResult::FoulTip => {
                // A caught foul tip is a strike; at two strikes it is a
                // strikeout, unlike an ordinary foul.
                if state.strikes >= 2 {
                    Ok(resolve_strikeout(state, rules, context, true))
                } else {
                    state.strikes += 1;
                    Ok(count_payload(context, self.result))
                }
            }
            PitchResult::InPlay => {
                let batted = self.batted.ok_or(PitchError::MissingBattedBall)?;
                batted::resolve(state, rules, batted, self.manual.clone(), context)
            }
        }
    }

    fn post_validate(&self, state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        crate::state::validate_state(state)?;
        Ok(())
    }
}

fn count_payload(context: crate::event::PlayContext, result: PitchResult) -> Payload {
    Payload::Pitch(PitchFacts {
        context,
        result: result.to_string(),
    })
}

/// Ball four: the batter takes first; runners advance only while forced in
/// an unbroken chain behind him. A run scores only when forced from third.
fn resolve_walk(
    state: &mut GameState,
    context: crate::event::PlayContext,
) -> Result<Payload, PitchError> {
    let batter = context.batter_id.clone().ok_or(PitchError::NoBatter)?;
    let advances = forced_chain(state, &batter);
    batted::apply_advances(state, &advances, true);
    state.complete_plate_appearance();
    Ok(Payload::Walk(PlateFacts {
        context,
        swinging: false,
        advances,
    }))
}

/// The forced-advance chain for a walk (or a balk-awarded ball four).
pub(crate) fn forced_chain(state: &GameState, batter: &PlayerId) -> Vec<Advance> {
    let mut advances = vec![Advance::new(batter.clone(), BATTER, FIRST_BASE)];
    if let Some(on_first) = &state.bases.first {
        advances.push(Advance::new(on_first.clone(), FIRST_BASE, SECOND_BASE));
        if let Some(on_second) = &state.bases.second {
            advances.push(Advance::new(on_second.clone(), SECOND_BASE, THIRD_BASE));
            if let Some(on_third) = &state.bases.third {
                advances.push(Advance::new(on_third.clone(), THIRD_BASE, HOME_PLATE));
            }
        }
    }
    advances
}

fn resolve_strikeout(
    state: &mut GameState,
    rules: &GameRules,
    context: crate::event::PlayContext,
    swinging: bool,
) -> Payload {
    state.complete_plate_appearance();
    inning::add_outs(state, rules, 1);
    Payload::Strikeout(PlateFacts {
        context,
        swinging,
        advances: Vec::new(),
    })
}

/// Validates caller-supplied advances against the base-index convention
/// (0 = batter, 1–3 = bases, 4 = home) and current occupancy.
fn validate_advances(
    state: &GameState,
    batter: &PlayerId,
    advances: &[Advance],
) -> Result<(), PitchError> {
    for advance in advances {
        if advance.from_base > THIRD_BASE
            || advance.to_base > HOME_PLATE
            || advance.to_base <= advance.from_base
        {
            return Err(PitchError::InvalidAdvance {
                runner: advance.runner_id.clone(),
                from: advance.from_base,
                to: advance.to_base,
            });
        }
        let occupant_matches = if advance.from_base == BATTER {
            advance.runner_id == *batter
        } else {
            state.bases.runner(advance.from_base) == Some(&advance.runner_id)
        };
        if !occupant_matches {
            return Err(PitchError::RunnerNotOnBase {
                runner: advance.runner_id.clone(),
                base: advance.from_base,
            });
        }
    }
    for (i, advance) in advances.iter().enumerate() {
        if advance.to_base < HOME_PLATE
            && advances[..i].iter().any(|a| a.to_base == advance.to_base)
        {
            return Err(PitchError::AdvanceCollision {
                base: advance.to_base,
            });
        }
    }
    // A target held by a runner who is not himself advancing would be
    // silently overwritten; reject the set instead.
    for advance in advances {
        if advance.to_base == HOME_PLATE {
            continue;
        }
        if let Some(occupant) = state.bases.runner(advance.to_base) {
            let occupant_moves = advances.iter().any(|a| a.from_base == advance.to_base);
            if !occupant_moves {
                return Err(PitchError::AdvanceBlocked {
                    occupant: occupant.clone(),
                    base: advance.to_base,
                });
            }
        }
    }
    Ok(())
}
