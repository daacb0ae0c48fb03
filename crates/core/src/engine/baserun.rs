//! Baserunning events between pitches: steals, wild pitches, passed
//! balls, and balks.

use crate::event::{BaserunAction, BaserunFacts, BaserunMove, Payload};
use crate::rules::GameRules;
use crate::state::{
    GameState, PlayerId, StateValidationError, HOME_PLATE, THIRD_BASE,
};

use super::{inning, pitch, play_context, PlayTransition};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BaserunError {
    #[error("the {rule} rule is disabled in this rule set")]
    RuleDisabled { rule: &'static str },
    #[error("no runner is available for this baserunning event")]
    MissingRunner,
    #[error("runner {runner} is not on base")]
    RunnerNotOnBase { runner: PlayerId },
    #[error("cannot advance from base {from} to base {target}")]
    InvalidTarget { from: u8, target: u8 },
    #[error("base {target} is already occupied")]
    TargetOccupied { target: u8 },
    #[error("no batter is due up")]
    NoBatter,
    #[error(transparent)]
    Invalid(#[from] StateValidationError),
}

pub(crate) struct BaserunPlay {
    pub action: BaserunAction,
    pub runner: Option<PlayerId>,
    pub target_base: Option<u8>,
}

impl BaserunPlay {
    fn rule_gate(&self, rules: &GameRules) -> Result<(), BaserunError> {
        let (allowed, rule) = match self.action {
            BaserunAction::StealAttempt | BaserunAction::CaughtStealing => {
                (rules.allow_stealing, "stealing")
            }
            BaserunAction::WildPitch => (rules.allow_wild_pitch, "wild_pitch"),
            BaserunAction::PassedBall => (rules.allow_passed_ball, "passed_ball"),
            BaserunAction::Balk => (rules.allow_balk, "balk"),
        };
        if allowed {
            Ok(())
        } else {
            Err(BaserunError::RuleDisabled { rule })
        }
    }

    /// Resolves the runner this event concerns and the base he occupies.
    /// Wild pitches and passed balls default to the lead runner.
    fn resolve_runner(&self, state: &GameState) -> Result<(PlayerId, u8), BaserunError> {
        match &self.runner {
            Some(runner) => {
                let base = state
                    .bases
                    .runners()
                    .into_iter()
                    .find(|(_, occupant)| *occupant == runner)
                    .map(|(base, _)| base);
                match base {
                    Some(base) => Ok((runner.clone(), base)),
                    None => Err(BaserunError::RunnerNotOnBase {
                        runner: runner.clone(),
                    }),
                }
            }
            None => {
                let lead = (1..=THIRD_BASE)
                    .rev()
                    .find_map(|base| state.bases.runner(base).cloned().map(|r| (r, base)));
                lead.ok_or(BaserunError::MissingRunner)
            }
        }
    }

    /// These events move one runner exactly one base.
    fn target_for(&self, from: u8) -> Result<u8, BaserunError> {
        let target = self.target_base.unwrap_or(from + 1);
        if target != from + 1 || target > HOME_PLATE {
            return Err(BaserunError::InvalidTarget { from, target });
        }
        Ok(target)
    }
}

/// Home plate always accepts a runner; the other bases hold one at a time.
fn ensure_base_open(state: &GameState, target: u8) -> Result<(), BaserunError> {
    if target < HOME_PLATE && state.bases.runner(target).is_some() {
        return Err(BaserunError::TargetOccupied { target });
    }
    Ok(())
}

impl PlayTransition for BaserunPlay {
    type Error = BaserunError;

    fn pre_validate(&self, state: &GameState, rules: &GameRules) -> Result<(), Self::Error> {
        self.rule_gate(rules)?;
        match self.action {
            BaserunAction::StealAttempt => {
                if self.runner.is_none() {
                    return Err(BaserunError::MissingRunner);
                }
                let (_, from) = self.resolve_runner(state)?;
                let target = self.target_for(from)?;
                ensure_base_open(state, target)?;
            }
            BaserunAction::CaughtStealing => {
                // The runner is retired, so the target need not be open.
                if self.runner.is_none() {
                    return Err(BaserunError::MissingRunner);
                }
                let (_, from) = self.resolve_runner(state)?;
                self.target_for(from)?;
            }
            BaserunAction::WildPitch | BaserunAction::PassedBall => {
                let (_, from) = self.resolve_runner(state)?;
                let target = self.target_for(from)?;
                ensure_base_open(state, target)?;
            }
            BaserunAction::Balk => {
                // A balk with the bases empty is a ball awarded to the
                // batter, so a batter must be due up.
                if state.bases.is_empty() {
                    if state.current_batter_id.is_none() {
                        return Err(BaserunError::NoBatter);
                    }
                } else {
                    let (_, from) = self.resolve_runner(state)?;
                    ensure_base_open(state, (from + 1).min(HOME_PLATE))?;
                }
            }
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, rules: &GameRules) -> Result<Payload, Self::Error> {
        let context = play_context(state);

        if self.action == BaserunAction::Balk && state.bases.is_empty() {
            // Ball awarded to the batter; a fourth ball becomes a walk.
            state.balls += 1;
            if state.balls >= 4 {
                let batter = state
                    .current_batter_id
                    .clone()
                    .ok_or(BaserunError::NoBatter)?;
                let advances = pitch::forced_chain(state, &batter);
                super::batted::apply_advances(state, &advances, true);
                state.complete_plate_appearance();
            }
            return Ok(Payload::Baserunning(BaserunFacts {
                context,
                action: self.action,
                runner: None,
                out: false,
            }));
        }

        let (runner, from) = self.resolve_runner(state)?;

        if self.action == BaserunAction::CaughtStealing {
            let target = self.target_for(from)?;
            state.bases.take(from);
            inning::add_outs(state, rules, 1);
            return Ok(Payload::Baserunning(BaserunFacts {
                context,
                action: self.action,
                runner: Some(BaserunMove {
                    runner_id: runner,
                    from_base: from,
                    to_base: target,
                }),
                out: true,
            }));
        }

        // Steal, wild pitch, passed ball, or a balk with runners on: the
        // runner advances; reaching home scores.
        let target = match self.action {
            BaserunAction::Balk => (from + 1).min(HOME_PLATE),
            _ => self.target_for(from)?,
        };
        state.bases.take(from);
        if target == HOME_PLATE {
            state.score.add(state.batting_team, 1);
        } else {
            state.bases.put(target, runner.clone());
        }

        Ok(Payload::Baserunning(BaserunFacts {
            context,
            action: self.action,
            runner: Some(BaserunMove {
                runner_id: runner,
                from_base: from,
                to_base: target,
            }),
            out: false,
        }))
    }

    fn post_validate(&self, state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        crate::state::validate_state(state)?;
        Ok(())
    }
}
