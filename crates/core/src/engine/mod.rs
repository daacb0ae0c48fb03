//! The rules engine: one pure transition per discrete input.
//!
//! [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! entry point clones the caller's state, drives the change through the
//! three-phase transition pipeline (pre_validate → apply → post_validate),
//! seals the resulting payload into a content-addressed [`Event`], and
//! returns the new state alongside it. The input state is never touched,
//! so callers may keep, fork, and replay any past value freely.

mod baserun;
mod batted;
mod errors;
mod game_end;
mod inning;
mod pitch;
mod substitution;

pub use baserun::BaserunError;
pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
pub use game_end::check_game_end;
pub use inning::InningError;
pub use pitch::PitchError;
pub use substitution::{SubstitutionError, SubstitutionRequest};

use serde::{Deserialize, Serialize};

use crate::event::{
    Advance, BaserunAction, Event, EventMeta, EventRef, HitKind, OutKind, Payload, PlayContext,
    SCHEMA_VERSION,
};
use crate::rules::GameRules;
use crate::state::{GameState, GameStatus, PlayerId, Team};

/// Outcome of a single pitch.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PitchResult {
    Ball,
    StrikeCalled,
    StrikeSwinging,
    Foul,
    FoulTip,
    InPlay,
}

/// Result of a ball put in play. Required whenever the pitch result is
/// [`PitchResult::InPlay`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum BattedBall {
    Single,
    Double,
    Triple,
    HomeRun,
    GroundRuleDouble,
    ReachedOnError,
    Groundout,
    Flyout,
    Lineout,
    Popout,
    DoublePlay,
    TriplePlay,
}

impl BattedBall {
    pub(crate) fn hit_kind(self) -> Option<HitKind> {
        match self {
            BattedBall::Single => Some(HitKind::Single),
            BattedBall::Double => Some(HitKind::Double),
            BattedBall::Triple => Some(HitKind::Triple),
            BattedBall::HomeRun => Some(HitKind::HomeRun),
            BattedBall::GroundRuleDouble => Some(HitKind::GroundRuleDouble),
            BattedBall::ReachedOnError => Some(HitKind::Error),
            _ => None,
        }
    }

    pub(crate) fn out_kind(self) -> Option<OutKind> {
        match self {
            BattedBall::Groundout => Some(OutKind::Groundout),
            BattedBall::Flyout => Some(OutKind::Flyout),
            BattedBall::Lineout => Some(OutKind::Lineout),
            BattedBall::Popout => Some(OutKind::Popout),
            BattedBall::DoublePlay => Some(OutKind::DoublePlay),
            BattedBall::TriplePlay => Some(OutKind::TriplePlay),
            _ => None,
        }
    }

    fn from_hit_kind(hit: HitKind) -> Self {
        match hit {
            HitKind::Single => BattedBall::Single,
            HitKind::Double => BattedBall::Double,
            HitKind::Triple => BattedBall::Triple,
            HitKind::HomeRun => BattedBall::HomeRun,
            HitKind::GroundRuleDouble => BattedBall::GroundRuleDouble,
            HitKind::Error => BattedBall::ReachedOnError,
        }
    }

    fn from_out_kind(out: OutKind) -> Self {
        match out {
            OutKind::Groundout => BattedBall::Groundout,
            OutKind::Flyout => BattedBall::Flyout,
            OutKind::Lineout => BattedBall::Lineout,
            OutKind::Popout => BattedBall::Popout,
            OutKind::DoublePlay => BattedBall::DoublePlay,
            OutKind::TriplePlay => BattedBall::TriplePlay,
        }
    }
}

/// How sealed events are recorded in `GameState::event_history`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HistoryMode {
    /// Content digests only; the store resolves them back to payloads.
    #[default]
    Digest,
    /// Full events inline.
    Inline,
}

/// A state change driven through the three-phase pipeline.
pub(crate) trait PlayTransition {
    type Error;

    /// Check preconditions against the unmodified state.
    fn pre_validate(&self, state: &GameState, rules: &GameRules) -> Result<(), Self::Error>;

    /// Mutate the working copy and return the replayable facts.
    fn apply(&self, state: &mut GameState, rules: &GameRules) -> Result<Payload, Self::Error>;

    /// Verify postconditions on the mutated copy.
    fn post_validate(&self, state: &GameState, rules: &GameRules) -> Result<(), Self::Error>;
}

/// Executes a transition through the three-phase pipeline.
fn drive_transition<T>(
    transition: &T,
    state: &mut GameState,
    rules: &GameRules,
) -> Result<Payload, TransitionPhaseError<T::Error>>
where
    T: PlayTransition,
{
    transition
        .pre_validate(state, rules)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

    let payload = transition
        .apply(state, rules)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, rules)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(payload)
}

/// Captures the play context before a transition mutates anything.
pub(crate) fn play_context(state: &GameState) -> PlayContext {
    PlayContext {
        inning: state.inning,
        half: state.half,
        outs_before: state.outs,
        batter_id: state.current_batter_id.clone(),
        pitcher_id: state.current_pitcher_id.clone(),
    }
}

/// Pure reducer over immutable game states.
#[derive(Clone, Debug)]
pub struct GameEngine {
    rules: GameRules,
    history_mode: HistoryMode,
}

impl GameEngine {
    pub fn new(rules: GameRules) -> Self {
        Self {
            rules,
            history_mode: HistoryMode::default(),
        }
    }

    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = mode;
        self
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    /// Applies one pitch. `batted` is required for (and only valid with)
    /// [`PitchResult::InPlay`]; `advances` optionally overrides the default
    /// runner-advance policy for balls in play.
    pub fn apply_pitch(
        &self,
        state: &GameState,
        result: PitchResult,
        batted: Option<BattedBall>,
        advances: Option<Vec<Advance>>,
        meta: &EventMeta,
    ) -> Result<(GameState, Event), ExecuteError> {
        self.ensure_in_progress(state)?;
        let play = pitch::PitchPlay {
            result,
            batted,
            manual: advances,
        };
        let mut next = state.clone();
        let payload =
            drive_transition(&play, &mut next, &self.rules).map_err(ExecuteError::Pitch)?;
        self.seal(next, payload, meta)
    }

    /// Applies a base-running input between pitches: steal attempt, caught
    /// stealing, or an advance on a wild pitch, passed ball, or balk.
    pub fn apply_batter_action(
        &self,
        state: &GameState,
        action: BaserunAction,
        runner: Option<PlayerId>,
        target_base: Option<u8>,
        meta: &EventMeta,
    ) -> Result<(GameState, Event), ExecuteError> {
        self.ensure_in_progress(state)?;
        let play = baserun::BaserunPlay {
            action,
            runner,
            target_base,
        };
        let mut next = state.clone();
        let payload =
            drive_transition(&play, &mut next, &self.rules).map_err(ExecuteError::Baserun)?;
        self.seal(next, payload, meta)
    }

    /// Replaces a roster slot, enforcing reentry, double-switch, and
    /// designated-hitter rules.
    pub fn force_substitution(
        &self,
        state: &GameState,
        request: SubstitutionRequest,
        meta: &EventMeta,
    ) -> Result<(GameState, Event), ExecuteError> {
        self.ensure_in_progress(state)?;
        let play = substitution::SubstitutionPlay { request };
        let mut next = state.clone();
        let payload =
            drive_transition(&play, &mut next, &self.rules).map_err(ExecuteError::Substitution)?;
        self.seal(next, payload, meta)
    }

    /// Explicitly ends the current half-inning (forfeits, special rulings).
    /// Applies extra-inning tiebreaker placement where configured.
    pub fn end_half_inning(
        &self,
        state: &GameState,
        meta: &EventMeta,
    ) -> Result<(GameState, Event), ExecuteError> {
        self.ensure_in_progress(state)?;
        let play = inning::InningPlay;
        let mut next = state.clone();
        let payload =
            drive_transition(&play, &mut next, &self.rules).map_err(ExecuteError::Inning)?;
        self.seal(next, payload, meta)
    }

    /// Read-only probe: has this game ended, and who won? Never mutates
    /// `game_status`; the engine finalizes on qualifying transitions.
    pub fn check_game_end(&self, state: &GameState) -> (bool, Option<Team>) {
        game_end::check_game_end(state, &self.rules)
    }

    /// Replay entry point: re-applies a sealed event's recorded facts.
    ///
    /// Dispatches the payload back through the same transition that
    /// produced it, so replaying a log reproduces both the states and the
    /// event IDs bit for bit. Fails with [`ExecuteError::UnsupportedSchema`]
    /// when the event's schema version has no known migration path.
    pub fn apply_event(
        &self,
        state: &GameState,
        event: &Event,
    ) -> Result<(GameState, Event), ExecuteError> {
        let envelope = &event.envelope;
        if envelope.schema_version != SCHEMA_VERSION {
            return Err(ExecuteError::UnsupportedSchema {
                version: envelope.schema_version.clone(),
            });
        }
        let meta = EventMeta {
            schema_version: envelope.schema_version.clone(),
            created_at: envelope.created_at.clone(),
            actor: envelope.actor.clone(),
            source: envelope.source.clone(),
        };

        match &event.payload {
            Payload::Pitch(f) => {
                let result = f
                    .result
                    .parse::<PitchResult>()
                    .map_err(|_| ExecuteError::UnknownPitchResult(f.result.clone()))?;
                self.apply_pitch(state, result, None, None, &meta)
            }
            Payload::Walk(_) => self.apply_pitch(state, PitchResult::Ball, None, None, &meta),
            Payload::Strikeout(f) => {
                let result = if f.swinging {
                    PitchResult::StrikeSwinging
                } else {
                    PitchResult::StrikeCalled
                };
                self.apply_pitch(state, result, None, None, &meta)
            }
            Payload::Hit(f) => self.apply_pitch(
                state,
                PitchResult::InPlay,
                Some(BattedBall::from_hit_kind(f.hit)),
                Some(f.advances.clone()),
                &meta,
            ),
            Payload::Out(f) => self.apply_pitch(
                state,
                PitchResult::InPlay,
                Some(BattedBall::from_out_kind(f.out_type)),
                Some(f.advances.clone()),
                &meta,
            ),
            Payload::Baserunning(f) => self.apply_batter_action(
                state,
                f.action,
                f.runner.as_ref().map(|m| m.runner_id.clone()),
                f.runner.as_ref().map(|m| m.to_base),
                &meta,
            ),
            Payload::Substitution(f) => self.force_substitution(
                state,
                SubstitutionRequest {
                    team: f.team,
                    outgoing: f.outgoing_id.clone(),
                    incoming: f.incoming_id.clone(),
                    position: f.position,
                    double_switch_partner: f.double_switch_partner.clone(),
                },
                &meta,
            ),
            Payload::HalfInning(_) | Payload::GameEnd(_) => self.end_half_inning(state, &meta),
        }
    }

    fn ensure_in_progress(&self, state: &GameState) -> Result<(), ExecuteError> {
        if state.is_final() {
            return Err(ExecuteError::GameEnded);
        }
        Ok(())
    }

    /// Seals the payload into an event, finalizes the game if the transition
    /// qualifies, and appends the event reference to the state's history.
    fn seal(
        &self,
        mut next: GameState,
        payload: Payload,
        meta: &EventMeta,
    ) -> Result<(GameState, Event), ExecuteError> {
        let event = Event::seal(payload, meta)?;

        if next.game_status == GameStatus::InProgress {
            let (ended, winner) = game_end::check_game_end(&next, &self.rules);
            if ended {
                next.game_status = if winner.is_some() {
                    GameStatus::Final
                } else {
                    GameStatus::Suspended
                };
            }
        }

        let reference = match self.history_mode {
            HistoryMode::Digest => EventRef::Digest(event.event_id().to_string()),
            HistoryMode::Inline => EventRef::Inline(Box::new(event.clone())),
        };
        next.event_history.push(reference);

        Ok((next, event))
    }
}

#[cfg(test)]
mod tests {
    use super::baserun::BaserunError;
    use super::pitch::PitchError;
    use super::substitution::SubstitutionError;
    use super::*;
    use crate::canonical::to_canonical_json;
    use crate::event::FieldPosition;
    use crate::state::test_support::{fresh_state, lineup};
    use crate::state::{
        Half, PlayerId, TeamSheet, BATTER, FIRST_BASE, HOME_PLATE, SECOND_BASE, THIRD_BASE,
    };

    fn engine() -> GameEngine {
        GameEngine::new(GameRules::professional())
    }

    fn meta() -> EventMeta {
        EventMeta::at("2026-06-01T19:05:00Z")
    }

    fn pid(id: &str) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn ball_increments_count_only() {
        let engine = engine();
        let state = fresh_state();
        let (next, event) = engine
            .apply_pitch(&state, PitchResult::Ball, None, None, &meta())
            .unwrap();
        assert_eq!(next.balls, 1);
        assert_eq!(next.strikes, 0);
        assert_eq!(next.current_batter_id, state.current_batter_id);
        assert!(matches!(event.payload, Payload::Pitch(_)));
    }

    #[test]
    fn fourth_ball_walks_batter_and_forces_chain() {
        let engine = engine();
        let mut state = fresh_state();
        state.balls = 3;
        state.bases.put(FIRST_BASE, pid("a9"));
        state.bases.put(SECOND_BASE, pid("a8"));
        state.bases.put(THIRD_BASE, pid("a7"));

        let (next, event) = engine
            .apply_pitch(&state, PitchResult::Ball, None, None, &meta())
            .unwrap();

        assert_eq!(next.score.away, 1);
        assert_eq!(next.balls, 0);
        assert_eq!(next.bases.runner(FIRST_BASE), Some(&pid("a1")));
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a9")));
        assert_eq!(next.bases.runner(THIRD_BASE), Some(&pid("a8")));
        assert_eq!(next.current_batter_id, Some(pid("a2")));
        match &event.payload {
            Payload::Walk(f) => {
                assert_eq!(f.advances.len(), 4);
                assert_eq!(crate::event::credited_rbis(&event.payload), 1);
            }
            other => panic!("expected walk, got {other:?}"),
        }
    }

    #[test]
    fn walk_does_not_move_unforced_runner() {
        let engine = engine();
        let mut state = fresh_state();
        state.balls = 3;
        state.bases.put(SECOND_BASE, pid("a8"));

        let (next, _) = engine
            .apply_pitch(&state, PitchResult::Ball, None, None, &meta())
            .unwrap();
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a8")));
        assert_eq!(next.bases.runner(FIRST_BASE), Some(&pid("a1")));
    }

    #[test]
    fn third_strike_is_an_out_and_resets_count() {
        let engine = engine();
        let mut state = fresh_state();
        state.strikes = 2;
        state.balls = 2;

        let (next, event) = engine
            .apply_pitch(&state, PitchResult::StrikeSwinging, None, None, &meta())
            .unwrap();
        assert_eq!(next.outs, 1);
        assert_eq!(next.balls, 0);
        assert_eq!(next.strikes, 0);
        assert_eq!(next.current_batter_id, Some(pid("a2")));
        match &event.payload {
            Payload::Strikeout(f) => assert!(f.swinging),
            other => panic!("expected strikeout, got {other:?}"),
        }
    }

    #[test]
    fn foul_holds_at_two_strikes_but_foul_tip_strikes_out() {
        let engine = engine();
        let mut state = fresh_state();
        state.strikes = 2;

        let (after_foul, _) = engine
            .apply_pitch(&state, PitchResult::Foul, None, None, &meta())
            .unwrap();
        assert_eq!(after_foul.strikes, 2);
        assert_eq!(after_foul.outs, 0);

        let (after_tip, event) = engine
            .apply_pitch(&state, PitchResult::FoulTip, None, None, &meta())
            .unwrap();
        assert_eq!(after_tip.outs, 1);
        assert!(matches!(event.payload, Payload::Strikeout(_)));
    }

    #[test]
    fn third_out_flips_the_half_inning() {
        let engine = engine();
        let mut state = fresh_state();
        state.outs = 2;
        state.strikes = 2;
        state.bases.put(SECOND_BASE, pid("a9"));

        let (next, _) = engine
            .apply_pitch(&state, PitchResult::StrikeCalled, None, None, &meta())
            .unwrap();
        assert_eq!(next.half, Half::Bottom);
        assert_eq!(next.inning, 1);
        assert_eq!(next.outs, 0);
        assert!(next.bases.is_empty());
        assert_eq!(next.batting_team, Team::Home);
        assert_eq!(next.current_batter_id, Some(pid("h1")));
        assert_eq!(next.current_pitcher_id, Some(pid("ap")));
    }

    #[test]
    fn grand_slam_scores_four() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));
        state.bases.put(SECOND_BASE, pid("a8"));
        state.bases.put(THIRD_BASE, pid("a7"));

        let (next, event) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::HomeRun),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.score.away, 4);
        assert!(next.bases.is_empty());
        assert_eq!(crate::event::credited_rbis(&event.payload), 4);
    }

    #[test]
    fn ground_rule_double_advances_everyone_two_bases() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));

        let (next, _) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::GroundRuleDouble),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a1")));
        assert_eq!(next.bases.runner(THIRD_BASE), Some(&pid("a9")));
        assert_eq!(next.score.away, 0);
    }

    #[test]
    fn double_play_requires_a_forced_runner() {
        let engine = engine();
        let state = fresh_state();

        let err = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::DoublePlay),
                None,
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Pitch(TransitionPhaseError {
                phase: TransitionPhase::Apply,
                error: PitchError::DoublePlayNeedsForce,
            })
        ));
    }

    #[test]
    fn double_play_retires_lead_forced_runner_and_batter() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));

        let (next, event) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::DoublePlay),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.outs, 2);
        assert!(next.bases.is_empty());
        match &event.payload {
            Payload::Out(f) => {
                assert_eq!(f.runners_out, vec![pid("a9"), pid("a1")]);
            }
            other => panic!("expected out, got {other:?}"),
        }
    }

    #[test]
    fn no_run_scores_on_the_half_ending_force() {
        let engine = engine();
        let mut state = fresh_state();
        state.outs = 2;
        state.bases.put(THIRD_BASE, pid("a7"));

        let (next, _) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::Groundout),
                Some(vec![Advance::new(pid("a7"), THIRD_BASE, HOME_PLATE)]),
                &meta(),
            )
            .unwrap();
        assert_eq!(next.score.away, 0);
        assert_eq!(next.half, Half::Bottom);
    }

    #[test]
    fn manual_advance_must_match_base_occupancy() {
        let engine = engine();
        let state = fresh_state();

        let err = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::Single),
                Some(vec![Advance::new(pid("ghost"), SECOND_BASE, THIRD_BASE)]),
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Pitch(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: PitchError::RunnerNotOnBase { .. },
            })
        ));
    }

    #[test]
    fn manual_advance_cannot_displace_a_stationary_runner() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));
        state.bases.put(SECOND_BASE, pid("a8"));

        // a9 is sent to second while a8 stays put.
        let err = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::Single),
                Some(vec![
                    Advance::new(pid("a1"), BATTER, FIRST_BASE),
                    Advance::new(pid("a9"), FIRST_BASE, SECOND_BASE),
                ]),
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Pitch(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: PitchError::AdvanceBlocked {
                    base: SECOND_BASE,
                    ..
                },
            })
        ));

        // The same set with a8 also moving is fine.
        let (next, _) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::Single),
                Some(vec![
                    Advance::new(pid("a1"), BATTER, FIRST_BASE),
                    Advance::new(pid("a9"), FIRST_BASE, SECOND_BASE),
                    Advance::new(pid("a8"), SECOND_BASE, THIRD_BASE),
                ]),
                &meta(),
            )
            .unwrap();
        assert_eq!(next.bases.runner(THIRD_BASE), Some(&pid("a8")));
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a9")));
        assert_eq!(next.bases.runner(FIRST_BASE), Some(&pid("a1")));
    }

    #[test]
    fn input_state_is_never_mutated() {
        let engine = engine();
        let state = fresh_state();
        let before = state.clone();
        engine
            .apply_pitch(&state, PitchResult::Ball, None, None, &meta())
            .unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn identical_inputs_produce_identical_states_and_event_ids() {
        let engine = engine();
        let state = fresh_state();

        let (a_state, a_event) = engine
            .apply_pitch(&state, PitchResult::StrikeCalled, None, None, &meta())
            .unwrap();
        let (b_state, b_event) = engine
            .apply_pitch(&state, PitchResult::StrikeCalled, None, None, &meta())
            .unwrap();

        assert_eq!(a_event.event_id(), b_event.event_id());
        assert_eq!(
            to_canonical_json(&a_state).unwrap(),
            to_canonical_json(&b_state).unwrap()
        );
    }

    #[test]
    fn walk_off_run_finalizes_the_game() {
        let engine = engine();
        let mut state = fresh_state();
        state.inning = 9;
        state.half = Half::Bottom;
        state.batting_team = Team::Home;
        state.fielding_team = Team::Away;
        state.current_batter_id = Some(pid("h1"));
        state.current_pitcher_id = Some(pid("ap"));
        state.score.home = 3;
        state.score.away = 3;
        state.bases.put(THIRD_BASE, pid("h9"));

        let (next, _) = engine
            .apply_pitch(
                &state,
                PitchResult::InPlay,
                Some(BattedBall::Single),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.score.home, 4);
        assert!(next.is_final());
        assert_eq!(engine.check_game_end(&next), (true, Some(Team::Home)));

        let err = engine
            .apply_pitch(&next, PitchResult::Ball, None, None, &meta())
            .unwrap_err();
        assert!(matches!(err, ExecuteError::GameEnded));
    }

    #[test]
    fn leading_home_team_wins_after_the_top_of_the_ninth() {
        let engine = engine();
        let mut state = fresh_state();
        state.inning = 9;
        state.score.home = 5;
        state.score.away = 3;

        let (next, event) = engine.end_half_inning(&state, &meta()).unwrap();
        assert!(next.is_final());
        match &event.payload {
            Payload::GameEnd(f) => {
                assert_eq!(f.winner, Some(Team::Home));
                assert_eq!(f.reason, crate::event::GameEndReason::Regulation);
            }
            other => panic!("expected game end, got {other:?}"),
        }
    }

    #[test]
    fn tied_ninth_rolls_into_extras_with_tiebreaker_runner() {
        let engine = engine();
        let mut state = fresh_state();
        state.inning = 9;
        state.half = Half::Bottom;
        state.batting_team = Team::Home;
        state.fielding_team = Team::Away;
        state.score.home = 2;
        state.score.away = 2;

        let (next, event) = engine.end_half_inning(&state, &meta()).unwrap();
        assert_eq!(next.inning, 10);
        assert_eq!(next.half, Half::Top);
        assert_eq!(next.batting_team, Team::Away);
        // The away team's last completed batter starts the tenth on second.
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a9")));
        match &event.payload {
            Payload::HalfInning(f) => assert_eq!(f.placed.len(), 1),
            other => panic!("expected half-inning, got {other:?}"),
        }
    }

    #[test]
    fn two_runner_tiebreaker_places_the_previous_two_batters() {
        let rules = GameRules::youth();
        let engine = GameEngine::new(rules.clone());
        let mut state = GameState::new(
            TeamSheet::new(lineup("h"), pid("hp")),
            TeamSheet::new(lineup("a"), pid("ap")),
            &rules,
        )
        .unwrap();
        state.inning = 6;
        state.half = Half::Bottom;
        state.batting_team = Team::Home;
        state.fielding_team = Team::Away;
        state.current_batter_id = Some(pid("h1"));
        state.current_pitcher_id = Some(pid("ap"));
        state.score.home = 3;
        state.score.away = 3;

        let (next, event) = engine.end_half_inning(&state, &meta()).unwrap();
        assert_eq!(next.inning, 7);
        assert_eq!(next.half, Half::Top);
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a9")));
        assert_eq!(next.bases.runner(FIRST_BASE), Some(&pid("a8")));
        match &event.payload {
            Payload::HalfInning(f) => {
                assert_eq!(f.placed.len(), 2);
                assert_eq!(f.placed[0].runner_id, pid("a9"));
                assert_eq!(f.placed[0].base, SECOND_BASE);
                assert_eq!(f.placed[1].runner_id, pid("a8"));
                assert_eq!(f.placed[1].base, FIRST_BASE);
            }
            other => panic!("expected half-inning, got {other:?}"),
        }
    }

    #[test]
    fn mercy_rule_probe_reports_the_leader() {
        let rules = GameRules::youth();
        let engine = GameEngine::new(rules.clone());
        let mut state = GameState::new(
            TeamSheet::new(lineup("h"), pid("hp")),
            TeamSheet::new(lineup("a"), pid("ap")),
            &rules,
        )
        .unwrap();
        state.inning = 4;
        state.score.home = 12;
        state.score.away = 1;
        assert_eq!(engine.check_game_end(&state), (true, Some(Team::Home)));

        state.inning = 3;
        assert_eq!(engine.check_game_end(&state), (false, None));
    }

    #[test]
    fn steal_moves_the_runner_one_base() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));

        let (next, event) = engine
            .apply_batter_action(
                &state,
                BaserunAction::StealAttempt,
                Some(pid("a9")),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a9")));
        assert!(next.bases.runner(FIRST_BASE).is_none());
        assert!(matches!(event.payload, Payload::Baserunning(_)));
    }

    #[test]
    fn steal_into_an_occupied_base_is_rejected() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));
        state.bases.put(SECOND_BASE, pid("a8"));

        let err = engine
            .apply_batter_action(
                &state,
                BaserunAction::StealAttempt,
                Some(pid("a9")),
                None,
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Baserun(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: BaserunError::TargetOccupied { target: SECOND_BASE },
            })
        ));
        // Nothing moved and nobody vanished.
        assert_eq!(state.bases.runner(FIRST_BASE), Some(&pid("a9")));
        assert_eq!(state.bases.runner(SECOND_BASE), Some(&pid("a8")));
    }

    #[test]
    fn steal_target_is_limited_to_the_next_base() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));

        let err = engine
            .apply_batter_action(
                &state,
                BaserunAction::StealAttempt,
                Some(pid("a9")),
                Some(THIRD_BASE),
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Baserun(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: BaserunError::InvalidTarget {
                    from: FIRST_BASE,
                    target: THIRD_BASE,
                },
            })
        ));
    }

    #[test]
    fn caught_stealing_records_an_out_without_ending_the_plate_appearance() {
        let engine = engine();
        let mut state = fresh_state();
        state.balls = 2;
        state.strikes = 1;
        state.bases.put(FIRST_BASE, pid("a9"));

        let (next, _) = engine
            .apply_batter_action(
                &state,
                BaserunAction::CaughtStealing,
                Some(pid("a9")),
                None,
                &meta(),
            )
            .unwrap();
        assert_eq!(next.outs, 1);
        assert_eq!(next.balls, 2);
        assert_eq!(next.strikes, 1);
        assert_eq!(next.current_batter_id, state.current_batter_id);
    }

    #[test]
    fn steal_rejected_when_the_rule_set_disables_it() {
        let engine = GameEngine::new(GameRules::youth());
        let mut state = fresh_state();
        state.bases.put(FIRST_BASE, pid("a9"));

        let err = engine
            .apply_batter_action(
                &state,
                BaserunAction::StealAttempt,
                Some(pid("a9")),
                None,
                &meta(),
            )
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Baserun(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: BaserunError::RuleDisabled { rule: "stealing" },
            })
        ));
    }

    #[test]
    fn balk_with_empty_bases_awards_a_ball() {
        let engine = engine();
        let state = fresh_state();

        let (next, event) = engine
            .apply_batter_action(&state, BaserunAction::Balk, None, None, &meta())
            .unwrap();
        assert_eq!(next.balls, 1);
        match &event.payload {
            Payload::Baserunning(f) => assert!(f.runner.is_none()),
            other => panic!("expected baserunning, got {other:?}"),
        }
    }

    #[test]
    fn wild_pitch_scores_the_runner_from_third_without_rbi() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(THIRD_BASE, pid("a9"));

        let (next, event) = engine
            .apply_batter_action(&state, BaserunAction::WildPitch, None, None, &meta())
            .unwrap();
        assert_eq!(next.score.away, 1);
        assert!(next.bases.is_empty());
        assert_eq!(crate::event::credited_rbis(&event.payload), 0);
    }

    #[test]
    fn pinch_runner_takes_over_the_base_and_lineup_slot() {
        let engine = engine();
        let mut state = fresh_state();
        state.bases.put(SECOND_BASE, pid("a1"));
        state.current_batter_id = Some(pid("a2"));
        state.away.advance_order();

        let request = SubstitutionRequest {
            team: Team::Away,
            outgoing: pid("a1"),
            incoming: pid("a10"),
            position: FieldPosition::CenterField,
            double_switch_partner: None,
        };
        let (next, _) = engine.force_substitution(&state, request, &meta()).unwrap();
        assert_eq!(next.bases.runner(SECOND_BASE), Some(&pid("a10")));
        assert_eq!(next.away.lineup[0], pid("a10"));
        assert!(next.away.departed.contains(&pid("a1")));
    }

    #[test]
    fn departed_player_cannot_reenter_without_the_reentry_rule() {
        let engine = engine();
        let mut state = fresh_state();
        state.away.departed.push(pid("a10"));

        let request = SubstitutionRequest {
            team: Team::Away,
            outgoing: pid("a5"),
            incoming: pid("a10"),
            position: FieldPosition::LeftField,
            double_switch_partner: None,
        };
        let err = engine
            .force_substitution(&state, request, &meta())
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Substitution(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: SubstitutionError::Reentry { .. },
            })
        ));
    }

    #[test]
    fn strict_mode_rejects_the_pitcher_entering_the_batting_order() {
        let engine = engine();
        let mut state = fresh_state();
        state.away.designated_hitter = Some(pid("a1"));

        let request = SubstitutionRequest {
            team: Team::Away,
            outgoing: pid("a5"),
            incoming: pid("a10"),
            position: FieldPosition::Pitcher,
            double_switch_partner: None,
        };
        let err = engine
            .force_substitution(&state, request, &meta())
            .unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::Substitution(TransitionPhaseError {
                phase: TransitionPhase::PreValidate,
                error: SubstitutionError::DhForfeited {
                    rule: "pitcher-entering-batting-order",
                },
            })
        ));
    }

    #[test]
    fn replaying_the_event_log_reproduces_states_and_ids() {
        let engine = engine();
        let initial = fresh_state();

        let mut live = initial.clone();
        let mut log = Vec::new();
        let inputs = [
            (PitchResult::Ball, None),
            (PitchResult::StrikeSwinging, None),
            (PitchResult::InPlay, Some(BattedBall::Single)),
            (PitchResult::InPlay, Some(BattedBall::DoublePlay)),
        ];
        for (result, batted) in inputs {
            let (next, event) = engine
                .apply_pitch(&live, result, batted, None, &meta())
                .unwrap();
            live = next;
            log.push(event);
        }

        let mut replayed = initial;
        for event in &log {
            let (next, reproduced) = engine.apply_event(&replayed, event).unwrap();
            assert_eq!(reproduced.event_id(), event.event_id());
            replayed = next;
        }
        assert_eq!(replayed, live);
        assert_eq!(
            to_canonical_json(&replayed).unwrap(),
            to_canonical_json(&live).unwrap()
        );
    }

    #[test]
    fn replay_rejects_unknown_schema_versions() {
        let engine = engine();
        let state = fresh_state();
        let (_, mut event) = engine
            .apply_pitch(&state, PitchResult::Ball, None, None, &meta())
            .unwrap();
        event.envelope.schema_version = "99".to_string();

        let err = engine.apply_event(&state, &event).unwrap_err();
        assert!(matches!(
            err,
            ExecuteError::UnsupportedSchema { version } if version == "99"
        ));
    }
}
