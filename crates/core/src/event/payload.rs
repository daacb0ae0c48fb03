//! Replayable event payloads.
//!
//! A closed set of tagged variants, one per transition category, dispatched
//! on `event_type` and exhaustively matched during canonicalization and
//! replay. Payloads record facts only — batter/pitcher/runner identifiers,
//! the count of outs before the play, and runner advances. Derived values
//! (RBI, runs scored, outs-after, score-after) are always recomputed during
//! replay.

use serde::{Deserialize, Serialize};

use crate::state::{Half, PlayerId, Team, HOME_PLATE};

/// Facts shared by every payload: where in the game the play happened and
/// who was involved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayContext {
    pub inning: u8,
    pub half: Half,
    pub outs_before: u8,
    pub batter_id: Option<PlayerId>,
    pub pitcher_id: Option<PlayerId>,
}

/// A single runner movement. Base indices: 0 = batter's box, 1–3 = bases,
/// 4 = home plate. An advance to 4 scores.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advance {
    pub runner_id: PlayerId,
    pub from_base: u8,
    pub to_base: u8,
}

impl Advance {
    pub fn new(runner_id: PlayerId, from_base: u8, to_base: u8) -> Self {
        Self {
            runner_id,
            from_base,
            to_base,
        }
    }

    pub fn scores(&self) -> bool {
        self.to_base == HOME_PLATE
    }
}

/// How the batter reached on a batted ball that did not record an out.
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
pub enum HitKind {
    Single,
    Double,
    Triple,
    HomeRun,
    GroundRuleDouble,
    /// Batter reached on a fielding error. Runs that score this way never
    /// count as RBI.
    Error,
}

/// Batted-ball outcome that records one or more outs.
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
pub enum OutKind {
    Groundout,
    Flyout,
    Lineout,
    Popout,
    DoublePlay,
    TriplePlay,
}

impl OutKind {
    /// Outs recorded by this play.
    pub fn outs(&self) -> u8 {
        match self {
            OutKind::DoublePlay => 2,
            OutKind::TriplePlay => 3,
            _ => 1,
        }
    }
}

/// Discrete base-running inputs between pitches.
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
pub enum BaserunAction {
    StealAttempt,
    CaughtStealing,
    WildPitch,
    PassedBall,
    Balk,
}

/// Defensive assignment named in a substitution request.
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
pub enum FieldPosition {
    Pitcher,
    Catcher,
    FirstBase,
    SecondBase,
    ThirdBase,
    Shortstop,
    LeftField,
    CenterField,
    RightField,
    DesignatedHitter,
}

/// Why a game ended at a half-inning boundary.
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
pub enum GameEndReason {
    Regulation,
    Mercy,
    MaxInningsExhausted,
}

/// Count bookkeeping that did not end the plate appearance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchFacts {
    pub context: PlayContext,
    /// The raw pitch outcome, e.g. `ball`, `strike_called`, `foul`.
    pub result: String,
}

/// A completed plate appearance without a batted ball (walk, strikeout).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlateFacts {
    pub context: PlayContext,
    /// For strikeouts: whether the third strike was swinging (including a
    /// caught foul tip). Always `false` for walks.
    pub swinging: bool,
    pub advances: Vec<Advance>,
}

/// Batter reached base on a ball in play.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitFacts {
    pub context: PlayContext,
    pub hit: HitKind,
    pub advances: Vec<Advance>,
}

/// Ball in play that recorded one or more outs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutFacts {
    pub context: PlayContext,
    pub out_type: OutKind,
    /// Runners retired on the play, batter included where applicable.
    pub runners_out: Vec<PlayerId>,
    pub advances: Vec<Advance>,
}

/// A base-running play between pitches.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaserunMove {
    pub runner_id: PlayerId,
    pub from_base: u8,
    pub to_base: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaserunFacts {
    pub context: PlayContext,
    pub action: BaserunAction,
    /// The affected runner, absent for a balk with empty bases (which
    /// awards the batter a ball instead).
    pub runner: Option<BaserunMove>,
    pub out: bool,
}

/// Roster slot replacement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionFacts {
    pub context: PlayContext,
    pub team: Team,
    pub outgoing_id: PlayerId,
    pub incoming_id: PlayerId,
    pub position: FieldPosition,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub double_switch_partner: Option<PlayerId>,
}

/// Tiebreaker runner placed at the start of an extra half-inning.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacedRunner {
    pub runner_id: PlayerId,
    pub base: u8,
}

/// Explicit half-inning boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HalfInningFacts {
    pub context: PlayContext,
    pub placed: Vec<PlacedRunner>,
}

/// Game termination at a half-inning boundary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEndFacts {
    pub context: PlayContext,
    pub winner: Option<Team>,
    pub reason: GameEndReason,
}

/// The closed payload set. The serialized `kind` tag matches the event type
/// name (without its version suffix).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Pitch(PitchFacts),
    Walk(PlateFacts),
    Strikeout(PlateFacts),
    Hit(HitFacts),
    Out(OutFacts),
    Baserunning(BaserunFacts),
    Substitution(SubstitutionFacts),
    HalfInning(HalfInningFacts),
    GameEnd(GameEndFacts),
}

impl Payload {
    /// Event type name without the version suffix.
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Pitch(_) => "pitch",
            Payload::Walk(_) => "walk",
            Payload::Strikeout(_) => "strikeout",
            Payload::Hit(_) => "hit",
            Payload::Out(_) => "out",
            Payload::Baserunning(_) => "baserunning",
            Payload::Substitution(_) => "substitution",
            Payload::HalfInning(_) => "half_inning",
            Payload::GameEnd(_) => "game_end",
        }
    }

    pub fn context(&self) -> &PlayContext {
        match self {
            Payload::Pitch(f) => &f.context,
            Payload::Walk(f) | Payload::Strikeout(f) => &f.context,
            Payload::Hit(f) => &f.context,
            Payload::Out(f) => &f.context,
            Payload::Baserunning(f) => &f.context,
            Payload::Substitution(f) => &f.context,
            Payload::HalfInning(f) => &f.context,
            Payload::GameEnd(f) => &f.context,
        }
    }
}

/// Runs batted in credited to the batter for a play, under the fixed
/// attribution policy:
///
/// - runs scoring on a double or triple play credit nothing
/// - runs scoring via error, wild pitch, passed ball, or balk credit nothing
/// - every other forced or batted-in run counts
pub fn credited_rbis(payload: &Payload) -> u32 {
    let scored = |advances: &[Advance]| advances.iter().filter(|a| a.scores()).count() as u32;
    match payload {
        Payload::Hit(f) if f.hit == HitKind::Error => 0,
        Payload::Hit(f) => scored(&f.advances),
        Payload::Walk(f) => scored(&f.advances),
        Payload::Out(f) => match f.out_type {
            OutKind::DoublePlay | OutKind::TriplePlay => 0,
            _ => scored(&f.advances),
        },
        Payload::Strikeout(_)
        | Payload::Pitch(_)
        | Payload::Baserunning(_)
        | Payload::Substitution(_)
        | Payload::HalfInning(_)
        | Payload::GameEnd(_) => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> PlayContext {
        PlayContext {
            inning: 5,
            half: Half::Bottom,
            outs_before: 1,
            batter_id: Some(PlayerId::new("h3")),
            pitcher_id: Some(PlayerId::new("ap")),
        }
    }

    fn score_from_third() -> Advance {
        Advance::new(PlayerId::new("h1"), 3, 4)
    }

    #[test]
    fn payload_kind_matches_serialized_tag() {
        let payload = Payload::HalfInning(HalfInningFacts {
            context: ctx(),
            placed: vec![],
        });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], payload.kind());
    }

    #[test]
    fn hit_runs_credit_rbis() {
        let payload = Payload::Hit(HitFacts {
            context: ctx(),
            hit: HitKind::Double,
            advances: vec![
                score_from_third(),
                Advance::new(PlayerId::new("h3"), 0, 2),
            ],
        });
        assert_eq!(credited_rbis(&payload), 1);
    }

    #[test]
    fn bases_loaded_walk_credits_one_rbi() {
        let payload = Payload::Walk(PlateFacts {
            context: ctx(),
            swinging: false,
            advances: vec![
                score_from_third(),
                Advance::new(PlayerId::new("h2"), 2, 3),
                Advance::new(PlayerId::new("h4"), 1, 2),
                Advance::new(PlayerId::new("h3"), 0, 1),
            ],
        });
        assert_eq!(credited_rbis(&payload), 1);
    }

    #[test]
    fn double_play_runs_credit_nothing() {
        let payload = Payload::Out(OutFacts {
            context: ctx(),
            out_type: OutKind::DoublePlay,
            runners_out: vec![PlayerId::new("h3"), PlayerId::new("h4")],
            advances: vec![score_from_third()],
        });
        assert_eq!(credited_rbis(&payload), 0);
    }

    #[test]
    fn error_and_baserunning_runs_credit_nothing() {
        let on_error = Payload::Hit(HitFacts {
            context: ctx(),
            hit: HitKind::Error,
            advances: vec![score_from_third()],
        });
        assert_eq!(credited_rbis(&on_error), 0);

        let wild_pitch = Payload::Baserunning(BaserunFacts {
            context: ctx(),
            action: BaserunAction::WildPitch,
            runner: Some(BaserunMove {
                runner_id: PlayerId::new("h1"),
                from_base: 3,
                to_base: 4,
            }),
            out: false,
        });
        assert_eq!(credited_rbis(&wild_pitch), 0);
    }

    #[test]
    fn groundout_run_credits_rbi() {
        let payload = Payload::Out(OutFacts {
            context: ctx(),
            out_type: OutKind::Groundout,
            runners_out: vec![PlayerId::new("h3")],
            advances: vec![score_from_third()],
        });
        assert_eq!(credited_rbis(&payload), 1);
    }
}
