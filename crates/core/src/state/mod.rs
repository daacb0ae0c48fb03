//! Authoritative game state representation.
//!
//! [`GameState`] is an immutable value: the engine never mutates a state in
//! place, it derives the next value from the previous one. Any past state can
//! therefore be held, cloned, and re-simulated independently with no
//! coordination between callers.

mod validate;

pub use validate::{validate_state, StateValidationError};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventRef;
use crate::rules::GameRules;

/// Base index for the batter in runner-advance records.
pub const BATTER: u8 = 0;
/// Base index for first base.
pub const FIRST_BASE: u8 = 1;
/// Base index for second base.
pub const SECOND_BASE: u8 = 2;
/// Base index for third base.
pub const THIRD_BASE: u8 = 3;
/// Base index for home plate; an advance to home scores a run.
pub const HOME_PLATE: u8 = 4;

/// Opaque player identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Team tag. The two tags are the only teams a game ever knows about.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Team {
    Home,
    Away,
}

impl Team {
    pub fn opponent(self) -> Team {
        match self {
            Team::Home => Team::Away,
            Team::Away => Team::Home,
        }
    }
}

/// Which half of the inning is being played. Away bats in the top.
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
pub enum Half {
    Top,
    Bottom,
}

impl Half {
    pub fn batting_team(self) -> Team {
        match self {
            Half::Top => Team::Away,
            Half::Bottom => Team::Home,
        }
    }
}

/// Game lifecycle status. Terminal at `final`.
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
pub enum GameStatus {
    InProgress,
    Final,
    Suspended,
}

/// Per-team run counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn team(&self, team: Team) -> u32 {
        match team {
            Team::Home => self.home,
            Team::Away => self.away,
        }
    }

    pub fn add(&mut self, team: Team, runs: u32) {
        match team {
            Team::Home => self.home += runs,
            Team::Away => self.away += runs,
        }
    }

    pub fn differential(&self) -> u32 {
        self.home.abs_diff(self.away)
    }

    /// Leading team, or `None` when tied.
    pub fn leader(&self) -> Option<Team> {
        match self.home.cmp(&self.away) {
            std::cmp::Ordering::Greater => Some(Team::Home),
            std::cmp::Ordering::Less => Some(Team::Away),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// The three bases, ordered first/second/third. A slot holds the occupying
/// runner's identifier; the same runner never occupies two slots.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bases {
    pub first: Option<PlayerId>,
    pub second: Option<PlayerId>,
    pub third: Option<PlayerId>,
}

impl Bases {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none() && self.second.is_none() && self.third.is_none()
    }

    pub fn is_loaded(&self) -> bool {
        self.first.is_some() && self.second.is_some() && self.third.is_some()
    }

    /// Runner at a base index (1..=3). Index 0 (batter) and 4 (home) hold
    /// nobody by definition.
    pub fn runner(&self, base: u8) -> Option<&PlayerId> {
        match base {
            FIRST_BASE => self.first.as_ref(),
            SECOND_BASE => self.second.as_ref(),
            THIRD_BASE => self.third.as_ref(),
            _ => None,
        }
    }

    /// Removes and returns the runner at a base index (1..=3).
    pub fn take(&mut self, base: u8) -> Option<PlayerId> {
        match base {
            FIRST_BASE => self.first.take(),
            SECOND_BASE => self.second.take(),
            THIRD_BASE => self.third.take(),
            _ => None,
        }
    }

    /// Places a runner on a base index (1..=3). Indices outside the bases are
    /// ignored: an advance to home is a run, not an occupancy.
    pub fn put(&mut self, base: u8, runner: PlayerId) {
        match base {
            FIRST_BASE => self.first = Some(runner),
            SECOND_BASE => self.second = Some(runner),
            THIRD_BASE => self.third = Some(runner),
            _ => {}
        }
    }

    pub fn contains(&self, runner: &PlayerId) -> bool {
        [&self.first, &self.second, &self.third]
            .into_iter()
            .any(|slot| slot.as_ref() == Some(runner))
    }

    /// Occupied bases as `(base_index, runner)` pairs, first base outward.
    pub fn runners(&self) -> Vec<(u8, &PlayerId)> {
        let mut out = Vec::with_capacity(3);
        if let Some(r) = &self.first {
            out.push((FIRST_BASE, r));
        }
        if let Some(r) = &self.second {
            out.push((SECOND_BASE, r));
        }
        if let Some(r) = &self.third {
            out.push((THIRD_BASE, r));
        }
        out
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Roster bookkeeping for one team: exactly nine ordered lineup slots, the
/// current pitcher, the optional designated hitter, and every player who has
/// left the game (reentry enforcement).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub lineup: [PlayerId; 9],
    /// Slot (0..=8) of the batter due up.
    pub lineup_index: u8,
    pub pitcher: PlayerId,
    pub designated_hitter: Option<PlayerId>,
    pub departed: Vec<PlayerId>,
}

impl TeamSheet {
    pub fn new(lineup: [PlayerId; 9], pitcher: PlayerId) -> Self {
        Self {
            lineup,
            lineup_index: 0,
            pitcher,
            designated_hitter: None,
            departed: Vec::new(),
        }
    }

    pub fn with_designated_hitter(mut self, dh: PlayerId) -> Self {
        self.designated_hitter = Some(dh);
        self
    }

    /// Batter due up in this sheet's order.
    pub fn due_up(&self) -> &PlayerId {
        &self.lineup[usize::from(self.lineup_index) % 9]
    }

    /// Batter `n` slots before the one due up (wrapping).
    pub fn previous_batter(&self, n: u8) -> &PlayerId {
        let idx = (usize::from(self.lineup_index) + 9 - usize::from(n % 9)) % 9;
        &self.lineup[idx]
    }

    pub fn lineup_slot(&self, player: &PlayerId) -> Option<usize> {
        self.lineup.iter().position(|p| p == player)
    }

    pub fn advance_order(&mut self) {
        self.lineup_index = (self.lineup_index + 1) % 9;
    }
}

/// Canonical snapshot of the deterministic game state.
///
/// Created once at game start; every subsequent instance is derived by the
/// engine. `batting_team` and `fielding_team` are always the two distinct
/// tags, `outs`/`balls`/`strikes` stay in range, and `bases` never holds the
/// same runner twice — [`validate_state`] enforces all of it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// 1-based inning number.
    pub inning: u8,
    pub half: Half,
    /// Outs in the current half-inning (0..=2).
    pub outs: u8,
    /// Balls on the current batter (0..=3).
    pub balls: u8,
    /// Strikes on the current batter (0..=2).
    pub strikes: u8,
    pub bases: Bases,
    pub score: Score,
    pub batting_team: Team,
    pub fielding_team: Team,
    pub current_batter_id: Option<PlayerId>,
    pub current_pitcher_id: Option<PlayerId>,
    pub home: TeamSheet,
    pub away: TeamSheet,
    pub game_status: GameStatus,
    /// Opaque tag naming the rules edition this game was scored under.
    pub rules_version: String,
    /// Append-only references to every event this state descends from.
    pub event_history: Vec<EventRef>,
}

impl GameState {
    /// Initial state: top of the first, away team batting, scoreless.
    pub fn new(
        home: TeamSheet,
        away: TeamSheet,
        rules: &GameRules,
    ) -> Result<Self, StateValidationError> {
        let state = Self {
            inning: 1,
            half: Half::Top,
            outs: 0,
            balls: 0,
            strikes: 0,
            bases: Bases::empty(),
            score: Score::default(),
            batting_team: Team::Away,
            fielding_team: Team::Home,
            current_batter_id: Some(away.due_up().clone()),
            current_pitcher_id: Some(home.pitcher.clone()),
            home,
            away,
            game_status: GameStatus::InProgress,
            rules_version: rules.version.clone(),
            event_history: Vec::new(),
        };
        validate_state(&state)?;
        Ok(state)
    }

    pub fn sheet(&self, team: Team) -> &TeamSheet {
        match team {
            Team::Home => &self.home,
            Team::Away => &self.away,
        }
    }

    pub fn sheet_mut(&mut self, team: Team) -> &mut TeamSheet {
        match team {
            Team::Home => &mut self.home,
            Team::Away => &mut self.away,
        }
    }

    pub fn batting_sheet(&self) -> &TeamSheet {
        self.sheet(self.batting_team)
    }

    pub fn is_final(&self) -> bool {
        self.game_status == GameStatus::Final
    }

    /// Completes a plate appearance: resets the count and rotates the
    /// batting order to the next slot.
    pub(crate) fn complete_plate_appearance(&mut self) {
        self.balls = 0;
        self.strikes = 0;
        let batting = self.batting_team;
        self.sheet_mut(batting).advance_order();
        self.current_batter_id = Some(self.sheet(batting).due_up().clone());
    }
}
