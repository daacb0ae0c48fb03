//! Per-game rule configuration.
//!
//! A [`GameRules`] value is built once at game start and never changes for
//! the game's duration. Presets are ordinary factory constructors, not
//! process-wide singletons, so multiple configurations can coexist in one
//! process (e.g. concurrent simulations).

use serde::{Deserialize, Serialize};

/// Extra-inning tiebreaker runner placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tiebreaker {
    None,
    RunnerOnSecond,
    RunnersOnFirstAndSecond,
}

/// Early-termination rule for lopsided games.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MercyRule {
    /// Run differential at which the game ends.
    pub threshold: u32,
    /// Earliest inning the rule applies.
    pub min_inning: u8,
}

/// Immutable rule switches for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Opaque edition tag recorded on the state as `rules_version`. Governs
    /// how ambiguous derived statistics are interpreted on replay.
    pub version: String,
    pub designated_hitter: bool,
    /// Regulation length in innings.
    pub max_innings: u8,
    pub extra_innings_tiebreaker: Tiebreaker,
    pub mercy_rule: Option<MercyRule>,
    /// Extra innings beyond regulation before the game is recorded as a
    /// suspended tie. `None` plays on indefinitely.
    pub max_extra_innings: Option<u8>,
    pub allow_stealing: bool,
    pub allow_balk: bool,
    pub allow_wild_pitch: bool,
    pub allow_passed_ball: bool,
    pub allow_double_switch: bool,
    pub allow_reentry: bool,
    /// When set, designated-hitter loss conditions reject the substitution
    /// instead of silently forfeiting the DH.
    pub strict_mode: bool,
}

impl GameRules {
    /// Professional configuration: nine innings, DH, tiebreaker runner on
    /// second in extras, no mercy rule, no reentry.
    pub fn professional() -> Self {
        Self {
            version: "pro-1".to_string(),
            designated_hitter: true,
            max_innings: 9,
            extra_innings_tiebreaker: Tiebreaker::RunnerOnSecond,
            mercy_rule: None,
            max_extra_innings: None,
            allow_stealing: true,
            allow_balk: true,
            allow_wild_pitch: true,
            allow_passed_ball: true,
            allow_double_switch: true,
            allow_reentry: false,
            strict_mode: true,
        }
    }

    /// Youth configuration: six innings, mercy rule, free reentry, lenient
    /// substitution handling.
    pub fn youth() -> Self {
        Self {
            version: "youth-1".to_string(),
            designated_hitter: true,
            max_innings: 6,
            extra_innings_tiebreaker: Tiebreaker::RunnersOnFirstAndSecond,
            mercy_rule: Some(MercyRule {
                threshold: 10,
                min_inning: 4,
            }),
            max_extra_innings: Some(2),
            allow_stealing: false,
            allow_balk: false,
            allow_wild_pitch: true,
            allow_passed_ball: true,
            allow_double_switch: false,
            allow_reentry: true,
            strict_mode: false,
        }
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self::professional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_are_independent_values() {
        let a = GameRules::professional();
        let mut b = GameRules::professional();
        b.max_innings = 7;
        assert_eq!(a.max_innings, 9);
        assert_ne!(a, b);
    }

    #[test]
    fn youth_preset_enables_mercy_rule() {
        let rules = GameRules::youth();
        assert_eq!(
            rules.mercy_rule,
            Some(MercyRule {
                threshold: 10,
                min_inning: 4
            })
        );
        assert!(!rules.allow_stealing);
        assert!(rules.allow_reentry);
    }
}
