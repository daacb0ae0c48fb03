//! Hit and out resolution for balls in play.

use crate::event::{Advance, HitFacts, HitKind, OutFacts, OutKind, Payload, PlayContext};
use crate::rules::GameRules;
use crate::state::{Bases, GameState, PlayerId, BATTER, HOME_PLATE};

use super::pitch::PitchError;
use super::{inning, BattedBall};

/// Resolves a batted ball into a hit or out payload, mutating the working
/// state: runner advances, scoring, out accounting, and — when the third
/// out falls — the half-inning transition.
pub(crate) fn resolve(
    state: &mut GameState,
    rules: &GameRules,
    batted: BattedBall,
    manual: Option<Vec<Advance>>,
    context: PlayContext,
) -> Result<Payload, PitchError> {
    let batter = context.batter_id.clone().ok_or(PitchError::NoBatter)?;

    if let Some(hit) = batted.hit_kind() {
        return Ok(resolve_hit(state, &batter, hit, manual, context));
    }
    let out_type = batted.out_kind().ok_or(PitchError::MissingBattedBall)?;
    resolve_out(state, rules, &batter, out_type, manual, context)
}

fn resolve_hit(
    state: &mut GameState,
    batter: &PlayerId,
    hit: HitKind,
    manual: Option<Vec<Advance>>,
    context: PlayContext,
) -> Payload {
    // A home run empties the bases regardless of any manual advances.
    let advances = if hit == HitKind::HomeRun {
        clear_the_bases(&state.bases, batter)
    } else {
        manual.unwrap_or_else(|| default_hit_advances(&state.bases, batter, hit))
    };
    apply_advances(state, &advances, true);
    state.complete_plate_appearance();
    Payload::Hit(HitFacts {
        context,
        hit,
        advances,
    })
}

fn resolve_out(
    state: &mut GameState,
    rules: &GameRules,
    batter: &PlayerId,
    out_type: OutKind,
    manual: Option<Vec<Advance>>,
    context: PlayContext,
) -> Result<Payload, PitchError> {
    let runners_out = select_runners_out(&state.bases, batter, out_type)?;
    for runner in &runners_out {
        let base = state
            .bases
            .runners()
            .into_iter()
            .find(|(_, occupant)| *occupant == runner)
            .map(|(base, _)| base);
        if let Some(base) = base {
            state.bases.take(base);
        }
    }

    let advances = manual.unwrap_or_default();
    // A run never scores on the play that ends the half-inning with a
    // force; reaching three outs negates any advance to home.
    let ends_half = state.outs + out_type.outs() >= 3;
    apply_advances(state, &advances, !ends_half);

    state.complete_plate_appearance();
    inning::add_outs(state, rules, out_type.outs());

    Ok(Payload::Out(OutFacts {
        context,
        out_type,
        runners_out,
        advances,
    }))
}

/// Moves runners per the advance list, scoring every advance to home for
/// the batting team (unless negated by the half-ending out). Advances are
/// applied lead runner first so a trailing runner never lands on an
/// occupied base.
pub(crate) fn apply_advances(state: &mut GameState, advances: &[Advance], score_runs: bool) {
    let mut ordered: Vec<&Advance> = advances.iter().collect();
    ordered.sort_by(|a, b| b.from_base.cmp(&a.from_base));

    let batting = state.batting_team;
    for advance in ordered {
        let runner = if advance.from_base == BATTER {
            advance.runner_id.clone()
        } else {
            match state.bases.take(advance.from_base) {
                Some(runner) => runner,
                None => continue,
            }
        };
        if advance.to_base == HOME_PLATE {
            if score_runs {
                state.score.add(batting, 1);
            }
        } else {
            state.bases.put(advance.to_base, runner);
        }
    }
}

/// Default advance policy: every runner moves as many bases as the hit is
/// worth (one for a single or an error), capped at home; the batter takes
/// the hit's base. Callers override with manual advances for anything else.
fn default_hit_advances(bases: &Bases, batter: &PlayerId, hit: HitKind) -> Vec<Advance> {
    let worth: u8 = match hit {
        HitKind::Single | HitKind::Error => 1,
        HitKind::Double | HitKind::GroundRuleDouble => 2,
        HitKind::Triple => 3,
        HitKind::HomeRun => 4,
    };
    let mut advances: Vec<Advance> = bases
        .runners()
        .into_iter()
        .rev()
        .map(|(base, runner)| {
            Advance::new(runner.clone(), base, (base + worth).min(HOME_PLATE))
        })
        .collect();
    advances.push(Advance::new(batter.clone(), BATTER, worth.min(HOME_PLATE)));
    advances
}

fn clear_the_bases(bases: &Bases, batter: &PlayerId) -> Vec<Advance> {
    let mut advances: Vec<Advance> = bases
        .runners()
        .into_iter()
        .rev()
        .map(|(base, runner)| Advance::new(runner.clone(), base, HOME_PLATE))
        .collect();
    advances.push(Advance::new(batter.clone(), BATTER, HOME_PLATE));
    advances
}

/// Runners forced to advance by the batter becoming a runner: the chain of
/// occupied bases starting at first.
fn forced_runners(bases: &Bases) -> Vec<(u8, PlayerId)> {
    let mut forced = Vec::new();
    if let Some(on_first) = &bases.first {
        forced.push((1, on_first.clone()));
        if let Some(on_second) = &bases.second {
            forced.push((2, on_second.clone()));
            if let Some(on_third) = &bases.third {
                forced.push((3, on_third.clone()));
            }
        }
    }
    forced
}

/// Which runners are retired on the play. Single outs retire the batter;
/// multi-out plays additionally retire the lead forced runner(s).
fn select_runners_out(
    bases: &Bases,
    batter: &PlayerId,
    out_type: OutKind,
) -> Result<Vec<PlayerId>, PitchError> {
    match out_type {
        OutKind::Groundout | OutKind::Flyout | OutKind::Lineout | OutKind::Popout => {
            Ok(vec![batter.clone()])
        }
        OutKind::DoublePlay => {
            let forced = forced_runners(bases);
            let (_, lead) = forced.last().ok_or(PitchError::DoublePlayNeedsForce)?;
            Ok(vec![lead.clone(), batter.clone()])
        }
        OutKind::TriplePlay => {
            let forced = forced_runners(bases);
            if forced.len() < 2 {
                return Err(PitchError::TriplePlayNeedsForce);
            }
            let mut out: Vec<PlayerId> = forced[forced.len() - 2..]
                .iter()
                .map(|(_, runner)| runner.clone())
                .collect();
            out.push(batter.clone());
            Ok(out)
        }
    }
}
