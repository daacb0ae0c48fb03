//! Roster substitutions: pinch hitters and runners, pitching changes,
//! double switches, and designated-hitter bookkeeping.

use crate::event::{FieldPosition, Payload, SubstitutionFacts};
use crate::rules::GameRules;
use crate::state::{GameState, PlayerId, StateValidationError, Team, TeamSheet};

use super::{play_context, PlayTransition};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SubstitutionError {
    #[error("{player} has already left the game and cannot reenter")]
    Reentry { player: PlayerId },
    #[error("double switches are disabled in this rule set")]
    DoubleSwitchDisabled,
    #[error("invalid double-switch partner {partner}: {reason}")]
    InvalidPartner {
        partner: PlayerId,
        reason: &'static str,
    },
    #[error("{player} is not active for the {team} team")]
    NotActive { player: PlayerId, team: Team },
    #[error("{player} is already in the game")]
    AlreadyActive { player: PlayerId },
    #[error("substitution would forfeit the designated hitter ({rule})")]
    DhForfeited { rule: &'static str },
    #[error(transparent)]
    Invalid(#[from] StateValidationError),
}

/// A requested roster change, validated and applied as a transition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstitutionRequest {
    pub team: Team,
    pub outgoing: PlayerId,
    pub incoming: PlayerId,
    pub position: FieldPosition,
    pub double_switch_partner: Option<PlayerId>,
}

pub(crate) struct SubstitutionPlay {
    pub request: SubstitutionRequest,
}

fn is_active(sheet: &TeamSheet, player: &PlayerId) -> bool {
    sheet.lineup_slot(player).is_some()
        || sheet.pitcher == *player
        || sheet.designated_hitter.as_ref() == Some(player)
}

impl SubstitutionPlay {
    /// The non-strict move where the designated hitter takes a defensive
    /// position, forfeiting the DH for the rest of the game.
    fn dh_takes_field(&self, sheet: &TeamSheet) -> bool {
        sheet.designated_hitter.as_ref() == Some(&self.request.incoming)
            && self.request.position != FieldPosition::DesignatedHitter
    }

    /// The move where the new pitcher occupies a batting-order slot while
    /// a designated hitter is in effect. Forfeits the DH.
    fn pitcher_enters_order(&self, sheet: &TeamSheet) -> bool {
        sheet.designated_hitter.is_some()
            && self.request.position == FieldPosition::Pitcher
            && sheet.lineup_slot(&self.request.outgoing).is_some()
    }
}

impl PlayTransition for SubstitutionPlay {
    type Error = SubstitutionError;

    fn pre_validate(&self, state: &GameState, rules: &GameRules) -> Result<(), Self::Error> {
        let req = &self.request;
        let sheet = state.sheet(req.team);

        // DH rules come first: under strict scoring the designated hitter
        // never takes the field and the pitcher never enters the order.
        if self.dh_takes_field(sheet) {
            if rules.strict_mode {
                return Err(SubstitutionError::DhForfeited {
                    rule: "designated-hitter-taking-the-field",
                });
            }
            if sheet.lineup_slot(&req.outgoing).is_none() {
                return Err(SubstitutionError::NotActive {
                    player: req.outgoing.clone(),
                    team: req.team,
                });
            }
            return Ok(());
        }
        if self.pitcher_enters_order(sheet) && rules.strict_mode {
            return Err(SubstitutionError::DhForfeited {
                rule: "pitcher-entering-batting-order",
            });
        }

        if !is_active(sheet, &req.outgoing) {
            return Err(SubstitutionError::NotActive {
                player: req.outgoing.clone(),
                team: req.team,
            });
        }
        if is_active(sheet, &req.incoming) {
            return Err(SubstitutionError::AlreadyActive {
                player: req.incoming.clone(),
            });
        }
        if sheet.departed.contains(&req.incoming) && !rules.allow_reentry {
            return Err(SubstitutionError::Reentry {
                player: req.incoming.clone(),
            });
        }

        if let Some(partner) = &req.double_switch_partner {
            if !rules.allow_double_switch {
                return Err(SubstitutionError::DoubleSwitchDisabled);
            }
            if partner == &req.outgoing {
                return Err(SubstitutionError::InvalidPartner {
                    partner: partner.clone(),
                    reason: "partner must differ from the outgoing player",
                });
            }
            if sheet.lineup_slot(partner).is_none() {
                return Err(SubstitutionError::InvalidPartner {
                    partner: partner.clone(),
                    reason: "partner must hold a batting-order slot",
                });
            }
            if sheet.lineup_slot(&req.outgoing).is_none() {
                return Err(SubstitutionError::InvalidPartner {
                    partner: partner.clone(),
                    reason: "outgoing player must hold a batting-order slot",
                });
            }
        }

        Ok(())
    }

    fn apply(&self, state: &mut GameState, _rules: &GameRules) -> Result<Payload, Self::Error> {
        let req = &self.request;
        let context = play_context(state);
        let facts = SubstitutionFacts {
            context,
            team: req.team,
            outgoing_id: req.outgoing.clone(),
            incoming_id: req.incoming.clone(),
            position: req.position,
            double_switch_partner: req.double_switch_partner.clone(),
        };

        if self.dh_takes_field(state.sheet(req.team)) {
            // The DH keeps his own batting slot as a fielder; the pitcher
            // inherits the replaced fielder's slot and the DH role ends.
            let sheet = state.sheet_mut(req.team);
            let pitcher = sheet.pitcher.clone();
            if let Some(slot) = sheet.lineup_slot(&req.outgoing) {
                sheet.lineup[slot] = pitcher;
            }
            sheet.designated_hitter = None;
            sheet.departed.push(req.outgoing.clone());
            self.patch_live_ids(state);
            return Ok(Payload::Substitution(facts));
        }

        let forfeits_dh = self.pitcher_enters_order(state.sheet(req.team));
        let sheet = state.sheet_mut(req.team);

        if let Some(slot) = sheet.lineup_slot(&req.outgoing) {
            sheet.lineup[slot] = req.incoming.clone();
            if let Some(partner) = &req.double_switch_partner {
                if let Some(partner_slot) = sheet.lineup_slot(partner) {
                    sheet.lineup.swap(slot, partner_slot);
                }
            }
        }
        if sheet.pitcher == req.outgoing || req.position == FieldPosition::Pitcher {
            let replaced = std::mem::replace(&mut sheet.pitcher, req.incoming.clone());
            if replaced != req.outgoing {
                sheet.departed.push(replaced);
            }
        }
        if sheet.designated_hitter.as_ref() == Some(&req.outgoing) {
            sheet.designated_hitter = Some(req.incoming.clone());
        }
        if forfeits_dh {
            sheet.designated_hitter = None;
        }
        sheet.departed.push(req.outgoing.clone());

        // Pinch runner: carry the base occupancy over.
        let base = state
            .bases
            .runners()
            .into_iter()
            .find(|(_, occupant)| **occupant == req.outgoing)
            .map(|(base, _)| base);
        if let Some(base) = base {
            state.bases.take(base);
            state.bases.put(base, req.incoming.clone());
        }

        self.patch_live_ids(state);
        Ok(Payload::Substitution(facts))
    }

    fn post_validate(&self, state: &GameState, _rules: &GameRules) -> Result<(), Self::Error> {
        crate::state::validate_state(state)?;
        Ok(())
    }
}

impl SubstitutionPlay {
    /// Refreshes the at-the-plate and on-the-mound pointers after the
    /// sheets change.
    fn patch_live_ids(&self, state: &mut GameState) {
        if state.current_batter_id.as_ref() == Some(&self.request.outgoing) {
            state.current_batter_id = Some(state.batting_sheet().due_up().clone());
        }
        state.current_pitcher_id = Some(state.sheet(state.fielding_team).pitcher.clone());
    }
}
