//! Asymmetric operator-vs-saboteur rounds over three gauges.
use crate::arithmetic::clamp;
use crate::domain::{GameplayState, OutcomeStatus, PvPAction, PvPSide, PvPState};
use crate::events::ActionContext;
use crate::outcome::record_outcome;
use crate::progression::grant_xp;

use super::mutate;

pub const DECIDING_ROUND: u32 = 10;
pub const ROUND_XP: i64 = 12;
pub const OPERATOR_VICTORY_XP: i64 = 72;

/// (stability, sabotage, fog) deltas for an action.
fn gauge_deltas(action: PvPAction) -> (i64, i64, i64) {
    match action {
        PvPAction::Sabotage => (-11, 13, 9),
        PvPAction::Stabilize => (14, -8, -6),
        PvPAction::Scan => (3, -4, -16),
    }
}

/// Winner after a round, if any. Ties at the deciding round go to the operator.
pub fn decide_winner(pvp: &PvPState) -> Option<PvPSide> {
    if pvp.stability <= 0 {
        Some(PvPSide::Saboteur)
    } else if pvp.sabotage <= 0 {
        Some(PvPSide::Operator)
    } else if pvp.round >= DECIDING_ROUND {
        if pvp.stability >= pvp.sabotage {
            Some(PvPSide::Operator)
        } else {
            Some(PvPSide::Saboteur)
        }
    } else {
        None
    }
}

/// Play one round. Rounds keep counting after a winner is decided; the
/// winner only changes when a later round meets another terminal condition.
pub fn run_pvp_round(state: &GameplayState, ctx: &ActionContext, action: PvPAction) -> GameplayState {
    mutate(state, |next| apply_round(next, ctx, action))
}

/// Touches: pvp, progression, outcome.
pub(crate) fn apply_round(state: &mut GameplayState, ctx: &ActionContext, action: PvPAction) {
    let (stability, sabotage, fog) = gauge_deltas(action);
    let pvp = &mut state.pvp;
    pvp.stability = clamp(pvp.stability + stability, 0, 100);
    pvp.sabotage = clamp(pvp.sabotage + sabotage, 0, 100);
    pvp.fog = clamp(pvp.fog + fog, 0, 100);
    pvp.round += 1;
    let decided = decide_winner(pvp);
    if let Some(side) = decided {
        pvp.winner = Some(side);
    }
    let round = pvp.round;

    grant_xp(state, ROUND_XP);
    match decided {
        Some(PvPSide::Operator) => {
            grant_xp(state, OPERATOR_VICTORY_XP);
            record_outcome(
                state,
                ctx,
                OutcomeStatus::Win,
                format!("Operators held the line in round {round}"),
            );
        }
        Some(PvPSide::Saboteur) => {
            record_outcome(
                state,
                ctx,
                OutcomeStatus::Loss,
                format!("Saboteurs collapsed stability in round {round}"),
            );
        }
        None => {}
    }
}
