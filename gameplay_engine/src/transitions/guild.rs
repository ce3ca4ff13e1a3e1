//! Guild operations scoring.
use crate::domain::GameplayState;
use crate::economy::award_credits;
use crate::progression::grant_xp;

use super::mutate;

pub fn advance_guild_operation(state: &GameplayState, impact: i64) -> GameplayState {
    mutate(state, |next| apply_operation(next, impact))
}

/// Touches: guild; on positive impact economy and progression.
pub(crate) fn apply_operation(state: &mut GameplayState, impact: i64) {
    state.guild.operations_score = state.guild.operations_score.saturating_add(impact);
    if impact > 0 {
        state.guild.events_completed += 1;
        award_credits(state, impact.saturating_mul(3), "guild_operation");
        grant_xp(state, impact.saturating_mul(6));
    }
}
