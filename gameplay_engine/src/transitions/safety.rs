//! Player safety: mute, block and report.
use crate::domain::{GameplayState, Rejection, SafetyReport};
use crate::events::ActionContext;
use crate::state::REPORT_LIMIT;

use super::transition;

fn normalize_target(target: &str) -> Result<String, Rejection> {
    match target.trim() {
        "" => Err(Rejection::BlankTarget),
        trimmed => Ok(trimmed.to_lowercase()),
    }
}

pub fn mute_player(state: &GameplayState, target: &str) -> GameplayState {
    transition(state, |next| apply_mute(next, target))
}

/// Blocking also mutes.
pub fn block_player(state: &GameplayState, target: &str) -> GameplayState {
    transition(state, |next| apply_block(next, target))
}

pub fn report_player(
    state: &GameplayState,
    ctx: &ActionContext,
    target: &str,
    reason: &str,
) -> GameplayState {
    transition(state, |next| apply_report(next, ctx, target, reason))
}

/// Touches: safety.
pub(crate) fn apply_mute(state: &mut GameplayState, target: &str) -> Result<(), Rejection> {
    let target = normalize_target(target)?;
    state.safety.muted_player_ids.insert(target);
    Ok(())
}

pub(crate) fn apply_block(state: &mut GameplayState, target: &str) -> Result<(), Rejection> {
    let target = normalize_target(target)?;
    state.safety.muted_player_ids.insert(target.clone());
    state.safety.blocked_player_ids.insert(target);
    Ok(())
}

pub(crate) fn apply_report(
    state: &mut GameplayState,
    ctx: &ActionContext,
    target: &str,
    reason: &str,
) -> Result<(), Rejection> {
    let target = normalize_target(target)?;
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(Rejection::BlankReason);
    }
    let safety = &mut state.safety;
    safety.reports_filed += 1;
    safety.reports.insert(
        0,
        SafetyReport {
            id: format!("report-{}", safety.reports_filed),
            target_player_id: target,
            reporter_player_id: ctx.actor.clone(),
            reason: reason.to_string(),
            created_at: ctx.at,
        },
    );
    safety.reports.truncate(REPORT_LIMIT);
    Ok(())
}
