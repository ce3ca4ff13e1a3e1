//! Cooperative raid: party roster, shared objectives and role abilities.
use crate::arithmetic::clamp;
use crate::catalog::{role_ability, role_name};
use crate::domain::{GameplayState, OutcomeStatus, RaidAbility, RaidRole, RaidState, Rejection};
use crate::economy::award_credits;
use crate::events::ActionContext;
use crate::outcome::record_outcome;
use crate::progression::grant_xp;

use super::transition;

pub const RAID_COMPLETION_CREDITS: i64 = 140;
pub const RAID_COMPLETION_XP: i64 = 60;

const FOCUS_MARK_PROGRESS: i64 = 12;
const SHIELD_STABILITY: i64 = 8;
const SCAN_FOG: i64 = 15;
const CHAOS_SABOTAGE: i64 = 10;

/// Add `member` with `role`, or change an existing member's role.
pub fn join_raid(state: &GameplayState, member: &str, role: RaidRole) -> GameplayState {
    transition(state, |next| apply_join(next, member, role))
}

pub fn advance_raid_objective(
    state: &GameplayState,
    ctx: &ActionContext,
    objective_id: &str,
    delta: i64,
) -> GameplayState {
    transition(state, |next| apply_objective_progress(next, ctx, objective_id, delta))
}

pub fn use_raid_ability(
    state: &GameplayState,
    ctx: &ActionContext,
    member: &str,
    ability: RaidAbility,
) -> GameplayState {
    transition(state, |next| apply_ability(next, ctx, member, ability))
}

/// Recompute per-objective and raid-wide completion from progress.
pub fn refresh_raid_completion(raid: &mut RaidState) {
    for objective in &mut raid.objectives {
        objective.completed = objective.progress >= objective.target;
    }
    raid.completed = !raid.objectives.is_empty() && raid.objectives.iter().all(|o| o.completed);
}

/// Touches: raid.
pub(crate) fn apply_join(
    state: &mut GameplayState,
    member: &str,
    role: RaidRole,
) -> Result<(), Rejection> {
    let member = member.trim();
    if member.is_empty() {
        return Err(Rejection::BlankMember);
    }
    let raid = &mut state.raid;
    if !raid.party.iter().any(|m| m == member) {
        let max = state.constants.max_party_size;
        if raid.party.len() >= max {
            return Err(Rejection::PartyFull { max });
        }
        raid.party.push(member.to_string());
    }
    raid.roles.insert(member.to_string(), role);
    Ok(())
}

/// Touches: raid; on completion economy, progression, outcome.
pub(crate) fn apply_objective_progress(
    state: &mut GameplayState,
    ctx: &ActionContext,
    objective_id: &str,
    delta: i64,
) -> Result<(), Rejection> {
    let index = state
        .raid
        .objectives
        .iter()
        .position(|o| o.id == objective_id)
        .ok_or_else(|| Rejection::UnknownObjective(objective_id.to_string()))?;
    bump_objective(state, ctx, index, delta);
    Ok(())
}

/// Shift one objective's progress and settle raid completion.
pub(crate) fn bump_objective(
    state: &mut GameplayState,
    ctx: &ActionContext,
    index: usize,
    delta: i64,
) {
    let was_completed = state.raid.completed;
    if let Some(objective) = state.raid.objectives.get_mut(index) {
        objective.progress = clamp(objective.progress.saturating_add(delta), 0, objective.target);
    }
    refresh_raid_completion(&mut state.raid);

    if state.raid.completed && !was_completed {
        award_credits(state, RAID_COMPLETION_CREDITS, "raid_complete");
        grant_xp(state, RAID_COMPLETION_XP);
        record_outcome(state, ctx, OutcomeStatus::Win, "All raid objectives complete");
    }
}

/// Touches: raid.cooldowns plus the ability's target slice.
pub(crate) fn apply_ability(
    state: &mut GameplayState,
    ctx: &ActionContext,
    member: &str,
    ability: RaidAbility,
) -> Result<(), Rejection> {
    let member = member.trim();
    let role = *state
        .raid
        .roles
        .get(member)
        .filter(|_| state.raid.party.iter().any(|m| m == member))
        .ok_or_else(|| Rejection::NotInParty(member.to_string()))?;
    let (granted, cooldown) = role_ability(role);
    if ability != granted {
        return Err(Rejection::AbilityNotForRole {
            ability: ability.as_str().to_string(),
            role: role_name(role).to_string(),
        });
    }

    let key = format!("{member}:{}", ability.as_str());
    let round = state.pvp.round;
    let ready_round = state.raid.cooldowns.get(&key).copied().unwrap_or(0);
    if round < ready_round {
        return Err(Rejection::AbilityOnCooldown { ready_round });
    }
    state.raid.cooldowns.insert(key, round + cooldown);

    match ability {
        RaidAbility::FocusMark => bump_objective(state, ctx, 0, FOCUS_MARK_PROGRESS),
        RaidAbility::StabilityShield => {
            state.pvp.stability = clamp(state.pvp.stability + SHIELD_STABILITY, 0, 100);
        }
        RaidAbility::ScanPulse => {
            state.pvp.fog = clamp(state.pvp.fog - SCAN_FOG, 0, 100);
        }
        RaidAbility::ChaosSpike => {
            state.pvp.sabotage = clamp(state.pvp.sabotage + CHAOS_SABOTAGE, 0, 100);
        }
    }
    Ok(())
}
