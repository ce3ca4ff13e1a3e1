//! Gated skill tree and the equip loadout.
use crate::domain::{GameplayState, Rejection};

use super::transition;

/// Check whether `skill_id` could be unlocked right now.
///
/// Checks run in order: known node, not yet unlocked, prerequisites
/// unlocked, level, milestones, skill points.
pub fn evaluate_skill_unlock(state: &GameplayState, skill_id: &str) -> Result<(), Rejection> {
    let node = state
        .skills
        .nodes
        .get(skill_id)
        .ok_or_else(|| Rejection::UnknownSkill(skill_id.to_string()))?;
    if node.unlocked {
        return Err(Rejection::AlreadyUnlocked);
    }
    if let Some(missing) = node
        .requires
        .iter()
        .find(|req| !state.skills.nodes.get(*req).is_some_and(|n| n.unlocked))
    {
        return Err(Rejection::MissingPrerequisite(missing.clone()));
    }
    if state.progression.level < node.min_level {
        return Err(Rejection::LevelTooLow {
            required: node.min_level,
        });
    }
    if let Some(missing) = node
        .milestones
        .iter()
        .find(|m| !state.progression.milestones.contains(*m))
    {
        return Err(Rejection::MissingMilestone(missing.clone()));
    }
    if state.skills.points < node.cost {
        return Err(Rejection::InsufficientSkillPoints {
            required: node.cost,
            available: state.skills.points,
        });
    }
    Ok(())
}

/// Check whether `skill_id` could be equipped right now.
pub fn evaluate_skill_equip(state: &GameplayState, skill_id: &str) -> Result<(), Rejection> {
    let node = state
        .skills
        .nodes
        .get(skill_id)
        .ok_or_else(|| Rejection::UnknownSkill(skill_id.to_string()))?;
    if !node.unlocked {
        return Err(Rejection::NotUnlocked);
    }
    let equipped = &state.skills.loadout.equipped;
    if equipped.iter().any(|id| id == skill_id) {
        return Err(Rejection::AlreadyEquipped);
    }
    let capacity = state.constants.loadout_capacity;
    if equipped.len() >= capacity {
        return Err(Rejection::LoadoutFull { capacity });
    }
    let in_slot = equipped
        .iter()
        .filter_map(|id| state.skills.nodes.get(id))
        .filter(|n| n.slot == node.slot)
        .count();
    if in_slot >= state.constants.slot_caps.cap(node.slot) {
        return Err(Rejection::SlotFull {
            slot: format!("{:?}", node.slot).to_lowercase(),
        });
    }
    Ok(())
}

pub fn unlock_skill_node(state: &GameplayState, skill_id: &str) -> GameplayState {
    transition(state, |next| apply_unlock(next, skill_id))
}

pub fn equip_loadout_skill(state: &GameplayState, skill_id: &str) -> GameplayState {
    transition(state, |next| apply_equip(next, skill_id))
}

pub fn unequip_loadout_skill(state: &GameplayState, skill_id: &str) -> GameplayState {
    transition(state, |next| apply_unequip(next, skill_id))
}

/// Touches: skills.
pub(crate) fn apply_unlock(state: &mut GameplayState, skill_id: &str) -> Result<(), Rejection> {
    evaluate_skill_unlock(state, skill_id)?;
    let skills = &mut state.skills;
    if let Some(node) = skills.nodes.get_mut(skill_id) {
        node.unlocked = true;
        skills.points -= node.cost;
    }
    Ok(())
}

pub(crate) fn apply_equip(state: &mut GameplayState, skill_id: &str) -> Result<(), Rejection> {
    evaluate_skill_equip(state, skill_id)?;
    state.skills.loadout.equipped.push(skill_id.to_string());
    Ok(())
}

pub(crate) fn apply_unequip(state: &mut GameplayState, skill_id: &str) -> Result<(), Rejection> {
    let equipped = &mut state.skills.loadout.equipped;
    let index = equipped
        .iter()
        .position(|id| id == skill_id)
        .ok_or(Rejection::NotEquipped)?;
    equipped.remove(index);
    Ok(())
}
