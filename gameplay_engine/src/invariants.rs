/// Gameplay Engine: Invariant Checks
///
/// Global invariants of `GameplayState`. `validate_invariants` panics on
/// the first failure and is run by the engine after every transition;
/// `try_validate_invariants` reports it instead and is used when a
/// persisted state is loaded.
use std::collections::BTreeSet;

use thiserror::Error;

use crate::arithmetic::PLAYHEAD_MAX_MS;
use crate::catalog::MUTATOR_WINDOW;
use crate::domain::GameplayState;
use crate::economy::inflation_index;
use crate::progression::XP_PER_LEVEL;
use crate::state::{
    CINEMATIC_QUEUE_LIMIT, LEDGER_LIMIT, PRIMARY_FORK_ID, REPORT_LIMIT, REWARD_HISTORY_LIMIT,
    TUNING_HISTORY_LIMIT,
};
use crate::transitions::boss::phase_for;
use crate::transitions::liveops::{DIFFICULTY_RANGE, REWARD_RANGE};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[invariant:{name}] {detail}")]
pub struct InvariantViolation {
    pub name: &'static str,
    pub detail: String,
}

type Check = fn(&GameplayState) -> Result<(), InvariantViolation>;

const CHECKS: [Check; 14] = [
    check_objectives,
    check_party,
    check_campaign,
    check_narrative,
    check_skill_prerequisites,
    check_loadout,
    check_pvp_gauges,
    check_timeline,
    check_boss,
    check_director,
    check_economy,
    check_progression,
    check_liveops,
    check_bounded_logs,
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run every invariant check. Panics on the first failure.
pub fn validate_invariants(state: &GameplayState) {
    if let Err(violation) = try_validate_invariants(state) {
        panic!("Invariant violation: {violation}");
    }
}

/// Non-panicking variant of `validate_invariants`.
pub fn try_validate_invariants(state: &GameplayState) -> Result<(), InvariantViolation> {
    CHECKS.iter().try_for_each(|check| check(state))
}

// ---------------------------------------------------------------------------
// Individual checks (private)
// ---------------------------------------------------------------------------

fn violation(name: &'static str, detail: impl Into<String>) -> InvariantViolation {
    InvariantViolation {
        name,
        detail: detail.into(),
    }
}

fn ensure(
    condition: bool,
    name: &'static str,
    detail: impl FnOnce() -> String,
) -> Result<(), InvariantViolation> {
    if condition {
        Ok(())
    } else {
        Err(violation(name, detail()))
    }
}

fn check_objectives(state: &GameplayState) -> Result<(), InvariantViolation> {
    for o in &state.raid.objectives {
        ensure(o.progress >= 0 && o.progress <= o.target, "objective_bounds", || {
            format!("{} progress {} outside [0, {}]", o.id, o.progress, o.target)
        })?;
        ensure(o.completed == (o.progress >= o.target), "objective_completion", || {
            format!("{} completed flag disagrees with progress", o.id)
        })?;
    }
    let all_done = !state.raid.objectives.is_empty()
        && state.raid.objectives.iter().all(|o| o.completed);
    ensure(state.raid.completed == all_done, "raid_completion", || {
        "raid completed flag disagrees with objectives".to_string()
    })
}

fn check_party(state: &GameplayState) -> Result<(), InvariantViolation> {
    let raid = &state.raid;
    let unique: BTreeSet<&String> = raid.party.iter().collect();
    ensure(unique.len() == raid.party.len(), "party_unique", || {
        "duplicate party member".to_string()
    })?;
    ensure(
        raid.party.len() <= state.constants.max_party_size,
        "party_size",
        || format!("{} members exceeds {}", raid.party.len(), state.constants.max_party_size),
    )?;
    for member in &raid.party {
        ensure(raid.roles.contains_key(member), "party_roles", || {
            format!("{member} has no role")
        })?;
    }
    Ok(())
}

fn check_campaign(state: &GameplayState) -> Result<(), InvariantViolation> {
    let campaign = &state.campaign;
    ensure(campaign.lives <= state.constants.max_lives, "campaign_lives", || {
        format!("{} lives exceeds {}", campaign.lives, state.constants.max_lives)
    })?;
    let unique: BTreeSet<&String> = campaign.mutators.iter().collect();
    ensure(
        unique.len() == campaign.mutators.len() && campaign.mutators.len() <= MUTATOR_WINDOW,
        "campaign_mutators",
        || format!("mutators {:?} not unique or over window", campaign.mutators),
    )
}

fn check_narrative(state: &GameplayState) -> Result<(), InvariantViolation> {
    let narrative = &state.narrative;
    ensure(
        narrative.nodes.contains_key(&narrative.current_node_id),
        "narrative_node",
        || format!("current node {} missing", narrative.current_node_id),
    )?;
    ensure((0..=100).contains(&narrative.tension), "narrative_tension", || {
        format!("tension {} outside [0, 100]", narrative.tension)
    })
}

fn check_skill_prerequisites(state: &GameplayState) -> Result<(), InvariantViolation> {
    let nodes = &state.skills.nodes;
    for node in nodes.values().filter(|n| n.unlocked) {
        for req in &node.requires {
            ensure(nodes.get(req).is_some_and(|r| r.unlocked), "skill_prerequisites", || {
                format!("{} unlocked without {}", node.id, req)
            })?;
        }
    }
    Ok(())
}

fn check_loadout(state: &GameplayState) -> Result<(), InvariantViolation> {
    let equipped = &state.skills.loadout.equipped;
    let nodes = &state.skills.nodes;
    let unique: BTreeSet<&String> = equipped.iter().collect();
    ensure(unique.len() == equipped.len(), "loadout_unique", || {
        "skill equipped twice".to_string()
    })?;
    ensure(
        equipped.len() <= state.constants.loadout_capacity,
        "loadout_capacity",
        || format!("{} equipped exceeds capacity", equipped.len()),
    )?;
    for id in equipped {
        let node = nodes.get(id).filter(|n| n.unlocked);
        ensure(node.is_some(), "loadout_subset", || {
            format!("{id} equipped but not unlocked")
        })?;
    }
    for node in nodes.values() {
        let in_slot = equipped
            .iter()
            .filter_map(|id| nodes.get(id))
            .filter(|n| n.slot == node.slot)
            .count();
        ensure(
            in_slot <= state.constants.slot_caps.cap(node.slot),
            "loadout_slot_cap",
            || format!("{:?} slot over cap", node.slot),
        )?;
    }
    Ok(())
}

fn check_pvp_gauges(state: &GameplayState) -> Result<(), InvariantViolation> {
    let pvp = &state.pvp;
    for (gauge, value) in [
        ("stability", pvp.stability),
        ("sabotage", pvp.sabotage),
        ("fog", pvp.fog),
    ] {
        ensure((0..=100).contains(&value), "pvp_gauges", || {
            format!("{gauge} {value} outside [0, 100]")
        })?;
    }
    Ok(())
}

fn check_timeline(state: &GameplayState) -> Result<(), InvariantViolation> {
    let time = &state.time;
    ensure(
        time.forks.iter().any(|f| f.id == PRIMARY_FORK_ID),
        "primary_fork",
        || "primary fork missing".to_string(),
    )?;
    ensure(
        time.forks.iter().any(|f| f.id == time.active_fork_id),
        "active_fork",
        || format!("active fork {} does not exist", time.active_fork_id),
    )?;
    let unique: BTreeSet<&String> = time.forks.iter().map(|f| &f.id).collect();
    ensure(unique.len() == time.forks.len(), "fork_ids_unique", || {
        "duplicate fork id".to_string()
    })?;
    for fork in &time.forks {
        ensure(
            (0..=PLAYHEAD_MAX_MS).contains(&fork.playhead_ms),
            "playhead_bounds",
            || format!("{} playhead {} out of range", fork.id, fork.playhead_ms),
        )?;
    }
    Ok(())
}

fn check_boss(state: &GameplayState) -> Result<(), InvariantViolation> {
    let boss = &state.boss;
    ensure(boss.hp >= 0 && boss.hp <= boss.max_hp, "boss_hp", || {
        format!("hp {} outside [0, {}]", boss.hp, boss.max_hp)
    })?;
    ensure(boss.phase == phase_for(boss.hp, boss.max_hp), "boss_phase", || {
        format!("phase {} does not match hp {}/{}", boss.phase, boss.hp, boss.max_hp)
    })
}

fn check_director(state: &GameplayState) -> Result<(), InvariantViolation> {
    ensure((0..=100).contains(&state.director.risk), "director_risk", || {
        format!("risk {} outside [0, 100]", state.director.risk)
    })
}

fn check_economy(state: &GameplayState) -> Result<(), InvariantViolation> {
    let economy = &state.economy;
    ensure(economy.credits >= 0 && economy.materials >= 0, "economy_non_negative", || {
        format!("credits {} materials {}", economy.credits, economy.materials)
    })?;
    let expected = inflation_index(&state.constants.economy, economy.credits);
    ensure(economy.inflation_index == expected, "inflation_index", || {
        format!("index {} expected {}", economy.inflation_index, expected)
    })
}

fn check_progression(state: &GameplayState) -> Result<(), InvariantViolation> {
    let p = &state.progression;
    ensure(p.level >= 1, "progression_level", || "level below 1".to_string())?;
    ensure(
        p.next_level_xp == p.level as i64 * XP_PER_LEVEL,
        "progression_threshold",
        || format!("threshold {} for level {}", p.next_level_xp, p.level),
    )?;
    ensure(p.xp >= 0 && p.xp < p.next_level_xp, "progression_xp", || {
        format!("xp {} not below threshold {}", p.xp, p.next_level_xp)
    })
}

fn check_liveops(state: &GameplayState) -> Result<(), InvariantViolation> {
    let liveops = &state.liveops;
    ensure(
        liveops.difficulty_factor >= DIFFICULTY_RANGE.0
            && liveops.difficulty_factor <= DIFFICULTY_RANGE.1,
        "liveops_difficulty",
        || format!("difficulty {}", liveops.difficulty_factor),
    )?;
    ensure(
        liveops.reward_multiplier >= REWARD_RANGE.0 && liveops.reward_multiplier <= REWARD_RANGE.1,
        "liveops_reward",
        || format!("reward multiplier {}", liveops.reward_multiplier),
    )?;
    let challenge = &liveops.challenge;
    ensure(
        challenge.progress >= 0 && challenge.progress <= challenge.goal,
        "liveops_progress",
        || format!("progress {} outside [0, {}]", challenge.progress, challenge.goal),
    )
}

fn check_bounded_logs(state: &GameplayState) -> Result<(), InvariantViolation> {
    for (log, len, limit) in [
        ("ledger", state.economy.ledger.len(), LEDGER_LIMIT),
        ("reward_history", state.rewards.history.len(), REWARD_HISTORY_LIMIT),
        ("cinematic_queue", state.cinematic.queue.len(), CINEMATIC_QUEUE_LIMIT),
        ("tuning_history", state.liveops.tuning_history.len(), TUNING_HISTORY_LIMIT),
        ("reports", state.safety.reports.len(), REPORT_LIMIT),
    ] {
        ensure(len <= limit, "bounded_logs", || format!("{log} holds {len} > {limit}"))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    #[test]
    fn test_initial_state_is_valid() {
        let state = create_initial_state("inv", None);
        assert_eq!(try_validate_invariants(&state), Ok(()));
        validate_invariants(&state);
    }

    #[test]
    fn test_equipped_must_be_unlocked() {
        let mut state = create_initial_state("inv", None);
        state.skills.loadout.equipped.push("skill-focus".to_string());
        let err = try_validate_invariants(&state).unwrap_err();
        assert_eq!(err.name, "loadout_subset");
        assert!(err.to_string().starts_with("[invariant:loadout_subset]"));
    }

    #[test]
    fn test_dangling_active_fork_detected() {
        let mut state = create_initial_state("inv", None);
        state.time.active_fork_id = "fork-404".to_string();
        assert_eq!(try_validate_invariants(&state).unwrap_err().name, "active_fork");
    }

    #[test]
    fn test_stale_inflation_index_detected() {
        let mut state = create_initial_state("inv", None);
        state.economy.credits = 320;
        assert_eq!(try_validate_invariants(&state).unwrap_err().name, "inflation_index");
    }

    #[test]
    #[should_panic(expected = "[invariant:boss_phase]")]
    fn test_validate_panics_with_tag() {
        let mut state = create_initial_state("inv", None);
        state.boss.hp = 10;
        validate_invariants(&state);
    }
}
