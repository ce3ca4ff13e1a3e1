//! Roguelike campaign: depth, lives, mutators and generated missions.
use tracing::info;

use crate::catalog::{FAILURE_MUTATOR, HAZARD_POOL, MUTATOR_WINDOW};
use crate::domain::{CampaignMission, GameplayState, OutcomeStatus, RunOutcome};
use crate::economy::{award_credits, gain_materials};
use crate::events::ActionContext;
use crate::outcome::record_outcome;
use crate::progression::grant_xp;

use super::mutate;

pub const SUCCESS_MATERIALS: i64 = 14;
pub const SUCCESS_XP: i64 = 120;
pub const FAILURE_XP: i64 = 40;

/// Inclusive upper depth of each difficulty band; deeper than the last is 10.
const DIFFICULTY_BANDS: [(u32, u32); 9] = [
    (1, 1),
    (3, 2),
    (5, 3),
    (7, 4),
    (9, 5),
    (12, 6),
    (16, 7),
    (20, 8),
    (24, 9),
];

pub fn difficulty_for_depth(depth: u32) -> u32 {
    DIFFICULTY_BANDS
        .iter()
        .find(|(upper, _)| depth <= *upper)
        .map(|(_, difficulty)| *difficulty)
        .unwrap_or(10)
}

/// Deterministic mission for `(seed, depth)`, flavoured by the newest mutator.
pub fn generate_mission(seed: u64, depth: u32, mutators: &[String]) -> CampaignMission {
    let base = seed + depth as u64;
    let pool = HAZARD_POOL.len() as u64;
    let mut hazards = vec![
        HAZARD_POOL[(base % pool) as usize].to_string(),
        HAZARD_POOL[((base + 2) % pool) as usize].to_string(),
    ];
    if let Some(latest) = mutators.last() {
        hazards.push(latest.clone());
    }
    CampaignMission {
        id: format!("mission-{depth}-{}", base % 997),
        title: format!("Scenario Depth {depth}"),
        difficulty: difficulty_for_depth(depth),
        hazards,
        reward_credits: 60 + depth as i64 * 15,
    }
}

/// First occurrence wins, then keep the newest `window`.
pub fn dedupe_mutators(mutators: &[String], window: usize) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(mutators.len());
    for mutator in mutators {
        if !unique.contains(mutator) {
            unique.push(mutator.clone());
        }
    }
    let skip = unique.len().saturating_sub(window);
    unique.split_off(skip)
}

pub fn merge_mutator(mutators: &[String], mutator: &str) -> Vec<String> {
    let mut merged = mutators.to_vec();
    merged.push(mutator.to_string());
    dedupe_mutators(&merged, MUTATOR_WINDOW)
}

/// Resolve the current mission as a success or failure.
pub fn resolve_campaign_mission(
    state: &GameplayState,
    ctx: &ActionContext,
    success: bool,
) -> GameplayState {
    mutate(state, |next| apply_resolve_mission(next, ctx, success))
}

pub fn set_sandbox(state: &GameplayState, enabled: bool) -> GameplayState {
    mutate(state, |next| apply_set_sandbox(next, enabled))
}

pub(crate) fn apply_set_sandbox(state: &mut GameplayState, enabled: bool) {
    if state.sandbox.enabled != enabled {
        info!(enabled, "sandbox toggled");
    }
    state.sandbox.enabled = enabled;
}

/// Regenerate the current mission at the current depth.
pub(crate) fn refresh_mission(state: &mut GameplayState) {
    let campaign = &mut state.campaign;
    campaign.current_mission = generate_mission(state.seed, campaign.depth, &campaign.mutators);
}

/// Touches: campaign, economy, progression, director.last_outcome, outcome.
pub(crate) fn apply_resolve_mission(state: &mut GameplayState, ctx: &ActionContext, success: bool) {
    if success {
        let mission = state.campaign.current_mission.clone();
        state.campaign.depth += 1;
        state.campaign.completed_mission_ids.push(mission.id);
        award_credits(state, mission.reward_credits, "campaign_success");
        gain_materials(state, SUCCESS_MATERIALS);
        grant_xp(state, SUCCESS_XP);
        state.director.last_outcome = Some(RunOutcome::Success);
        refresh_mission(state);

        let depth = state.campaign.depth;
        if depth >= state.constants.win_depth {
            record_outcome(state, ctx, OutcomeStatus::Win, format!("Campaign reached depth {depth}"));
        }
        return;
    }

    let sandbox = state.sandbox.enabled;
    if !sandbox {
        state.campaign.lives = state.campaign.lives.saturating_sub(1);
    }
    grant_xp(state, FAILURE_XP);
    state.campaign.mutators = merge_mutator(&state.campaign.mutators, FAILURE_MUTATOR);
    state.director.last_outcome = Some(RunOutcome::Failure);
    refresh_mission(state);

    let lives = state.campaign.lives;
    if sandbox {
        record_outcome(
            state,
            ctx,
            OutcomeStatus::Partial,
            "Sandbox run: mission failed, no life lost",
        );
    } else if lives == 0 {
        record_outcome(state, ctx, OutcomeStatus::Loss, "Campaign lives exhausted");
    } else {
        record_outcome(
            state,
            ctx,
            OutcomeStatus::Partial,
            format!("Mission failed, {lives} lives remaining"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;
    use crate::transitions::test_support::ctx;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_difficulty_bands() {
        let cases = [(1, 1), (2, 2), (3, 2), (4, 3), (7, 4), (9, 5), (12, 6), (13, 7), (20, 8), (24, 9), (25, 10), (99, 10)];
        for (depth, expected) in cases {
            assert_eq!(difficulty_for_depth(depth), expected, "depth {depth}");
        }
    }

    #[test]
    fn test_generate_mission_is_deterministic() {
        let mutators = strings(&["baseline", "risk-surge"]);
        let a = generate_mission(42, 3, &mutators);
        let b = generate_mission(42, 3, &mutators);
        assert_eq!(a, b);
        assert_eq!(a.id, "mission-3-45");
        assert_eq!(
            a.hazards,
            strings(&["schema mismatch surge", "dependency deadlock", "risk-surge"])
        );
        assert_eq!(a.reward_credits, 105);
        assert_eq!(a.difficulty, 2);
    }

    #[test]
    fn test_merge_mutator_dedupes_and_bounds() {
        let current = strings(&["a", "b"]);
        assert_eq!(merge_mutator(&current, "a"), strings(&["a", "b"]));
        let full = strings(&["a", "b", "c", "d", "e", "f"]);
        assert_eq!(merge_mutator(&full, "g"), strings(&["b", "c", "d", "e", "f", "g"]));
    }

    #[test]
    fn test_success_advances_depth() {
        let state = create_initial_state("campaign", None);
        let next = resolve_campaign_mission(&state, &ctx(), true);
        assert_eq!(next.campaign.depth, 2);
        assert_eq!(next.campaign.completed_mission_ids, vec![state.campaign.current_mission.id.clone()]);
        assert_eq!(next.economy.materials, state.economy.materials + 14);
        assert!(next.economy.credits > state.economy.credits);
        assert_eq!(next.campaign.current_mission.title, "Scenario Depth 2");
        assert_eq!(next.outcome.status, OutcomeStatus::InProgress);
    }

    #[test]
    fn test_reaching_depth_five_wins() {
        let mut state = create_initial_state("campaign", None);
        for _ in 0..4 {
            state = resolve_campaign_mission(&state, &ctx(), true);
        }
        assert_eq!(state.campaign.depth, 5);
        assert_eq!(state.outcome.status, OutcomeStatus::Win);
    }

    #[test]
    fn test_failures_drain_lives_to_loss() {
        let mut state = create_initial_state("campaign", None);
        state = resolve_campaign_mission(&state, &ctx(), false);
        assert_eq!(state.campaign.lives, 2);
        assert_eq!(state.outcome.status, OutcomeStatus::Partial);
        assert!(state.campaign.mutators.contains(&"failure-loop".to_string()));
        state = resolve_campaign_mission(&state, &ctx(), false);
        state = resolve_campaign_mission(&state, &ctx(), false);
        assert_eq!(state.campaign.lives, 0);
        assert_eq!(state.outcome.status, OutcomeStatus::Loss);
        state = resolve_campaign_mission(&state, &ctx(), false);
        assert_eq!(state.campaign.lives, 0);
    }

    #[test]
    fn test_sandbox_failure_keeps_lives() {
        let state = set_sandbox(&create_initial_state("campaign", None), true);
        let next = resolve_campaign_mission(&state, &ctx(), false);
        assert_eq!(next.campaign.lives, 3);
        assert_eq!(next.outcome.status, OutcomeStatus::Partial);
        assert_eq!(next.progression.xp, FAILURE_XP);
    }
}
