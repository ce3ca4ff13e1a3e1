//! Adaptive difficulty advisor.
use crate::arithmetic::clamp;
use crate::domain::{CraftRecipe, GameplayState, SkillTier};

use super::mutate;

const BASELINE_RISK: i64 = 20;
const LATENCY_PRESSURE_MS: u64 = 1_400;

pub fn skill_tier_for(risk: i64) -> SkillTier {
    if risk < 35 {
        SkillTier::High
    } else if risk < 65 {
        SkillTier::Mid
    } else {
        SkillTier::Critical
    }
}

/// Recompute director advice from the latest run telemetry.
pub fn generate_director_update(
    state: &GameplayState,
    failures: u32,
    latency_ms: u64,
    retries: u32,
) -> GameplayState {
    mutate(state, |next| apply_director_update(next, failures, latency_ms, retries))
}

/// Touches: director (not `last_outcome`, which the campaign owns).
pub(crate) fn apply_director_update(
    state: &mut GameplayState,
    failures: u32,
    latency_ms: u64,
    retries: u32,
) {
    let latency_pressure = latency_ms > LATENCY_PRESSURE_MS;
    let risk = clamp(
        BASELINE_RISK
            + 12 * failures as i64
            + 4 * retries as i64
            + if latency_pressure { 8 } else { 0 },
        0,
        100,
    );

    let director = &mut state.director;
    director.risk = risk;
    director.hint = if failures > 0 {
        "Prioritize failure triage and run a stabilizing replay branch."
    } else if latency_pressure {
        "Latency pressure detected. Reduce fan-out and tighten tool boundaries."
    } else {
        "Momentum is stable. Push a high-confidence optimization branch."
    }
    .to_string();
    director.goal = if failures > 0 {
        "Neutralize sabotage pressure before next phase."
    } else {
        "Compress mission time while preserving trace integrity."
    }
    .to_string();
    director.recommended_modifier = if failures > 1 {
        CraftRecipe::StabilityPatch
    } else if latency_pressure {
        CraftRecipe::PrecisionLens
    } else {
        CraftRecipe::OverclockCore
    };
    director.skill_tier = skill_tier_for(risk);
    director.hazard_bias = if failures > 0 { "stability" } else { "aggressive" }.to_string();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    #[test]
    fn test_calm_run_recommends_overclock() {
        let state = create_initial_state("director", None);
        let next = generate_director_update(&state, 0, 300, 0);
        assert_eq!(next.director.risk, 20);
        assert_eq!(next.director.skill_tier, SkillTier::High);
        assert_eq!(next.director.recommended_modifier, CraftRecipe::OverclockCore);
        assert_eq!(next.director.hazard_bias, "aggressive");
    }

    #[test]
    fn test_risk_is_recomputed_not_accumulated() {
        let state = create_initial_state("director", None);
        let once = generate_director_update(&state, 2, 1_500, 1);
        assert_eq!(once.director.risk, 20 + 24 + 4 + 8);
        assert_eq!(once.director.recommended_modifier, CraftRecipe::StabilityPatch);
        let twice = generate_director_update(&once, 2, 1_500, 1);
        assert_eq!(twice.director.risk, once.director.risk);
    }

    #[test]
    fn test_risk_clamps_and_goes_critical() {
        let state = create_initial_state("director", None);
        let next = generate_director_update(&state, 9, 0, 9);
        assert_eq!(next.director.risk, 100);
        assert_eq!(next.director.skill_tier, SkillTier::Critical);
        let latency = generate_director_update(&state, 0, 2_000, 0);
        assert_eq!(latency.director.recommended_modifier, CraftRecipe::PrecisionLens);
    }
}
