//! Drift detection: determinism verification and state comparison.
//!
//! Compares two session states slice by slice. Used to explain why a
//! replayed state no longer matches a live one.

use std::collections::BTreeSet;

use gameplay_engine::domain::{GameplayConstants, GameplayState, OutcomeStatus};
use gameplay_engine::events::ActionEnvelope;
use gameplay_engine::hashing::canonical_hash;

use crate::replay;

/// Verify determinism by replaying the same actions twice and
/// asserting identical hashes. Panics on failure.
pub fn verify_determinism(
    seed_source: &str,
    constants: Option<GameplayConstants>,
    actions: &[ActionEnvelope],
) {
    let (_, hash1) = replay::rebuild_state(seed_source, constants.clone(), actions);
    let (_, hash2) = replay::rebuild_state(seed_source, constants, actions);

    if hash1 != hash2 {
        panic!(
            "DETERMINISM FAILURE: two replays produced different hashes.\n\
             Run 1: {}\n\
             Run 2: {}",
            hash1, hash2
        );
    }
}

/// Structured state comparison. Deltas are `b - a`.
pub fn compare_states(state_a: &GameplayState, state_b: &GameplayState) -> DriftReport {
    let forks_a: BTreeSet<&str> = state_a.time.forks.iter().map(|f| f.id.as_str()).collect();
    let forks_b: BTreeSet<&str> = state_b.time.forks.iter().map(|f| f.id.as_str()).collect();

    let unlocked = |state: &GameplayState| -> BTreeSet<String> {
        state
            .skills
            .nodes
            .values()
            .filter(|n| n.unlocked)
            .map(|n| n.id.clone())
            .collect()
    };
    let unlocked_a = unlocked(state_a);
    let unlocked_b = unlocked(state_b);

    let party_a: BTreeSet<&str> = state_a.raid.party.iter().map(String::as_str).collect();
    let party_b: BTreeSet<&str> = state_b.raid.party.iter().map(String::as_str).collect();

    let hash_a = canonical_hash(state_a);
    let hash_b = canonical_hash(state_b);

    DriftReport {
        credits_delta: state_b.economy.credits - state_a.economy.credits,
        materials_delta: state_b.economy.materials - state_a.economy.materials,
        depth_delta: i64::from(state_b.campaign.depth) - i64::from(state_a.campaign.depth),
        lives_delta: i64::from(state_b.campaign.lives) - i64::from(state_a.campaign.lives),
        boss_hp_delta: state_b.boss.hp - state_a.boss.hp,
        pvp_round_delta: i64::from(state_b.pvp.round) - i64::from(state_a.pvp.round),
        xp_delta: state_b.progression.xp - state_a.progression.xp,
        level_delta: i64::from(state_b.progression.level) - i64::from(state_a.progression.level),
        added_forks: forks_b.difference(&forks_a).map(|s| s.to_string()).collect(),
        removed_forks: forks_a.difference(&forks_b).map(|s| s.to_string()).collect(),
        unlocked_skills: unlocked_b.difference(&unlocked_a).cloned().collect(),
        joined_members: party_b.difference(&party_a).map(|s| s.to_string()).collect(),
        outcome_a: state_a.outcome.status,
        outcome_b: state_b.outcome.status,
        diverged: hash_a != hash_b,
        hash_a,
        hash_b,
    }
}

/// Structured drift report.
#[derive(Debug, Clone, PartialEq)]
pub struct DriftReport {
    pub credits_delta: i64,
    pub materials_delta: i64,
    pub depth_delta: i64,
    pub lives_delta: i64,
    pub boss_hp_delta: i64,
    pub pvp_round_delta: i64,
    pub xp_delta: i64,
    pub level_delta: i64,
    pub added_forks: Vec<String>,
    pub removed_forks: Vec<String>,
    /// Unlocked in `b` but not in `a`.
    pub unlocked_skills: Vec<String>,
    pub joined_members: Vec<String>,
    pub outcome_a: OutcomeStatus,
    pub outcome_b: OutcomeStatus,
    pub hash_a: String,
    pub hash_b: String,
    pub diverged: bool,
}

impl DriftReport {
    pub fn outcome_changed(&self) -> bool {
        self.outcome_a != self.outcome_b
    }
}
