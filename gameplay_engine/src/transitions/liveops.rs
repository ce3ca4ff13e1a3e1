//! Live-ops season: weekly challenge rotation and operator tuning.
use crate::arithmetic::{clamp, clamp_ratio, round_places, round_to_i64};
use crate::catalog::LIVEOPS_CATALOG;
use crate::domain::{GameplayState, LiveOpsChallenge, Rejection, TuningEntry};
use crate::economy::{award_credits, weekly_upkeep};
use crate::events::ActionContext;
use crate::progression::grant_xp;
use crate::state::TUNING_HISTORY_LIMIT;

use super::{mutate, transition};

pub const MAX_PROGRESS_STEP: i64 = 20;
pub const CHALLENGE_XP: i64 = 80;
pub const DIFFICULTY_RANGE: (f64, f64) = (0.6, 1.6);
pub const REWARD_RANGE: (f64, f64) = (0.5, 2.0);

/// Catalog challenge for `week`, scaled by the current tuning.
pub fn challenge_for_week(
    seed: u64,
    week: u32,
    difficulty_factor: f64,
    reward_multiplier: f64,
) -> LiveOpsChallenge {
    let spec = &LIVEOPS_CATALOG[((seed + week as u64) % LIVEOPS_CATALOG.len() as u64) as usize];
    LiveOpsChallenge {
        id: spec.id.to_string(),
        title: spec.title.to_string(),
        goal: round_to_i64(spec.goal as f64 * difficulty_factor).max(1),
        progress: 0,
        reward_credits: round_to_i64(spec.reward_credits as f64 * reward_multiplier).max(1),
        completed: false,
    }
}

pub fn progress_liveops_challenge(state: &GameplayState, delta: i64) -> GameplayState {
    transition(state, |next| apply_progress(next, delta))
}

pub fn balance_liveops(
    state: &GameplayState,
    ctx: &ActionContext,
    difficulty_factor: Option<f64>,
    reward_multiplier: Option<f64>,
    note: &str,
) -> GameplayState {
    mutate(state, |next| {
        apply_balance(next, ctx, difficulty_factor, reward_multiplier, note)
    })
}

pub fn advance_liveops_week(state: &GameplayState) -> GameplayState {
    mutate(state, apply_advance_week)
}

/// Touches: liveops; on first completion economy and progression.
pub(crate) fn apply_progress(state: &mut GameplayState, delta: i64) -> Result<(), Rejection> {
    let step = clamp(delta, 0, MAX_PROGRESS_STEP);
    if step == 0 {
        return Err(Rejection::NonPositiveDelta);
    }
    let challenge = &mut state.liveops.challenge;
    let was_completed = challenge.completed;
    challenge.progress = clamp(challenge.progress + step, 0, challenge.goal);
    challenge.completed = challenge.progress >= challenge.goal;

    if challenge.completed && !was_completed {
        let reward = challenge.reward_credits;
        state.liveops.challenge_completions += 1;
        award_credits(state, reward, "liveops_challenge");
        grant_xp(state, CHALLENGE_XP);
    }
    Ok(())
}

/// Touches: liveops.
pub(crate) fn apply_balance(
    state: &mut GameplayState,
    ctx: &ActionContext,
    difficulty_factor: Option<f64>,
    reward_multiplier: Option<f64>,
    note: &str,
) {
    let liveops = &mut state.liveops;
    let current_difficulty = liveops.difficulty_factor;
    let current_reward = liveops.reward_multiplier;
    let next_difficulty = round_places(
        clamp_ratio(
            difficulty_factor.unwrap_or(current_difficulty),
            DIFFICULTY_RANGE.0,
            DIFFICULTY_RANGE.1,
        ),
        2,
    );
    let next_reward = round_places(
        clamp_ratio(
            reward_multiplier.unwrap_or(current_reward),
            REWARD_RANGE.0,
            REWARD_RANGE.1,
        ),
        2,
    );

    let challenge = &mut liveops.challenge;
    let base_goal = challenge.goal as f64 / current_difficulty.max(DIFFICULTY_RANGE.0);
    let base_reward = challenge.reward_credits as f64 / current_reward.max(REWARD_RANGE.0);
    challenge.goal = round_to_i64(base_goal * next_difficulty).max(1);
    challenge.reward_credits = round_to_i64(base_reward * next_reward).max(1);
    challenge.progress = challenge.progress.min(challenge.goal);
    // A lowered goal can complete the challenge; completion is never revoked.
    challenge.completed = challenge.completed || challenge.progress >= challenge.goal;

    liveops.difficulty_factor = next_difficulty;
    liveops.reward_multiplier = next_reward;
    liveops.revision += 1;
    let note = match note.trim() {
        "" => "manual tuning".to_string(),
        trimmed => trimmed.to_string(),
    };
    liveops.tuning_history.insert(
        0,
        TuningEntry {
            id: format!("tuning-{}-{}", liveops.week, liveops.revision),
            week: liveops.week,
            difficulty_factor: next_difficulty,
            reward_multiplier: next_reward,
            note,
            actor_player_id: ctx.actor.clone(),
            changed_at: ctx.at,
        },
    );
    liveops.tuning_history.truncate(TUNING_HISTORY_LIMIT);
}

/// Touches: liveops, economy (weekly upkeep).
pub(crate) fn apply_advance_week(state: &mut GameplayState) {
    let liveops = &mut state.liveops;
    let completion_rate = liveops.challenge_completions as f64 / liveops.week.max(1) as f64;
    let difficulty = clamp(((1.0 + (0.5 - completion_rate)) * 100.0) as i64, 60, 140) as f64 / 100.0;
    liveops.week += 1;
    liveops.difficulty_factor = difficulty;
    liveops.challenge = challenge_for_week(
        state.seed,
        liveops.week,
        difficulty,
        liveops.reward_multiplier,
    );
    weekly_upkeep(state);
}
