//! Cadence-gated reward claims: daily, per-session, streak and mastery.
use chrono::NaiveDate;

use crate::domain::{GameplayState, Rejection, RewardEntry, RewardKind};
use crate::economy::award_credits;
use crate::events::ActionContext;
use crate::progression::grant_xp;
use crate::state::REWARD_HISTORY_LIMIT;

use super::transition;

pub const DEFAULT_MASTERY: &str = "raid_mastery";
pub const SESSION_REWARD: i64 = 140;
pub const MIN_STREAK: u32 = 3;

/// Known mastery ids and their base payouts.
pub const MASTERIES: [(&str, i64); 3] = [
    ("raid_mastery", 180),
    ("campaign_mastery", 220),
    ("boss_mastery", 260),
];

fn mastery_key(mastery_id: Option<&str>) -> String {
    match mastery_id.map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => id.to_lowercase(),
        None => DEFAULT_MASTERY.to_string(),
    }
}

fn mastery_reached(state: &GameplayState, mastery: &str) -> bool {
    match mastery {
        "raid_mastery" => state.raid.completed,
        "campaign_mastery" => state.campaign.depth >= 4,
        "boss_mastery" => state.boss.hp <= 0,
        _ => false,
    }
}

fn has_session_activity(state: &GameplayState) -> bool {
    state.raid.objectives.iter().any(|o| o.progress > 0)
        || state.campaign.depth > 1
        || state.pvp.round > 0
}

/// Check whether a reward of `kind` can be claimed on `today`.
pub fn evaluate_cadence_reward(
    state: &GameplayState,
    kind: RewardKind,
    mastery_id: Option<&str>,
    today: NaiveDate,
) -> Result<(), Rejection> {
    let rewards = &state.rewards;
    match kind {
        RewardKind::Daily => {
            if rewards.daily_claimed_date == Some(today) {
                return Err(Rejection::AlreadyClaimed);
            }
        }
        RewardKind::Session => {
            if rewards.session_claimed {
                return Err(Rejection::AlreadyClaimed);
            }
            if !has_session_activity(state) {
                return Err(Rejection::NoQualifyingActivity);
            }
        }
        RewardKind::Streak => {
            if rewards.streak_days < MIN_STREAK {
                return Err(Rejection::StreakTooShort {
                    days: rewards.streak_days,
                });
            }
            if rewards.streak_claimed_for >= rewards.streak_days {
                return Err(Rejection::AlreadyClaimed);
            }
        }
        RewardKind::Mastery => {
            let key = mastery_key(mastery_id);
            if !MASTERIES.iter().any(|(id, _)| *id == key) {
                return Err(Rejection::UnknownMastery(key));
            }
            if rewards.mastery_claims.contains(&key) {
                return Err(Rejection::AlreadyClaimed);
            }
            if !mastery_reached(state, &key) {
                return Err(Rejection::MasteryNotMet(key));
            }
        }
    }
    Ok(())
}

/// Claim a reward; the calendar date comes from `ctx.at`.
pub fn claim_cadence_reward(
    state: &GameplayState,
    ctx: &ActionContext,
    kind: RewardKind,
    mastery_id: Option<&str>,
) -> GameplayState {
    transition(state, |next| apply_claim(next, ctx, kind, mastery_id))
}

/// Touches: rewards, economy, progression.
pub(crate) fn apply_claim(
    state: &mut GameplayState,
    ctx: &ActionContext,
    kind: RewardKind,
    mastery_id: Option<&str>,
) -> Result<(), Rejection> {
    let today = ctx.at.date_naive();
    evaluate_cadence_reward(state, kind, mastery_id, today)?;

    let rewards = &mut state.rewards;
    let (base, detail) = match kind {
        RewardKind::Daily => {
            let consecutive = rewards
                .last_daily_claim_date
                .and_then(|last| last.succ_opt())
                .is_some_and(|next_day| next_day == today);
            rewards.streak_days = if consecutive { rewards.streak_days + 1 } else { 1 };
            rewards.daily_claimed_date = Some(today);
            rewards.last_daily_claim_date = Some(today);
            let base = 90 + rewards.streak_days.min(7) as i64 * 10;
            (base, format!("daily streak {}", rewards.streak_days))
        }
        RewardKind::Session => {
            rewards.session_claimed = true;
            (SESSION_REWARD, "session activity".to_string())
        }
        RewardKind::Streak => {
            rewards.streak_claimed_for = rewards.streak_days;
            let base = 170 + rewards.streak_days as i64 * 5;
            (base, format!("{}-day streak", rewards.streak_days))
        }
        RewardKind::Mastery => {
            let key = mastery_key(mastery_id);
            let base = MASTERIES
                .iter()
                .find(|(id, _)| *id == key)
                .map(|(_, amount)| *amount)
                .ok_or_else(|| Rejection::UnknownMastery(key.clone()))?;
            rewards.mastery_claims.insert(key.clone());
            (base, key)
        }
    };

    let awarded = award_credits(state, base, "cadence_reward");
    let rewards = &mut state.rewards;
    rewards.claims_issued += 1;
    rewards.history.insert(
        0,
        RewardEntry {
            id: format!("reward-{}", rewards.claims_issued),
            kind,
            amount: awarded,
            detail,
            at: ctx.at,
        },
    );
    rewards.history.truncate(REWARD_HISTORY_LIMIT);

    grant_xp(state, 30 + (awarded / 10).max(1));
    Ok(())
}
