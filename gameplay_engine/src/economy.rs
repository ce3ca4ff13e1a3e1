/// Gameplay Engine: Economy
///
/// Every credit reward passes through the anti-inflation policy: payouts
/// are lifted while the wallet is below the reserve target and damped
/// above it, and balances past the sink threshold are taxed down. Credits
/// and the inflation index always move together.
use tracing::debug;

use crate::arithmetic::{round_places, round_to_i64};
use crate::domain::{EconomyPolicy, GameplayState, LedgerEntry, LedgerKind};
use crate::state::{truncate_oldest, LEDGER_LIMIT};

/// `credits / reserve_target`, rounded to 3 decimals.
pub fn inflation_index(policy: &EconomyPolicy, credits: i64) -> f64 {
    let target = policy.reserve_target.max(1) as f64;
    round_places(credits as f64 / target, 3)
}

/// Payout multiplier for the current balance.
pub fn reward_multiplier(policy: &EconomyPolicy, credits: i64) -> f64 {
    let target = policy.reserve_target.max(1) as f64;
    let credits = credits as f64;
    if credits <= target {
        let lift = ((target - credits) / target * policy.catch_up_rate).min(policy.catch_up_rate);
        (1.0 + lift).min(policy.reward_ceiling)
    } else {
        let pressure = (credits - target) / target;
        (1.0 - pressure * policy.damping_rate).max(policy.reward_floor)
    }
}

pub fn sink_threshold(policy: &EconomyPolicy) -> i64 {
    round_to_i64(policy.reserve_target as f64 * policy.sink_threshold_ratio)
}

/// Apply a scaled credit reward, returning the next state.
pub fn apply_credit_reward(state: &GameplayState, base: i64, reason: &str) -> GameplayState {
    let mut next = state.clone();
    award_credits(&mut next, base, reason);
    next
}

/// Charge a cost, flooring both balances at zero.
pub fn spend_resources(
    state: &GameplayState,
    credits: i64,
    materials: i64,
    reason: &str,
) -> GameplayState {
    let mut next = state.clone();
    spend(&mut next, credits, materials, reason);
    next
}

/// Weekly upkeep on balances above the reserve target.
pub fn apply_weekly_upkeep(state: &GameplayState) -> GameplayState {
    let mut next = state.clone();
    weekly_upkeep(&mut next);
    next
}

/// Touches: economy. Returns the credits actually awarded.
pub(crate) fn award_credits(state: &mut GameplayState, base: i64, reason: &str) -> i64 {
    if base <= 0 {
        return 0;
    }
    let policy = state.constants.economy.clone();
    let multiplier = reward_multiplier(&policy, state.economy.credits);
    let awarded = round_to_i64(base as f64 * multiplier).max(1);
    state.economy.credits = state.economy.credits.saturating_add(awarded);
    record(
        state,
        LedgerKind::Reward,
        reason,
        awarded,
        0,
        Some(round_places(multiplier, 3)),
    );

    let threshold = sink_threshold(&policy);
    if state.economy.credits > threshold {
        let excess = state.economy.credits - threshold;
        let sink = round_to_i64(excess as f64 * policy.sink_rate).max(1);
        state.economy.credits -= sink;
        debug!(sink, credits = state.economy.credits, "economy sink applied");
        record(state, LedgerKind::Sink, reason, -sink, 0, None);
    }

    refresh_index(state);
    awarded
}

pub(crate) fn spend(state: &mut GameplayState, credits: i64, materials: i64, reason: &str) {
    let credits = credits.max(0);
    let materials = materials.max(0);
    state.economy.credits = (state.economy.credits - credits).max(0);
    state.economy.materials = (state.economy.materials - materials).max(0);
    record(state, LedgerKind::Spend, reason, -credits, -materials, None);
    refresh_index(state);
}

pub(crate) fn gain_materials(state: &mut GameplayState, materials: i64) {
    state.economy.materials = state.economy.materials.saturating_add(materials.max(0));
}

pub(crate) fn weekly_upkeep(state: &mut GameplayState) -> i64 {
    let policy = &state.constants.economy;
    let target = policy.reserve_target;
    if state.economy.credits <= target {
        return 0;
    }
    let excess = state.economy.credits - target;
    let upkeep = round_to_i64(excess as f64 * policy.upkeep_rate)
        .max(policy.upkeep_min)
        .min(state.economy.credits);
    state.economy.credits -= upkeep;
    record(state, LedgerKind::Upkeep, "weekly_upkeep", -upkeep, 0, None);
    refresh_index(state);
    upkeep
}

fn refresh_index(state: &mut GameplayState) {
    state.economy.inflation_index =
        inflation_index(&state.constants.economy, state.economy.credits);
}

fn record(
    state: &mut GameplayState,
    kind: LedgerKind,
    reason: &str,
    credits: i64,
    materials: i64,
    multiplier: Option<f64>,
) {
    state.economy.ledger.push(LedgerEntry {
        kind,
        reason: reason.to_string(),
        credits,
        materials,
        multiplier,
    });
    truncate_oldest(&mut state.economy.ledger, LEDGER_LIMIT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    #[test]
    fn test_multiplier_lifts_below_target() {
        let policy = EconomyPolicy::default();
        assert_eq!(reward_multiplier(&policy, 320), 1.0);
        assert!((reward_multiplier(&policy, 160) - 1.06).abs() < 1e-9);
        assert!((reward_multiplier(&policy, 0) - 1.12).abs() < 1e-9);
    }

    #[test]
    fn test_multiplier_damps_above_target() {
        let policy = EconomyPolicy::default();
        assert!((reward_multiplier(&policy, 640) - 0.65).abs() < 1e-9);
        assert_eq!(reward_multiplier(&policy, 10_000), 0.45);
    }

    #[test]
    fn test_reward_scales_and_updates_index() {
        let state = create_initial_state("econ", None);
        let next = apply_credit_reward(&state, 100, "test");
        // 160 credits -> multiplier 1.06 -> 106 awarded
        assert_eq!(next.economy.credits, 266);
        assert_eq!(next.economy.inflation_index, 0.831);
        assert_eq!(next.economy.ledger.len(), 1);
        assert_eq!(next.economy.ledger[0].credits, 106);
    }

    #[test]
    fn test_non_positive_reward_is_noop() {
        let state = create_initial_state("econ", None);
        assert_eq!(apply_credit_reward(&state, 0, "none"), state);
    }

    #[test]
    fn test_sink_applies_above_threshold() {
        let mut state = create_initial_state("econ", None);
        state.economy.credits = 600;
        let next = apply_credit_reward(&state, 100, "big");
        // multiplier 1 - (280/320)*0.35 = 0.69375 -> 69; 669 - round(125*0.22)=28 -> 641
        assert_eq!(next.economy.credits, 641);
        assert_eq!(next.economy.ledger.last().map(|e| e.kind), Some(LedgerKind::Sink));
        assert_eq!(next.economy.inflation_index, 2.003);
    }

    #[test]
    fn test_spend_floors_at_zero() {
        let state = create_initial_state("econ", None);
        let next = spend_resources(&state, 500, 500, "overspend");
        assert_eq!(next.economy.credits, 0);
        assert_eq!(next.economy.materials, 0);
        assert_eq!(next.economy.inflation_index, 0.0);
    }

    #[test]
    fn test_weekly_upkeep_only_above_target() {
        let state = create_initial_state("econ", None);
        assert_eq!(apply_weekly_upkeep(&state).economy.credits, 160);
        let mut rich = state.clone();
        rich.economy.credits = 420;
        // max(6, round(100 * 0.08) = 8)
        assert_eq!(apply_weekly_upkeep(&rich).economy.credits, 412);
    }
}
