//! Three-phase boss encounter.
use crate::arithmetic::clamp;
use crate::catalog::{boss_damage, VULNERABILITY_BONUS};
use crate::domain::{BossAction, BossState, GameplayState, OutcomeStatus};
use crate::events::ActionContext;
use crate::outcome::record_outcome;
use crate::progression::grant_xp;

use super::mutate;

pub const HIT_XP: i64 = 10;
pub const DEFEAT_XP: i64 = 180;

/// Phase as a pure function of the hp ratio.
pub fn phase_for(hp: i64, max_hp: i64) -> u8 {
    let ratio = hp as f64 / max_hp.max(1) as f64;
    if ratio <= 0.33 {
        3
    } else if ratio <= 0.66 {
        2
    } else {
        1
    }
}

pub fn vulnerability_for(phase: u8) -> BossAction {
    match phase {
        1 => BossAction::Exploit,
        2 => BossAction::Strike,
        _ => BossAction::Shield,
    }
}

fn phase_mechanic(phase: u8) -> &'static str {
    match phase {
        1 => "Phase 1: Shield lattice destabilization",
        2 => "Phase 2: Mirror clones absorb exploit damage",
        _ => "Phase 3: Enrage pulse; shield counters become lethal",
    }
}

fn adaptive_pattern(action: BossAction) -> &'static str {
    match action {
        BossAction::Exploit => "counter-focus",
        BossAction::Strike => "aoe-pressure",
        BossAction::Shield => "shield-break",
    }
}

/// Re-derive phase, vulnerability, enrage and mechanic from hp.
pub fn refresh_boss_phase(boss: &mut BossState) {
    boss.phase = phase_for(boss.hp, boss.max_hp);
    boss.vulnerability = vulnerability_for(boss.phase);
    boss.enraged = boss.phase == 3 || boss.hp * 5 <= boss.max_hp;
    boss.phase_mechanic = phase_mechanic(boss.phase).to_string();
}

/// Hit the boss with `action`. Hits on a defeated boss still land (and pay
/// hit xp) but cannot win twice.
pub fn apply_boss_action(
    state: &GameplayState,
    ctx: &ActionContext,
    action: BossAction,
) -> GameplayState {
    mutate(state, |next| apply_hit(next, ctx, action))
}

/// Touches: boss, progression, outcome.
pub(crate) fn apply_hit(state: &mut GameplayState, ctx: &ActionContext, action: BossAction) {
    let boss = &state.boss;
    let mut damage = boss_damage(boss.phase, action);
    if action == boss.vulnerability {
        damage += VULNERABILITY_BONUS;
    }
    let defeated = damage_boss(state, ctx, damage);
    state.boss.adaptive_pattern = adaptive_pattern(action).to_string();

    grant_xp(state, HIT_XP);
    if defeated {
        grant_xp(state, DEFEAT_XP);
    }
}

/// Subtract `damage` from boss hp. Returns true when this hit brought hp to 0.
pub(crate) fn damage_boss(state: &mut GameplayState, ctx: &ActionContext, damage: i64) -> bool {
    let boss = &mut state.boss;
    let was_alive = boss.hp > 0;
    boss.hp = clamp(boss.hp - damage, 0, boss.max_hp);
    refresh_boss_phase(boss);

    let defeated = was_alive && boss.hp == 0;
    if defeated {
        let reason = format!("{} defeated", boss.name);
        record_outcome(state, ctx, OutcomeStatus::Win, reason);
    }
    defeated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;
    use crate::transitions::test_support::ctx;

    #[test]
    fn test_phase_thresholds() {
        assert_eq!(phase_for(360, 360), 1);
        assert_eq!(phase_for(237, 360), 2);
        assert_eq!(phase_for(118, 360), 3);
        assert_eq!(phase_for(119, 360), 2);
        assert_eq!(phase_for(0, 360), 3);
    }

    #[test]
    fn test_exploit_hits_phase_one_vulnerability() {
        let state = create_initial_state("boss", None);
        let next = apply_boss_action(&state, &ctx(), BossAction::Exploit);
        assert_eq!(next.boss.hp, 360 - 50);
        assert_eq!(next.boss.adaptive_pattern, "counter-focus");
        assert_eq!(next.progression.xp, HIT_XP);
    }

    #[test]
    fn test_phase_shift_updates_vulnerability() {
        let mut state = create_initial_state("boss", None);
        state.boss.hp = 250;
        let next = apply_boss_action(&state, &ctx(), BossAction::Strike);
        // 226 / 360 = 0.627 -> phase 2
        assert_eq!(next.boss.hp, 226);
        assert_eq!(next.boss.phase, 2);
        assert_eq!(next.boss.vulnerability, BossAction::Strike);
        assert!(!next.boss.enraged);
    }

    #[test]
    fn test_defeat_pays_once() {
        let mut state = create_initial_state("boss", None);
        state.boss.hp = 5;
        refresh_boss_phase(&mut state.boss);
        let next = apply_boss_action(&state, &ctx(), BossAction::Shield);
        assert_eq!(next.boss.hp, 0);
        assert_eq!(next.outcome.status, OutcomeStatus::Win);
        assert_eq!(next.progression.xp, HIT_XP + DEFEAT_XP);

        let again = apply_boss_action(&next, &ctx(), BossAction::Shield);
        assert_eq!(again.boss.hp, 0);
        // 190 + 10 crosses the first level threshold
        assert_eq!(again.progression.level, 2);
        assert_eq!(again.progression.xp, 0);
    }
}
