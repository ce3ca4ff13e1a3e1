/// Gameplay Engine: Progression
///
/// XP accumulates into levels. Each level costs `level * 200` xp and pays
/// one skill point; levels 3, 5 and 10 award a milestone exactly once.
use crate::catalog::{milestone_id, LEVEL_MILESTONES};
use crate::domain::GameplayState;

pub const XP_PER_LEVEL: i64 = 200;

/// Grant xp, returning the next state. No-op if `amount <= 0`.
pub fn grant_progression_xp(state: &GameplayState, amount: i64) -> GameplayState {
    let mut next = state.clone();
    grant_xp(&mut next, amount);
    next
}

/// Touches: progression, skills.points.
pub(crate) fn grant_xp(state: &mut GameplayState, amount: i64) {
    if amount <= 0 {
        return;
    }
    let progression = &mut state.progression;
    progression.xp = progression.xp.saturating_add(amount);
    while progression.xp >= progression.next_level_xp {
        progression.xp -= progression.next_level_xp;
        progression.level += 1;
        progression.next_level_xp = progression.level as i64 * XP_PER_LEVEL;
        state.skills.points += 1;
    }
    for level in LEVEL_MILESTONES {
        if progression.level >= level {
            progression.milestones.insert(milestone_id(level));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_initial_state;

    #[test]
    fn test_non_positive_amount_is_noop() {
        let state = create_initial_state("xp", None);
        assert_eq!(grant_progression_xp(&state, 0), state);
        assert_eq!(grant_progression_xp(&state, -50), state);
    }

    #[test]
    fn test_level_up_carries_remainder() {
        let state = create_initial_state("xp", None);
        let next = grant_progression_xp(&state, 250);
        assert_eq!(next.progression.level, 2);
        assert_eq!(next.progression.xp, 50);
        assert_eq!(next.progression.next_level_xp, 400);
        assert_eq!(next.skills.points, state.skills.points + 1);
    }

    #[test]
    fn test_multi_level_grant_awards_milestone_once() {
        let state = create_initial_state("xp", None);
        // 200 + 400 = 600 reaches level 3
        let next = grant_progression_xp(&state, 600);
        assert_eq!(next.progression.level, 3);
        assert_eq!(next.progression.xp, 0);
        assert!(next.progression.milestones.contains("milestone-level-3"));
        let again = grant_progression_xp(&next, 10);
        assert_eq!(again.progression.milestones.len(), 1);
    }
}
