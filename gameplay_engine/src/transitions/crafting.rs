//! Crafting: spend credits and materials for an immediate effect.
use crate::arithmetic::clamp;
use crate::catalog::recipe_cost;
use crate::domain::{CraftRecipe, GameplayState, Rejection};
use crate::economy::spend;
use crate::events::ActionContext;

use super::boss::damage_boss;
use super::raid::bump_objective;
use super::transition;

const PATCH_STABILITY: i64 = 8;
const LENS_PROGRESS: i64 = 12;
const OVERCLOCK_DAMAGE: i64 = 18;

pub fn craft_upgrade(state: &GameplayState, ctx: &ActionContext, recipe: CraftRecipe) -> GameplayState {
    transition(state, |next| apply_craft(next, ctx, recipe))
}

/// Touches: economy plus the recipe's target (pvp, raid or boss).
pub(crate) fn apply_craft(
    state: &mut GameplayState,
    ctx: &ActionContext,
    recipe: CraftRecipe,
) -> Result<(), Rejection> {
    let cost = recipe_cost(recipe);
    if state.economy.credits < cost.credits || state.economy.materials < cost.materials {
        return Err(Rejection::InsufficientResources);
    }
    spend(state, cost.credits, cost.materials, "craft");
    if !state.economy.crafted.contains(&recipe) {
        state.economy.crafted.push(recipe);
    }

    match recipe {
        CraftRecipe::StabilityPatch => {
            state.pvp.stability = clamp(state.pvp.stability + PATCH_STABILITY, 0, 100);
        }
        CraftRecipe::PrecisionLens => bump_objective(state, ctx, 0, LENS_PROGRESS),
        CraftRecipe::OverclockCore => {
            damage_boss(state, ctx, OVERCLOCK_DAMAGE);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OutcomeStatus;
    use crate::state::create_initial_state;
    use crate::transitions::test_support::ctx;

    #[test]
    fn test_patch_spends_and_stabilizes() {
        let state = create_initial_state("craft", None);
        let next = craft_upgrade(&state, &ctx(), CraftRecipe::StabilityPatch);
        assert_eq!(next.economy.credits, 140);
        assert_eq!(next.economy.materials, 90);
        assert_eq!(next.economy.crafted, vec![CraftRecipe::StabilityPatch]);
        assert_eq!(next.pvp.stability, 80);
    }

    #[test]
    fn test_crafted_recorded_once() {
        let state = create_initial_state("craft", None);
        let once = craft_upgrade(&state, &ctx(), CraftRecipe::PrecisionLens);
        let twice = craft_upgrade(&once, &ctx(), CraftRecipe::PrecisionLens);
        assert_eq!(twice.economy.crafted, vec![CraftRecipe::PrecisionLens]);
        assert_eq!(twice.raid.objectives[0].progress, 24);
    }

    #[test]
    fn test_insufficient_resources_rejected() {
        let mut state = create_initial_state("craft", None);
        state.economy.materials = 5;
        assert_eq!(craft_upgrade(&state, &ctx(), CraftRecipe::OverclockCore), state);
    }

    #[test]
    fn test_overclock_can_finish_boss() {
        let mut state = create_initial_state("craft", None);
        state.boss.hp = 10;
        let next = craft_upgrade(&state, &ctx(), CraftRecipe::OverclockCore);
        assert_eq!(next.boss.hp, 0);
        assert_eq!(next.boss.phase, 3);
        assert_eq!(next.outcome.status, OutcomeStatus::Win);
    }
}
