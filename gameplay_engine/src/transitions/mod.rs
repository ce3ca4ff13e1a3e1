/// Gameplay Engine: Transitions
///
/// Every state mutation lives under this module, one file per subsystem.
/// Each subsystem exposes pure functions `(&GameplayState, ..) -> GameplayState`
/// built on a crate-private `apply_*` that mutates a clone and either
/// succeeds or names a `Rejection`. A rejection returns the prior state
/// unchanged.
use tracing::debug;

use crate::domain::{GameplayState, Rejection, TransitionResult};
use crate::events::{ActionEnvelope, GameplayAction};

pub mod boss;
pub mod campaign;
pub mod cinematic;
pub mod crafting;
pub mod director;
pub mod guild;
pub mod liveops;
pub mod narrative;
pub mod pvp;
pub mod raid;
pub mod rewards;
pub mod safety;
pub mod skills;
pub mod timeline;

// ---------------------------------------------------------------------------
// Public dispatcher
// ---------------------------------------------------------------------------

/// Apply `envelope` to `state` and return `(new_state, result)`.
/// The original state is never mutated.
pub fn apply_action(
    state: &GameplayState,
    envelope: &ActionEnvelope,
) -> (GameplayState, TransitionResult) {
    let ctx = envelope.context();
    let mut new_state = state.clone();
    let next = &mut new_state;

    let outcome = match &envelope.action {
        GameplayAction::SetSandbox { enabled } => {
            campaign::apply_set_sandbox(next, *enabled);
            Ok(())
        }
        GameplayAction::JoinRaid { member, role } => raid::apply_join(next, member, *role),
        GameplayAction::AdvanceObjective {
            objective_id,
            delta,
        } => raid::apply_objective_progress(next, &ctx, objective_id, *delta),
        GameplayAction::UseAbility { member, ability } => {
            raid::apply_ability(next, &ctx, member, *ability)
        }
        GameplayAction::ResolveMission { success } => {
            campaign::apply_resolve_mission(next, &ctx, *success);
            Ok(())
        }
        GameplayAction::ChooseNarrative { choice_id } => narrative::apply_choice(next, choice_id),
        GameplayAction::UnlockSkill { skill_id } => skills::apply_unlock(next, skill_id),
        GameplayAction::EquipSkill { skill_id } => skills::apply_equip(next, skill_id),
        GameplayAction::UnequipSkill { skill_id } => skills::apply_unequip(next, skill_id),
        GameplayAction::PvPRound { action } => {
            pvp::apply_round(next, &ctx, *action);
            Ok(())
        }
        GameplayAction::CreateFork { label, playhead_ms } => {
            timeline::apply_create_fork(next, label, *playhead_ms);
            Ok(())
        }
        GameplayAction::Rewind { amount_ms } => timeline::apply_rewind(next, *amount_ms),
        GameplayAction::MergeFork { fork_id } => timeline::apply_merge(next, fork_id.as_deref()),
        GameplayAction::BossAct { action } => {
            boss::apply_hit(next, &ctx, *action);
            Ok(())
        }
        GameplayAction::EvaluateDirector {
            failures,
            latency_ms,
            retries,
        } => {
            director::apply_director_update(next, *failures, *latency_ms, *retries);
            Ok(())
        }
        GameplayAction::Craft { recipe_id } => crafting::apply_craft(next, &ctx, *recipe_id),
        GameplayAction::ClaimReward { kind, mastery_id } => {
            rewards::apply_claim(next, &ctx, *kind, mastery_id.as_deref())
        }
        GameplayAction::GuildOperation { impact } => {
            guild::apply_operation(next, *impact);
            Ok(())
        }
        GameplayAction::EmitCinematic {
            event_type,
            message,
            intensity,
        } => {
            cinematic::apply_push(next, &ctx, *event_type, message, *intensity);
            Ok(())
        }
        GameplayAction::LiveOpsProgress { delta } => liveops::apply_progress(next, *delta),
        GameplayAction::LiveOpsBalance {
            difficulty_factor,
            reward_multiplier,
            note,
        } => {
            liveops::apply_balance(next, &ctx, *difficulty_factor, *reward_multiplier, note);
            Ok(())
        }
        GameplayAction::AdvanceLiveOpsWeek => {
            liveops::apply_advance_week(next);
            Ok(())
        }
        GameplayAction::MutePlayer { target_player_id } => {
            safety::apply_mute(next, target_player_id)
        }
        GameplayAction::BlockPlayer { target_player_id } => {
            safety::apply_block(next, target_player_id)
        }
        GameplayAction::ReportPlayer {
            target_player_id,
            reason,
        } => safety::apply_report(next, &ctx, target_player_id, reason),
    };

    let action_type = envelope.action.action_type().to_string();
    match outcome {
        Ok(()) => {
            let outcome_changed = new_state.outcome != state.outcome;
            let result = TransitionResult {
                action_type,
                applied: true,
                rejection: None,
                outcome_changed,
            };
            (new_state, result)
        }
        Err(rejection) => {
            debug!(
                action = %action_type,
                actor = %envelope.player_id,
                %rejection,
                "action rejected"
            );
            let result = TransitionResult {
                action_type,
                applied: false,
                rejection: Some(rejection),
                outcome_changed: false,
            };
            (state.clone(), result)
        }
    }
}

// ---------------------------------------------------------------------------
// Helper: clone, mutate, fall back
// ---------------------------------------------------------------------------

/// Run `apply` against a clone of `state`; on rejection return `state` itself.
pub(crate) fn transition<F>(state: &GameplayState, apply: F) -> GameplayState
where
    F: FnOnce(&mut GameplayState) -> Result<(), Rejection>,
{
    let mut next = state.clone();
    match apply(&mut next) {
        Ok(()) => next,
        Err(rejection) => {
            debug!(%rejection, "transition rejected");
            state.clone()
        }
    }
}

/// Same as [`transition`] for mutations that cannot be rejected.
pub(crate) fn mutate<F>(state: &GameplayState, apply: F) -> GameplayState
where
    F: FnOnce(&mut GameplayState),
{
    let mut next = state.clone();
    apply(&mut next);
    next
}
