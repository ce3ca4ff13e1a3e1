//! Branching narrative over a small cyclic node graph.
use crate::arithmetic::clamp;
use crate::domain::{GameplayState, NarrativeStep, Rejection};

use super::campaign::{merge_mutator, refresh_mission};
use super::transition;

/// Take `choice_id` from the current node. Unknown choices are a no-op.
pub fn apply_narrative_choice(state: &GameplayState, choice_id: &str) -> GameplayState {
    transition(state, |next| apply_choice(next, choice_id))
}

/// Touches: narrative, campaign.mutators, campaign.current_mission.
pub(crate) fn apply_choice(state: &mut GameplayState, choice_id: &str) -> Result<(), Rejection> {
    let narrative = &mut state.narrative;
    let choice = narrative
        .nodes
        .get(&narrative.current_node_id)
        .and_then(|node| node.choices.iter().find(|c| c.id == choice_id))
        .cloned()
        .ok_or_else(|| Rejection::UnknownChoice(choice_id.to_string()))?;

    narrative.tension = clamp(narrative.tension + choice.tension_delta, 0, 100);
    narrative.history.push(NarrativeStep {
        node_id: narrative.current_node_id.clone(),
        choice_id: choice.id.clone(),
    });
    narrative.current_node_id = choice.next_node_id.clone();

    state.campaign.mutators = merge_mutator(&state.campaign.mutators, &choice.mutator);
    refresh_mission(state);
    Ok(())
}
