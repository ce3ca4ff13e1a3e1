/// Gameplay Engine: Outcome
///
/// There is no central arbiter. The subsystem that crosses a terminal
/// threshold writes the outcome itself; later transitions may overwrite it.
use tracing::info;

use crate::domain::{GameplayState, OutcomeState, OutcomeStatus};
use crate::events::ActionContext;

impl OutcomeStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OutcomeStatus::Win | OutcomeStatus::Loss)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::InProgress => "in_progress",
            OutcomeStatus::Win => "win",
            OutcomeStatus::Loss => "loss",
            OutcomeStatus::Partial => "partial",
        }
    }
}

/// Touches: outcome.
pub(crate) fn record_outcome(
    state: &mut GameplayState,
    ctx: &ActionContext,
    status: OutcomeStatus,
    reason: impl Into<String>,
) {
    let reason = reason.into();
    info!(status = status.as_str(), reason = %reason, actor = %ctx.actor, "outcome recorded");
    state.outcome = OutcomeState {
        status,
        reason,
        updated_at: Some(ctx.at),
    };
}
