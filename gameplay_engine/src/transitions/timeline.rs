//! Branchable, mergeable replay timeline.
use crate::arithmetic::{clamp, PLAYHEAD_MAX_MS};
use crate::domain::{GameplayState, Rejection, TimeFork};
use crate::state::PRIMARY_FORK_ID;

use super::{mutate, transition};

/// Branch from the active fork at `playhead_ms` and make the branch active.
pub fn create_time_fork(state: &GameplayState, label: &str, playhead_ms: i64) -> GameplayState {
    mutate(state, |next| apply_create_fork(next, label, playhead_ms))
}

/// Move the active playhead back by `|amount_ms|`, floored at zero.
pub fn rewind_active_fork(state: &GameplayState, amount_ms: i64) -> GameplayState {
    transition(state, |next| apply_rewind(next, amount_ms))
}

/// Fold `fork_id` (default: the active fork) into primary and discard it.
pub fn merge_fork_into_primary(state: &GameplayState, fork_id: Option<&str>) -> GameplayState {
    transition(state, |next| apply_merge(next, fork_id))
}

/// Touches: time.
pub(crate) fn apply_create_fork(state: &mut GameplayState, label: &str, playhead_ms: i64) {
    let time = &mut state.time;
    let seq = time.fork_seq.max(time.forks.len() as u32) + 1;
    time.fork_seq = seq;
    let id = format!("fork-{seq}");
    let playhead_ms = clamp(playhead_ms, 0, PLAYHEAD_MAX_MS);
    let label = match label.trim() {
        "" => format!("Fork {seq}"),
        trimmed => trimmed.to_string(),
    };
    time.forks.push(TimeFork {
        id: id.clone(),
        label,
        playhead_ms,
        history: vec![playhead_ms],
        parent_fork_id: Some(time.active_fork_id.clone()),
    });
    time.active_fork_id = id;
}

pub(crate) fn apply_rewind(state: &mut GameplayState, amount_ms: i64) -> Result<(), Rejection> {
    let time = &mut state.time;
    let active = time
        .forks
        .iter_mut()
        .find(|fork| fork.id == time.active_fork_id)
        .ok_or_else(|| Rejection::UnknownFork(time.active_fork_id.clone()))?;
    active.playhead_ms = clamp(active.playhead_ms - amount_ms.saturating_abs(), 0, PLAYHEAD_MAX_MS);
    active.history.push(active.playhead_ms);
    Ok(())
}

pub(crate) fn apply_merge(state: &mut GameplayState, fork_id: Option<&str>) -> Result<(), Rejection> {
    let time = &mut state.time;
    let source_id = fork_id.unwrap_or(time.active_fork_id.as_str()).to_string();
    if source_id == PRIMARY_FORK_ID {
        return Err(Rejection::CannotMergePrimary);
    }
    let source_index = time
        .forks
        .iter()
        .position(|fork| fork.id == source_id)
        .ok_or_else(|| Rejection::UnknownFork(source_id.clone()))?;
    let source = time.forks.remove(source_index);

    let primary = time
        .forks
        .iter_mut()
        .find(|fork| fork.id == PRIMARY_FORK_ID)
        .ok_or_else(|| Rejection::UnknownFork(PRIMARY_FORK_ID.to_string()))?;
    primary.playhead_ms = source.playhead_ms;
    primary.history.push(source.playhead_ms);
    time.active_fork_id = PRIMARY_FORK_ID.to_string();
    Ok(())
}
