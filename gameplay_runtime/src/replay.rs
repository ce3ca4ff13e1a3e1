//! Replay orchestrator: rebuild state from an action log.
//!
//! Delegates all domain logic to the engine.
//! No shortcuts, no cached state logic.

use gameplay_engine::domain::{GameplayConstants, GameplayState};
use gameplay_engine::engine::GameplayEngine;
use gameplay_engine::events::ActionEnvelope;
use gameplay_engine::hashing::canonical_hash;

/// Rebuild a session state from its seed and action log.
///
/// 1. Create a fresh engine from the seed
/// 2. Pass each action sequentially to the engine
/// 3. Return (final_state, canonical_hash)
///
/// Rejected actions in the log are replayed as the same no-ops they were
/// live, so the result matches the live session exactly.
pub fn rebuild_state(
    seed_source: &str,
    constants: Option<GameplayConstants>,
    actions: &[ActionEnvelope],
) -> (GameplayState, String) {
    let engine = GameplayEngine::replay(seed_source, constants, actions);
    let state = engine.state().clone();
    let hash = canonical_hash(&state);
    (state, hash)
}

/// Rebuild starting from an already restored state, e.g. a snapshot.
pub fn rebuild_from(
    base: GameplayState,
    base_version: u64,
    actions: &[ActionEnvelope],
) -> (GameplayState, u64) {
    let mut engine = GameplayEngine::from_state(base, base_version);
    engine.apply_sequence(actions);
    (engine.state().clone(), engine.version())
}

/// Rebuild state and return only the canonical hash.
pub fn rebuild_hash(
    seed_source: &str,
    constants: Option<GameplayConstants>,
    actions: &[ActionEnvelope],
) -> String {
    let (_, hash) = rebuild_state(seed_source, constants, actions);
    hash
}
