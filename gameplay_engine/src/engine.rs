/// Gameplay Engine: Engine
///
/// Stateful wrapper over the pure transition layer. Owns one session state
/// and its version, validates invariants after every transition and bumps
/// the version only when an action is applied.
use crate::domain::{GameplayConstants, GameplayState, TransitionResult};
use crate::events::ActionEnvelope;
use crate::invariants::validate_invariants;
use crate::state::create_initial_state;
use crate::transitions::apply_action as transition_apply;

#[derive(Debug, Clone)]
pub struct GameplayEngine {
    state: GameplayState,
    version: u64,
}

impl GameplayEngine {
    /// Fresh engine for a new session, at version 0.
    pub fn new(seed_source: &str, constants: Option<GameplayConstants>) -> Self {
        Self {
            state: create_initial_state(seed_source, constants),
            version: 0,
        }
    }

    /// Resume from an already validated state.
    pub fn from_state(state: GameplayState, version: u64) -> Self {
        Self { state, version }
    }

    pub fn state(&self) -> &GameplayState {
        &self.state
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Apply a single action:
    ///   1. Delegate to the transition dispatcher
    ///   2. Validate invariants on the new state
    ///   3. Store it, bumping the version when applied
    pub fn apply_action(&mut self, envelope: &ActionEnvelope) -> (&GameplayState, TransitionResult) {
        let (new_state, result) = transition_apply(&self.state, envelope);
        if result.applied {
            validate_invariants(&new_state);
            self.state = new_state;
            self.version += 1;
        }
        (&self.state, result)
    }

    /// Apply an ordered sequence of actions deterministically.
    pub fn apply_sequence(&mut self, envelopes: &[ActionEnvelope]) -> &GameplayState {
        for envelope in envelopes {
            self.apply_action(envelope);
        }
        &self.state
    }

    /// Reset to a fresh session and replay `envelopes`.
    pub fn replay(
        seed_source: &str,
        constants: Option<GameplayConstants>,
        envelopes: &[ActionEnvelope],
    ) -> Self {
        let mut engine = Self::new(seed_source, constants);
        engine.apply_sequence(envelopes);
        engine
    }
}
