#![forbid(unsafe_code)]

/// Engine v1: bump when a transition's observable behaviour changes.
pub const ENGINE_VERSION: u32 = 1;

pub mod arithmetic;
pub mod catalog;
pub mod domain;
pub mod economy;
pub mod engine;
pub mod events;
pub mod hashing;
pub mod invariants;
pub mod outcome;
pub mod progression;
pub mod projection;
pub mod state;
pub mod transitions;

pub use domain::{GameplayState, Rejection, TransitionResult};
pub use engine::GameplayEngine;
pub use events::{ActionContext, ActionEnvelope, GameplayAction};
