#![forbid(unsafe_code)]

//! Gameplay Runtime
//!
//! Hosts the gameplay engine: sessions with optimistic concurrency,
//! versioned snapshots, replay and drift detection.
//!
//! No domain logic lives here. All transitions and invariants are
//! delegated to the engine.

pub mod drift;
pub mod replay;
pub mod session;
pub mod snapshot;
pub mod snapshot_codec;
