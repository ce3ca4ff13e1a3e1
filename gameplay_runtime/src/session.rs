//! Session manager: isolated sessions with optimistic concurrency.
//!
//! A session owns one engine `(state, version)`, the roster of joined
//! players and the log of applied actions. Concurrency: a Mutex serializes
//! writers and the version check happens under the lock, so two requests
//! computed against the same version yield one success and one conflict.
//!
//! Apply order:
//!   1. check session id, roster and `expected_version`
//!   2. engine.apply_action(action)  (panics on invariant violation)
//!   3. append to the action log, only if the action was applied
//!   4. snapshot if the interval is reached

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use gameplay_engine::domain::{GameplayConstants, GameplayState, TransitionResult};
use gameplay_engine::engine::GameplayEngine;
use gameplay_engine::events::{ActionEnvelope, GameplayAction};
use gameplay_engine::hashing::canonical_hash;

use crate::replay;
use crate::snapshot::{self, Snapshot};
use crate::snapshot_codec::SnapshotError;

// ---------------------------------------------------------------------------
// Configuration & protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub max_players: usize,
    /// Snapshot every N applied actions. 0 disables automatic snapshots.
    pub snapshot_interval: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_players: 5,
            snapshot_interval: 0,
        }
    }
}

/// One action as submitted by a client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub session_id: String,
    pub player_id: String,
    #[serde(flatten)]
    pub action: GameplayAction,
    /// Version the client computed the action against. `None` skips the check.
    #[serde(default)]
    pub expected_version: Option<u64>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionResponse {
    pub state: GameplayState,
    pub version: u64,
    pub result: TransitionResult,
}

/// Wire reply for a failed request: `{ "conflict": bool, "error": .. }`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReply {
    pub conflict: bool,
    pub error: String,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("version conflict: expected {expected}, current {current}")]
    Conflict { expected: u64, current: u64 },
    #[error("request for session {0} sent to a different session")]
    WrongSession(String),
    #[error("player {0} has not joined this session")]
    UnknownPlayer(String),
    #[error("session is full ({max} players)")]
    SessionFull { max: usize },
    #[error("player id must be non-empty")]
    BlankPlayer,
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl SessionError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SessionError::Conflict { .. })
    }

    pub fn reply(&self) -> ErrorReply {
        ErrorReply {
            conflict: self.is_conflict(),
            error: self.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An isolated gameplay session with its own action log and state.
pub struct Session {
    session_id: String,
    seed_source: String,
    constants: Option<GameplayConstants>,
    config: SessionConfig,
    engine: GameplayEngine,
    players: Vec<String>,
    /// Applied actions only; entry `i` produced version `i + 1`.
    action_log: Vec<ActionEnvelope>,
    latest_snapshot: Option<Snapshot>,
}

impl Session {
    pub fn new(
        session_id: &str,
        seed_source: &str,
        constants: Option<GameplayConstants>,
        config: SessionConfig,
    ) -> Self {
        info!(session_id, seed_source, "session created");
        Self {
            session_id: session_id.to_string(),
            seed_source: seed_source.to_string(),
            engine: GameplayEngine::new(seed_source, constants.clone()),
            constants,
            config,
            players: Vec::new(),
            action_log: Vec::new(),
            latest_snapshot: None,
        }
    }

    /// Add a player to the roster. Joining twice is a no-op.
    pub fn join(&mut self, player_id: &str) -> Result<(), SessionError> {
        let player_id = player_id.trim();
        if player_id.is_empty() {
            return Err(SessionError::BlankPlayer);
        }
        if self.players.iter().any(|p| p == player_id) {
            return Ok(());
        }
        if self.players.len() >= self.config.max_players {
            return Err(SessionError::SessionFull {
                max: self.config.max_players,
            });
        }
        self.players.push(player_id.to_string());
        info!(session_id = %self.session_id, player_id, "player joined");
        Ok(())
    }

    /// Remove a player. Returns whether they were on the roster.
    pub fn leave(&mut self, player_id: &str) -> bool {
        let before = self.players.len();
        self.players.retain(|p| p != player_id);
        let left = self.players.len() != before;
        if left {
            info!(session_id = %self.session_id, player_id, "player left");
        }
        left
    }

    /// Apply one request against the current version.
    ///
    /// A silently rejected action is not an error: it returns the unchanged
    /// state and version with `result.applied == false`.
    pub fn apply(&mut self, request: ActionRequest) -> Result<ActionResponse, SessionError> {
        if request.session_id != self.session_id {
            return Err(SessionError::WrongSession(request.session_id));
        }
        if !self.players.iter().any(|p| *p == request.player_id) {
            return Err(SessionError::UnknownPlayer(request.player_id));
        }
        let current = self.engine.version();
        if let Some(expected) = request.expected_version {
            if expected != current {
                warn!(
                    session_id = %self.session_id,
                    player_id = %request.player_id,
                    expected,
                    current,
                    "version conflict"
                );
                return Err(SessionError::Conflict { expected, current });
            }
        }

        let envelope = ActionEnvelope::new(request.player_id, request.at, request.action);
        let (state, result) = self.engine.apply_action(&envelope);
        let state = state.clone();
        let version = self.engine.version();

        if result.applied {
            self.action_log.push(envelope);
            if self.config.snapshot_interval > 0 && version % self.config.snapshot_interval == 0 {
                self.latest_snapshot = Some(snapshot::take_snapshot(version, &state)?);
            }
        }

        Ok(ActionResponse {
            state,
            version,
            result,
        })
    }

    /// Take a snapshot of the current state and keep it as the latest.
    pub fn snapshot(&mut self) -> Result<Snapshot, SessionError> {
        let snap = snapshot::take_snapshot(self.engine.version(), self.engine.state())?;
        self.latest_snapshot = Some(snap.clone());
        Ok(snap)
    }

    /// Full replay from the action log: reset the engine and replay everything.
    pub fn replay_full(&mut self) -> (GameplayState, String) {
        let (state, hash) =
            replay::rebuild_state(&self.seed_source, self.constants.clone(), &self.action_log);
        self.engine = GameplayEngine::replay(&self.seed_source, self.constants.clone(), &self.action_log);
        (state, hash)
    }

    /// Rebuild the engine from the latest snapshot plus the actions logged
    /// after it. Falls back to a full replay when there is no usable snapshot.
    pub fn restore(&mut self) -> String {
        let restored = self
            .latest_snapshot
            .as_ref()
            .map(snapshot::load_snapshot)
            .transpose();

        match restored {
            Ok(Some((base, base_version))) => {
                let tail = self
                    .action_log
                    .get(base_version as usize..)
                    .unwrap_or_default();
                self.engine = GameplayEngine::from_state(base, base_version);
                self.engine.apply_sequence(tail);
                info!(session_id = %self.session_id, base_version, "session restored from snapshot");
                self.current_hash()
            }
            Ok(None) => self.replay_full().1,
            Err(err) => {
                warn!(session_id = %self.session_id, error = %err, "snapshot unusable, replaying");
                self.replay_full().1
            }
        }
    }

    pub fn state(&self) -> &GameplayState {
        self.engine.state()
    }

    pub fn version(&self) -> u64 {
        self.engine.version()
    }

    pub fn current_hash(&self) -> String {
        canonical_hash(self.engine.state())
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn players(&self) -> &[String] {
        &self.players
    }

    pub fn action_log(&self) -> &[ActionEnvelope] {
        &self.action_log
    }

    pub fn latest_snapshot(&self) -> Option<&Snapshot> {
        self.latest_snapshot.as_ref()
    }

    /// Install a snapshot received from elsewhere. It is verified on `restore`.
    pub fn replace_snapshot(&mut self, snap: Option<Snapshot>) {
        self.latest_snapshot = snap;
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// Thread-safe session handle using Mutex.
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Apply a request under lock.
    pub fn apply(&self, request: ActionRequest) -> Result<ActionResponse, SessionError> {
        let mut session = self.inner.lock().expect("Session lock poisoned");
        session.apply(request)
    }

    pub fn join(&self, player_id: &str) -> Result<(), SessionError> {
        let mut session = self.inner.lock().expect("Session lock poisoned");
        session.join(player_id)
    }

    pub fn leave(&self, player_id: &str) -> bool {
        let mut session = self.inner.lock().expect("Session lock poisoned");
        session.leave(player_id)
    }

    /// Clone of the current `(state, version)` pair.
    pub fn read(&self) -> (GameplayState, u64) {
        let session = self.inner.lock().expect("Session lock poisoned");
        (session.state().clone(), session.version())
    }

    pub fn current_hash(&self) -> String {
        let session = self.inner.lock().expect("Session lock poisoned");
        session.current_hash()
    }

    pub fn version(&self) -> u64 {
        let session = self.inner.lock().expect("Session lock poisoned");
        session.version()
    }

    pub fn into_inner(self) -> Session {
        self.inner.into_inner().expect("Session lock poisoned")
    }
}
