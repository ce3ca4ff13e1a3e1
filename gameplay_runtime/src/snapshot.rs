//! Snapshot layer: versioned, self-verifying state snapshots.
//!
//! A snapshot carries the encoded state, its hash and the session version
//! it was taken at. No wall-clock timestamps in snapshot content.
//!
//! If a snapshot hash doesn't match its content, the snapshot is refused
//! and the caller falls back to a full replay.

use serde::{Deserialize, Serialize};

use gameplay_engine::domain::GameplayState;
use gameplay_engine::ENGINE_VERSION;

use crate::snapshot_codec::{encode_snapshot, restore_snapshot, sha256_hex, SnapshotError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session version at which this snapshot was taken.
    pub version: u64,
    /// `schema_version` of the encoded state.
    pub schema_version: u32,
    /// Engine version at snapshot time.
    pub engine_version: u32,
    /// Encoded state (UTF-8 JSON).
    pub state_json: String,
    /// SHA-256 of `state_json`.
    pub hash: String,
}

/// Take a snapshot of `state` at session `version`.
pub fn take_snapshot(version: u64, state: &GameplayState) -> Result<Snapshot, SnapshotError> {
    let state_json = encode_snapshot(state)?;
    let hash = sha256_hex(state_json.as_bytes());
    Ok(Snapshot {
        version,
        schema_version: state.schema_version,
        engine_version: ENGINE_VERSION,
        state_json,
        hash,
    })
}

/// Verify a snapshot's internal hash consistency.
/// Returns true if the hash matches the encoded content.
pub fn verify_snapshot_hash(snap: &Snapshot) -> bool {
    sha256_hex(snap.state_json.as_bytes()) == snap.hash
}

/// Verify, decode and validate a snapshot. Returns the state and version.
pub fn load_snapshot(snap: &Snapshot) -> Result<(GameplayState, u64), SnapshotError> {
    if !verify_snapshot_hash(snap) {
        return Err(SnapshotError::HashMismatch {
            expected: snap.hash.clone(),
            computed: sha256_hex(snap.state_json.as_bytes()),
        });
    }
    let state = restore_snapshot(&snap.state_json)?;
    Ok((state, snap.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gameplay_engine::state::create_initial_state;

    #[test]
    fn snapshot_roundtrip() {
        let state = create_initial_state("snap", None);
        let snap = take_snapshot(7, &state).unwrap();
        assert!(verify_snapshot_hash(&snap));
        assert_eq!(snap.engine_version, ENGINE_VERSION);

        let (loaded, version) = load_snapshot(&snap).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(version, 7);
    }

    #[test]
    fn tampered_snapshot_is_refused() {
        let state = create_initial_state("snap", None);
        let mut snap = take_snapshot(1, &state).unwrap();
        snap.state_json = snap.state_json.replace("\"credits\":160", "\"credits\":9000");
        assert!(!verify_snapshot_hash(&snap));
        assert!(matches!(
            load_snapshot(&snap),
            Err(SnapshotError::HashMismatch { .. })
        ));
    }
}
