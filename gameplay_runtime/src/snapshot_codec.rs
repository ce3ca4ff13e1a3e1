//! Snapshot Codec: versioned GameplayState encoder/decoder.
//!
//! Pure codec layer. No side-effects, no wall clock.
//!
//! - `encode_snapshot`:  GameplayState → JSON string
//! - `decode_snapshot`:  JSON string → GameplayState (upgrades older schemas)
//! - `restore_snapshot`: decode + invariant validation
//! - `snapshot_hash`:    SHA-256 of the encoded JSON (lowercase hex)
//!
//! Schema history:
//!   v1: narrative and skill nodes stored as arrays; no reward, cinematic,
//!       safety, sandbox, outcome or progression slices.
//!   v2: id-keyed node tables, every slice present.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use thiserror::Error;

use gameplay_engine::catalog;
use gameplay_engine::domain::{GameplayState, STATE_SCHEMA_VERSION};
use gameplay_engine::invariants::{try_validate_invariants, InvariantViolation};
use gameplay_engine::state::normalize_state;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// All possible snapshot codec failures.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("serialization failed: {0}")]
    Serialization(String),
    /// Malformed JSON or a shape no known schema accepts.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
    #[error("unsupported schema version {found} (newest known is {supported})")]
    UnsupportedSchema { found: u64, supported: u32 },
    #[error("loaded state is invalid: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("snapshot hash mismatch: expected {expected}, computed {computed}")]
    HashMismatch { expected: String, computed: String },
}

// ---------------------------------------------------------------------------
// Encoder
// ---------------------------------------------------------------------------

/// Encode a GameplayState to a JSON string.
///
/// BTreeMap/BTreeSet keep keys sorted and `preserve_order` keeps struct
/// field order, so equal states encode to identical bytes.
pub fn encode_snapshot(state: &GameplayState) -> Result<String, SnapshotError> {
    serde_json::to_string(state).map_err(|e| SnapshotError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

/// Decode a JSON string into a GameplayState, upgrading older schemas.
///
/// Absent `schema_version` means v1. Derived fields are re-derived once
/// here. No invariant validation: use `restore_snapshot` for that.
pub fn decode_snapshot(json: &str) -> Result<GameplayState, SnapshotError> {
    let mut value: Value =
        serde_json::from_str(json).map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
    let root = value
        .as_object_mut()
        .ok_or_else(|| SnapshotError::Deserialization("state must be a JSON object".into()))?;

    let schema = root
        .get("schema_version")
        .and_then(Value::as_u64)
        .unwrap_or(1);
    if schema > u64::from(STATE_SCHEMA_VERSION) {
        return Err(SnapshotError::UnsupportedSchema {
            found: schema,
            supported: STATE_SCHEMA_VERSION,
        });
    }
    if schema < 2 {
        upgrade_v1(root)?;
    }

    let mut state: GameplayState = serde_json::from_value(value)
        .map_err(|e| SnapshotError::Deserialization(e.to_string()))?;
    normalize_state(&mut state);
    Ok(state)
}

fn upgrade_v1(root: &mut Map<String, Value>) -> Result<(), SnapshotError> {
    if let Some(nodes) = root.get_mut("narrative").and_then(|n| n.get_mut("nodes")) {
        *nodes = keyed_by_id(nodes.take())?;
    }

    if let Some(nodes) = root.get_mut("skills").and_then(|s| s.get_mut("nodes")) {
        *nodes = keyed_by_id(nodes.take())?;
        let catalog = catalog::skill_nodes();
        if let Some(table) = nodes.as_object_mut() {
            for (id, node) in table.iter_mut() {
                let (Some(fields), Some(known)) = (node.as_object_mut(), catalog.get(id)) else {
                    continue;
                };
                fields
                    .entry("min_level")
                    .or_insert_with(|| Value::from(known.min_level));
                fields
                    .entry("milestones")
                    .or_insert_with(|| Value::from(known.milestones.clone()));
            }
        }
    }

    root.insert("schema_version".to_string(), Value::from(STATE_SCHEMA_VERSION));
    Ok(())
}

/// `[{ "id": "a", .. }, ..]` → `{ "a": { "id": "a", .. }, .. }`.
/// Already-keyed tables pass through.
fn keyed_by_id(nodes: Value) -> Result<Value, SnapshotError> {
    let items = match nodes {
        Value::Array(items) => items,
        other @ Value::Object(_) => return Ok(other),
        _ => {
            return Err(SnapshotError::Deserialization(
                "node table must be an array or an object".into(),
            ))
        }
    };

    let mut table = Map::new();
    for item in items {
        let id = item
            .get("id")
            .and_then(Value::as_str)
            .ok_or_else(|| SnapshotError::Deserialization("node without an id".into()))?
            .to_string();
        table.insert(id, item);
    }
    Ok(Value::Object(table))
}

// ---------------------------------------------------------------------------
// Restore (decode + validate)
// ---------------------------------------------------------------------------

/// Decode a JSON string and validate invariants immediately.
///
/// This is the safe entry point for loading state from untrusted sources.
pub fn restore_snapshot(json: &str) -> Result<GameplayState, SnapshotError> {
    let state = decode_snapshot(json)?;
    try_validate_invariants(&state)?;
    Ok(state)
}

// ---------------------------------------------------------------------------
// Hash
// ---------------------------------------------------------------------------

/// SHA-256 of the encoded JSON. Lowercase hex string.
///
/// NOTE: This hashes the serde-derived JSON, NOT `hashing::canonical_hash`
/// (which also covers `ENGINE_VERSION`). It is for snapshot integrity only.
pub fn snapshot_hash(state: &GameplayState) -> Result<String, SnapshotError> {
    let json = encode_snapshot(state)?;
    Ok(sha256_hex(json.as_bytes()))
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
