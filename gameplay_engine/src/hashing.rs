/// Gameplay Engine: Canonical Hashing
///
/// Deterministic serialization + SHA-256. Field order follows the struct
/// declarations, every map and set in the state is a BTree, and floats are
/// written in shortest round-trip form, so equal states hash equally on
/// every platform.
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::domain::GameplayState;
use crate::ENGINE_VERSION;

/// Canonical serialization to compact UTF-8 JSON.
/// `engine_version` comes first and binds the hash to the engine identity.
pub fn canonical_serialize(state: &GameplayState) -> Vec<u8> {
    let mut root = Map::new();
    root.insert(
        "engine_version".to_string(),
        Value::Number(ENGINE_VERSION.into()),
    );
    root.insert(
        "state".to_string(),
        serde_json::to_value(state).expect("canonical_serialize: state is always JSON-encodable"),
    );
    serde_json::to_vec(&Value::Object(root))
        .expect("canonical_serialize: JSON serialization failed")
}

/// SHA-256 of the canonical serialization, lowercase hex.
pub fn canonical_hash(state: &GameplayState) -> String {
    let digest = Sha256::digest(canonical_serialize(state));
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
