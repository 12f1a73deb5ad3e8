use super::error::{CodecError, CodecResult};
use crate::graph::{Dag, Snapshot, Vertex};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Compute a stable hash of encoded bytes.
///
/// Uses SeaHash, whose output does not depend on the compiler version,
/// the process or the machine. Two graphs with equal snapshots encode to
/// the same bytes, so their fingerprints match.
///
/// Note: This is NOT cryptographically secure.
pub fn fingerprint(bytes: &[u8]) -> u64 {
    seahash::hash(bytes)
}

/// Encodes a snapshot to JSON bytes.
///
/// # Errors
/// Returns `CodecError::Serialization` if a vertex value cannot be serialized.
pub fn encode_snapshot<V: Serialize>(snapshot: &Snapshot<V>) -> CodecResult<Vec<u8>> {
    let bytes = serde_json::to_vec(snapshot).map_err(CodecError::Serialization)?;
    debug!(
        vertices = snapshot.vertices.len(),
        edges = snapshot.edge_count(),
        bytes = bytes.len(),
        "encoded snapshot"
    );
    Ok(bytes)
}

/// Decodes JSON bytes and rebuilds the graph they describe.
///
/// # Errors
/// Returns `CodecError::Deserialization` for malformed input and
/// `CodecError::Import` when the snapshot is not a valid graph.
pub fn decode_snapshot<V>(bytes: &[u8]) -> CodecResult<Dag<V>>
where
    V: DeserializeOwned + Vertex,
{
    let snapshot: Snapshot<V> =
        serde_json::from_slice(bytes).map_err(CodecError::Deserialization)?;
    Ok(Dag::import(snapshot)?)
}
