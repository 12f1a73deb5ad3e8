use crate::graph::DagError;
use thiserror::Error;

/// Error type for encoding and decoding graph snapshots.
///
/// Uses `thiserror` with `#[source]` annotations so the underlying
/// `serde_json` error stays reachable through the error chain.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// Serialization failed when encoding a snapshot to bytes.
    #[error("serialization failed")]
    Serialization(#[source] serde_json::Error),

    /// Deserialization failed when decoding bytes to a snapshot.
    #[error("deserialization failed")]
    Deserialization(#[source] serde_json::Error),

    /// The bytes decoded to a snapshot that does not describe a valid graph.
    #[error("snapshot rejected: {0}")]
    Import(#[from] DagError),
}

pub type CodecResult<T> = std::result::Result<T, CodecError>;
