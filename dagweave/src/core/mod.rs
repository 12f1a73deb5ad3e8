//! Snapshot codec for dagweave graphs.
//!
//! # Serialization
//! - [`encode_snapshot`]: Convert a [`Snapshot`](crate::graph::Snapshot) to JSON bytes
//! - [`decode_snapshot`]: Convert JSON bytes back into a validated graph
//! - [`fingerprint`]: Create a stable hash of encoded bytes for change detection
//!
//! # Error Handling
//! - [`CodecError`]: Codec error type with proper error chains
//! - [`CodecResult<T>`]: Type alias for Results using CodecError
//!
//! # Example
//!
//! ```
//! use dagweave::core::{decode_snapshot, encode_snapshot, fingerprint};
//! use dagweave::graph::{Dag, VertexKey};
//!
//! let mut dag: Dag<VertexKey> = Dag::new();
//! dag.add_edge(VertexKey::new("", "fetch"), VertexKey::new("", "build"), 1)
//!     .unwrap();
//!
//! let bytes = encode_snapshot(&dag.export()).unwrap();
//! let hash = fingerprint(&bytes);
//!
//! let restored: Dag<VertexKey> = decode_snapshot(&bytes).unwrap();
//! assert_eq!(restored, dag);
//! assert_eq!(fingerprint(&encode_snapshot(&restored.export()).unwrap()), hash);
//! ```

mod error;
mod serialization;

pub use error::{CodecError, CodecResult};
pub use serialization::{decode_snapshot, encode_snapshot, fingerprint};
