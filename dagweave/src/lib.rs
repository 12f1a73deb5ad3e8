//! Dagweave: Keyed Directed Acyclic Graphs for Rust
//!
//! `dagweave` stores caller-defined vertex values in a weighted directed acyclic
//! graph, addressed by a composite `(category, id)` key. It is meant for
//! dependency tracking, lineage and workflow planning, where the graph must stay
//! acyclic at all times and traversals must be deterministic.
//!
//! # Features
//!
//! - **Cycle-safe mutation**: Every edge insertion is checked; the graph never holds a cycle
//! - **Composite keys**: Vertices are namespaced by category, with wildcard lookups
//! - **Derived graphs**: Reversal, reachable sub-graphs, transitive closure and reduction
//! - **Path queries**: Enumeration plus shortest/longest selection by hops or weight
//! - **Canonical form**: Export/import through `serde`, JSON codec with stable fingerprints
//! - **Inspection**: Structural summaries and Graphviz DOT output
//!
//! # Quick Start
//!
//! ```
//! use dagweave::prelude::*;
//!
//! let mut dag: Dag<VertexKey> = Dag::new();
//! let fetch = VertexKey::new("task", "fetch");
//! let build = VertexKey::new("task", "build");
//! let test = VertexKey::new("task", "test");
//!
//! dag.add_edge(fetch.clone(), build.clone(), 2)?;
//! dag.add_edge(build.clone(), test.clone(), 5)?;
//! dag.add_edge(fetch.clone(), test.clone(), 1)?;
//!
//! // Closing the loop is refused
//! assert!(dag.add_edge(test.clone(), fetch.clone(), 1).is_err());
//!
//! let longest = dag.longest(&fetch, &test, PathMetric::Weight);
//! assert_eq!(longest, vec![&fetch, &build, &test]);
//!
//! let reduced = dag.reduce_dag(&fetch, &test);
//! assert_eq!(reduced.edge_count(), 2);
//! # Ok::<(), DagError>(())
//! ```
//!
//! # Module Organization
//!
//! Following Parnas's information hiding principles, each module hides specific design
//! decisions that are likely to change:
//!
//! - [`graph`]: DAG structures and algorithms (hides graph representation)
//! - [`core`]: Snapshot codec (hides serialization format)
//!
//! # Design Principles
//!
//! This library follows Dave Cheney's practical programming wisdom:
//! - **Simplicity**: Simple, focused APIs that do one thing well
//! - **Clarity**: Explicit over implicit, readable over clever
//! - **Safety**: Hard to misuse, defaults prevent common mistakes

pub mod core;
pub mod graph;

// Re-export commonly used types for convenience
pub use core::{decode_snapshot, encode_snapshot, fingerprint, CodecError, CodecResult};

pub use graph::{
    Dag, DagError, DagResult, DagSummary, DotConfig, DotLabel, Endpoint, ImportError, Node,
    ParseKeyError, Path, PathMetric, Snapshot, Vertex, VertexKey, VertexRecord,
};

// Re-export dependencies used in public API
// This ensures users don't have version mismatch errors (Effective Rust Item 24)
pub use serde; // Users implement Serialize/Deserialize on their vertex types

/// Prelude module for convenient glob imports
///
/// # Example
///
/// ```
/// use dagweave::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::{decode_snapshot, encode_snapshot, CodecError, CodecResult};

    pub use crate::graph::{
        Dag, DagError, DagResult, PathMetric, Snapshot, Vertex, VertexKey,
    };

    // Re-export commonly used external types
    pub use serde::{Deserialize, Serialize};
    pub use std::sync::Arc;
}
