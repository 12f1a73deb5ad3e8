//! Directed Acyclic Graph of Keyed Vertices
//!
//! This module provides a weighted DAG whose vertices are caller values
//! addressed by a composite `(category, id)` key. It enables:
//!
//! - Incremental edge insertion with self-loop and cycle rejection
//! - Reachability queries and starting/ending vertex discovery
//! - Derived graphs: reversal, reachable sub-graph, transitive closure and reduction
//! - Path enumeration with shortest/longest selection by hops or weight
//! - Merging, equality and a serializable canonical form
//! - Summaries and Graphviz DOT rendering
//!
//! # Design Principles
//!
//! Following Parnas's information hiding principles:
//! - This module hides the graph representation (keyed arena with ordered adjacency maps)
//! - Exposes only abstract operations: add_edge, is_reachable, close_dag, etc.
//!
//! Every walk visits successors in ascending key order, so results are
//! deterministic for a given graph.
//!
//! # Algorithm References
//!
//! - Kahn's algorithm for topological order
//! - Transitive reduction by edge removal and reachability re-check

mod dag;
mod derive;
mod error;
mod render;
mod structure;
#[cfg(test)]
mod testing;
mod traverse;
mod vertex;

pub use dag::{Dag, Node};
pub use error::{DagError, DagResult, Endpoint, ImportError};
pub use render::{DagSummary, DotConfig, DotLabel};
pub use structure::{Snapshot, VertexRecord};
pub use traverse::{Path, PathMetric};
pub use vertex::{ParseKeyError, Vertex, VertexKey};
