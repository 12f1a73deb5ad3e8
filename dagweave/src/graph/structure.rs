//! Whole-graph operations: equality, merging and the canonical snapshot form
//!
//! A [`Snapshot`] is the boundary representation of a graph: the vertex list
//! in insertion order plus an edge table `source -> target -> weight`. It
//! derives `serde` traits, so any serde format can carry it; the crate's own
//! JSON codec lives in [`crate::core`].

use super::dag::Dag;
use super::error::{DagError, DagResult, ImportError};
use super::vertex::{Vertex, VertexKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// One declared vertex of a [`Snapshot`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord<V> {
    /// Vertex id, must match `value.id()`
    pub id: String,
    /// Vertex category, must match `value.category()`
    pub category: String,
    /// The caller's vertex value
    pub value: V,
}

/// Canonical, serializable form of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot<V> {
    /// Declared vertices, in the graph's insertion order
    pub vertices: Vec<VertexRecord<V>>,
    /// Edge table: source key -> (target key -> weight)
    #[serde(default)]
    pub edges: BTreeMap<VertexKey, BTreeMap<VertexKey, i64>>,
}

impl<V> Default for Snapshot<V> {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            edges: BTreeMap::new(),
        }
    }
}

impl<V> Snapshot<V> {
    /// Number of edges in the table
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeMap::len).sum()
    }
}

/// Graphs are equal when they hold the same keys with the same weighted
/// neighbors. Vertex payloads and insertion order are not compared.
impl<V> PartialEq for Dag<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.entries().all(|(key, node)| {
                other
                    .node(key)
                    .is_some_and(|theirs| node.same_adjacency(theirs))
            })
    }
}

impl<V> Eq for Dag<V> {}

impl<V> Dag<V> {
    /// Unions `other` into this graph
    ///
    /// Nodes missing here are added; for nodes present in both, edges from
    /// `other` overwrite weights on collision. After each node of `other` is
    /// merged the graph checks that the node cannot reach itself.
    ///
    /// On `CycleDetected` the receiver keeps everything merged so far. Clone
    /// it first if the merge must be all-or-nothing.
    pub fn merge(&mut self, other: &Dag<V>) -> DagResult<()> {
        for (key, node) in other.entries() {
            self.adopt_node(other, key);
            for (next, &weight) in node.successors() {
                self.adopt_edge(other, key, next, weight);
            }
            for (prev, &weight) in node.predecessors() {
                self.adopt_edge(other, prev, key, weight);
            }

            if self.is_reachable_by_key(key, key) {
                warn!(key = %key, "merge closed a cycle, graph left partially merged");
                return Err(DagError::cycle(format!(
                    "merging {} would create a cycle",
                    key
                )));
            }
        }

        debug!(
            merged = other.len(),
            vertices = self.len(),
            edges = self.edge_count(),
            "merged graph"
        );
        Ok(())
    }

    /// Exports the canonical form of this graph
    pub fn export(&self) -> Snapshot<V>
    where
        V: Clone,
    {
        let vertices = self
            .entries()
            .map(|(key, node)| VertexRecord {
                id: key.id().to_string(),
                category: key.category().to_string(),
                value: node.vertex().clone(),
            })
            .collect();
        let edges = self
            .entries()
            .filter(|(_, node)| node.out_degree() > 0)
            .map(|(key, node)| (key.clone(), node.successors().clone()))
            .collect();

        Snapshot { vertices, edges }
    }
}

impl<V: Vertex> Dag<V> {
    /// Rebuilds a graph from its canonical form
    ///
    /// Rejects empty ids, records whose fields disagree with their value,
    /// duplicate keys, edges to undeclared vertices, and edges that
    /// [`add_edge`](Self::add_edge) would refuse. No graph is returned on
    /// failure.
    pub fn import(snapshot: Snapshot<V>) -> DagResult<Dag<V>> {
        let result = Self::build_from(snapshot);
        match &result {
            Ok(dag) => debug!(
                vertices = dag.len(),
                edges = dag.edge_count(),
                "imported snapshot"
            ),
            Err(e) => warn!(error = %e, "snapshot import failed"),
        }
        result
    }

    fn build_from(snapshot: Snapshot<V>) -> DagResult<Dag<V>> {
        let mut dag = Dag::new();

        for VertexRecord {
            id,
            category,
            value,
        } in snapshot.vertices
        {
            if id.is_empty() {
                return Err(ImportError::EmptyId { category }.into());
            }
            let declared = VertexKey::new(category, id);
            let actual = value.key();
            if actual != declared {
                return Err(ImportError::IdentityMismatch { declared, actual }.into());
            }
            if dag.contains_key(&declared) {
                return Err(ImportError::DuplicateVertex { key: declared }.into());
            }
            dag.ensure_node(declared, Arc::new(value));
        }

        for (start, targets) in &snapshot.edges {
            for (end, &weight) in targets {
                for endpoint in [start, end] {
                    if !dag.contains_key(endpoint) {
                        return Err(ImportError::UnknownVertex {
                            start: start.clone(),
                            end: end.clone(),
                            missing: endpoint.clone(),
                        }
                        .into());
                    }
                }
                dag.check_edge(start, end)
                    .map_err(|e| ImportError::RejectedEdge {
                        start: start.clone(),
                        end: end.clone(),
                        reason: e.to_string(),
                    })?;
                dag.link(start, end, weight);
            }
        }

        Ok(dag)
    }
}

impl<V: Vertex> TryFrom<Snapshot<V>> for Dag<V> {
    type Error = DagError;

    fn try_from(snapshot: Snapshot<V>) -> DagResult<Self> {
        Dag::import(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::{build, ids, sample, v, Letter};

    fn record(id: &str) -> VertexRecord<Letter> {
        VertexRecord {
            id: id.to_string(),
            category: String::new(),
            value: v(id),
        }
    }

    fn key(id: &str) -> VertexKey {
        VertexKey::new("", id)
    }

    #[test]
    fn test_equality_ignores_order_and_payload() {
        let forward = build(&[("a", "b", 1), ("b", "c", 2)]);
        let mut backward: Dag<Letter> = Dag::new();
        backward
            .add_edge(Letter::with_payload("b", 9), v("c"), 2)
            .unwrap();
        backward
            .add_edge(v("a"), Letter::with_payload("b", 7), 1)
            .unwrap();
        assert_eq!(forward, backward);

        backward.add_edge(v("a"), v("b"), 5).unwrap();
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_clone_is_deep() {
        let dag = sample(0);
        let mut copy = dag.clone();
        assert_eq!(copy, dag);

        copy.remove_edge(&v("a"), &v("b"));
        assert_ne!(copy, dag);
        assert_eq!(dag.edge_weight(&v("a"), &v("b")), Some(0));
    }

    #[test]
    fn test_merge() {
        let mut left = build(&[("a", "b", 1), ("b", "c", 1)]);
        let right = build(&[("b", "c", 5), ("c", "d", 1), ("x", "a", 1)]);
        left.merge(&right).unwrap();

        assert_eq!(
            left,
            build(&[("a", "b", 1), ("b", "c", 5), ("c", "d", 1), ("x", "a", 1)])
        );
        assert_eq!(ids(left.starting_vertices()), vec!["x"]);
    }

    #[test]
    fn test_merge_cycle_leaves_partial_state() {
        let mut left = build(&[("a", "b", 1)]);
        let right = build(&[("b", "a", 1)]);

        let err = left.merge(&right).unwrap_err();
        assert!(err.is_cycle());
        // No rollback: the offending edge stays
        assert_eq!(left.edge_weight(&v("b"), &v("a")), Some(1));
    }

    #[test]
    fn test_merge_on_clone_is_atomic() {
        let left = build(&[("a", "b", 1)]);
        let right = build(&[("b", "a", 1)]);

        let mut attempt = left.clone();
        assert!(attempt.merge(&right).is_err());
        assert_eq!(left, build(&[("a", "b", 1)]));
    }

    #[test]
    fn test_export_shape() {
        let mut dag = build(&[("a", "b", 3), ("a", "c", 4)]);
        dag.remove_edge(&v("a"), &v("c"));
        let snapshot = dag.export();

        let declared: Vec<_> = snapshot.vertices.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(declared, vec!["a", "b", "c"]);
        assert_eq!(snapshot.edge_count(), 1);
        assert_eq!(snapshot.edges[&key("a")][&key("b")], 3);
    }

    #[test]
    fn test_round_trip_keeps_isolated_vertices() {
        let mut dag = sample(2);
        dag.remove_edge(&v("x"), &v("b"));
        let restored = Dag::import(dag.export()).unwrap();
        assert_eq!(restored, dag);
        assert!(restored.contains(&v("x")));
        assert_eq!(
            restored.keys().collect::<Vec<_>>(),
            dag.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_import_rejects_duplicates() {
        let snapshot = Snapshot {
            vertices: vec![record("a"), record("a")],
            edges: BTreeMap::new(),
        };
        assert!(matches!(
            Dag::import(snapshot),
            Err(DagError::Import(ImportError::DuplicateVertex { .. }))
        ));
    }

    #[test]
    fn test_import_rejects_unknown_vertex() {
        let mut snapshot = Snapshot {
            vertices: vec![record("a")],
            ..Snapshot::default()
        };
        snapshot
            .edges
            .entry(key("a"))
            .or_default()
            .insert(key("ghost"), 1);

        match Dag::import(snapshot) {
            Err(DagError::Import(ImportError::UnknownVertex { missing, .. })) => {
                assert_eq!(missing, key("ghost"));
            }
            other => panic!("expected unknown vertex error, got {:?}", other),
        }
    }

    #[test]
    fn test_import_rejects_cycle_and_self_loop() {
        let mut snapshot = Snapshot {
            vertices: vec![record("a"), record("b")],
            ..Snapshot::default()
        };
        snapshot.edges.entry(key("a")).or_default().insert(key("b"), 1);
        snapshot.edges.entry(key("b")).or_default().insert(key("a"), 1);
        assert!(matches!(
            Dag::import(snapshot),
            Err(DagError::Import(ImportError::RejectedEdge { .. }))
        ));

        let mut snapshot = Snapshot {
            vertices: vec![record("a")],
            ..Snapshot::default()
        };
        snapshot.edges.entry(key("a")).or_default().insert(key("a"), 1);
        assert!(matches!(
            Dag::<Letter>::try_from(snapshot),
            Err(DagError::Import(ImportError::RejectedEdge { .. }))
        ));
    }

    #[test]
    fn test_import_rejects_bad_records() {
        let snapshot = Snapshot {
            vertices: vec![VertexRecord {
                id: "a".to_string(),
                category: "task".to_string(),
                value: v("a"),
            }],
            ..Snapshot::default()
        };
        assert!(matches!(
            Dag::import(snapshot),
            Err(DagError::Import(ImportError::IdentityMismatch { .. }))
        ));

        let snapshot = Snapshot {
            vertices: vec![record("")],
            ..Snapshot::default()
        };
        assert!(matches!(
            Dag::import(snapshot),
            Err(DagError::Import(ImportError::EmptyId { .. }))
        ));
    }
}
