//! Dag - weighted directed acyclic graph of caller-supplied vertices
//!
//! # Design
//!
//! Nodes live in a single arena keyed by [`VertexKey`]. Each node keeps two
//! weighted adjacency maps:
//! - `successors`: edges leaving the node
//! - `predecessors`: edges entering the node
//!
//! Neighbors are referenced by key, never by pointer, so the two maps can be
//! kept symmetric without any shared ownership between nodes. Adjacency maps
//! are ordered by key, which makes every walk over them deterministic.
//!
//! Acyclicity is enforced on insertion: before recording `start -> end` the
//! graph checks whether `end` can already reach `start`.

use super::error::{DagError, DagResult, Endpoint};
use super::vertex::{Vertex, VertexKey};
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A node in the graph: the vertex value plus its weighted neighbors
pub struct Node<V> {
    vertex: Arc<V>,
    predecessors: BTreeMap<VertexKey, i64>,
    successors: BTreeMap<VertexKey, i64>,
}

impl<V> Node<V> {
    pub(crate) fn new(vertex: Arc<V>) -> Self {
        Self {
            vertex,
            predecessors: BTreeMap::new(),
            successors: BTreeMap::new(),
        }
    }

    /// Returns the vertex value
    pub fn vertex(&self) -> &V {
        &self.vertex
    }

    /// Returns the shared handle to the vertex value
    pub fn shared_vertex(&self) -> &Arc<V> {
        &self.vertex
    }

    /// Returns incoming edges as `source key -> weight`
    pub fn predecessors(&self) -> &BTreeMap<VertexKey, i64> {
        &self.predecessors
    }

    /// Returns outgoing edges as `target key -> weight`
    pub fn successors(&self) -> &BTreeMap<VertexKey, i64> {
        &self.successors
    }

    /// Number of incoming edges
    pub fn in_degree(&self) -> usize {
        self.predecessors.len()
    }

    /// Number of outgoing edges
    pub fn out_degree(&self) -> usize {
        self.successors.len()
    }

    pub(crate) fn same_adjacency(&self, other: &Self) -> bool {
        self.predecessors == other.predecessors && self.successors == other.successors
    }
}

impl<V> Clone for Node<V> {
    fn clone(&self) -> Self {
        Self {
            vertex: Arc::clone(&self.vertex),
            predecessors: self.predecessors.clone(),
            successors: self.successors.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Node<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("vertex", &self.vertex)
            .field("predecessors", &self.predecessors)
            .field("successors", &self.successors)
            .finish()
    }
}

/// A weighted directed acyclic graph
///
/// # Example
///
/// ```
/// use dagweave::{Dag, VertexKey};
///
/// let mut dag: Dag<VertexKey> = Dag::new();
/// let fetch = VertexKey::new("step", "fetch");
/// let parse = VertexKey::new("step", "parse");
/// let store = VertexKey::new("step", "store");
///
/// dag.add_edge(fetch.clone(), parse.clone(), 1).unwrap();
/// dag.add_edge(parse.clone(), store.clone(), 1).unwrap();
///
/// // Closing the loop is rejected
/// assert!(dag.add_edge(store.clone(), fetch.clone(), 1).is_err());
///
/// assert_eq!(dag.starting_vertices(), vec![&fetch]);
/// assert_eq!(dag.ending_vertices(), vec![&store]);
/// ```
pub struct Dag<V> {
    /// Map from composite key to node
    nodes: HashMap<VertexKey, Node<V>>,
    /// Insertion order for deterministic iteration
    insertion_order: Vec<VertexKey>,
}

impl<V> Default for Dag<V> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            insertion_order: Vec::new(),
        }
    }
}

impl<V> Clone for Dag<V> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            insertion_order: self.insertion_order.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Dag<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<V> Dag<V> {
    /// Creates a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of vertices in the graph
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no vertices
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the total number of edges
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Node::out_degree).sum()
    }

    /// Returns true if a vertex with this key exists
    pub fn contains_key(&self, key: &VertexKey) -> bool {
        self.nodes.contains_key(key)
    }

    /// Returns the node stored under `key`
    pub fn node(&self, key: &VertexKey) -> Option<&Node<V>> {
        self.nodes.get(key)
    }

    /// Returns the vertex stored under `key`
    pub fn vertex(&self, key: &VertexKey) -> Option<&V> {
        self.nodes.get(key).map(Node::vertex)
    }

    /// Returns all keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &VertexKey> {
        self.insertion_order.iter()
    }

    /// Returns all vertices in insertion order
    pub fn vertices(&self) -> impl Iterator<Item = &V> {
        self.entries().map(|(_, node)| node.vertex())
    }

    /// Returns `(key, node)` pairs in insertion order
    pub fn entries(&self) -> impl Iterator<Item = (&VertexKey, &Node<V>)> {
        self.insertion_order
            .iter()
            .filter_map(|key| self.nodes.get(key).map(|node| (key, node)))
    }

    /// Returns the weight of the edge `start -> end`, if present
    pub fn edge_weight_by_key(&self, start: &VertexKey, end: &VertexKey) -> Option<i64> {
        self.nodes
            .get(start)
            .and_then(|node| node.successors.get(end).copied())
    }

    /// Removes the edge `start -> end`, returning its weight
    ///
    /// Unknown endpoints or a missing edge are not an error. Nodes are never
    /// removed, even if this leaves them without any edge.
    pub fn remove_edge_by_key(&mut self, start: &VertexKey, end: &VertexKey) -> Option<i64> {
        let removed = self.unlink(start, end);
        if let Some(weight) = removed {
            debug!(start = %start, end = %end, weight, "edge removed");
        }
        removed
    }

    /// Vertices with no incoming edges
    ///
    /// Vertices without any edge at all count as starting vertices.
    pub fn starting_vertices(&self) -> Vec<&V> {
        self.entries()
            .filter(|(_, node)| node.predecessors.is_empty())
            .map(|(_, node)| node.vertex())
            .collect()
    }

    /// Vertices with incoming edges but no outgoing ones
    ///
    /// Vertices without any edge at all are not ending vertices.
    pub fn ending_vertices(&self) -> Vec<&V> {
        self.entries()
            .filter(|(_, node)| node.successors.is_empty() && !node.predecessors.is_empty())
            .map(|(_, node)| node.vertex())
            .collect()
    }

    /// Vertices whose category matches; `""` matches every category
    pub fn vertices_in(&self, category: &str) -> Vec<&V> {
        self.entries()
            .filter(|(key, _)| key.in_category(category))
            .map(|(_, node)| node.vertex())
            .collect()
    }

    /// Vertices with the given id; `""` as category searches all categories
    pub fn find(&self, id: &str, category: &str) -> Vec<&V> {
        if !category.is_empty() {
            return self
                .vertex(&VertexKey::new(category, id))
                .into_iter()
                .collect();
        }
        self.entries()
            .filter(|(key, _)| key.id() == id)
            .map(|(_, node)| node.vertex())
            .collect()
    }

    /// Direct successors of `key` in ascending key order
    pub fn successors_by_key(&self, key: &VertexKey) -> Vec<&V> {
        self.neighbors(key, Node::successors)
    }

    /// Direct predecessors of `key` in ascending key order
    pub fn predecessors_by_key(&self, key: &VertexKey) -> Vec<&V> {
        self.neighbors(key, Node::predecessors)
    }

    fn neighbors(
        &self,
        key: &VertexKey,
        side: fn(&Node<V>) -> &BTreeMap<VertexKey, i64>,
    ) -> Vec<&V> {
        self.nodes
            .get(key)
            .map(|node| {
                side(node)
                    .keys()
                    .filter_map(|k| self.vertex(k))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns true if `to` can be reached from `from` by following one or
    /// more successor edges
    pub fn is_reachable_by_key(&self, from: &VertexKey, to: &VertexKey) -> bool {
        let Some(origin) = self.nodes.get(from) else {
            return false;
        };

        let mut visited: HashSet<&VertexKey> = HashSet::new();
        let mut stack: Vec<&VertexKey> = origin.successors.keys().collect();
        while let Some(key) = stack.pop() {
            if key == to {
                return true;
            }
            if !visited.insert(key) {
                continue;
            }
            if let Some(node) = self.nodes.get(key) {
                stack.extend(node.successors.keys());
            }
        }
        false
    }

    /// Returns a topological ordering of all vertices
    ///
    /// Uses Kahn's algorithm. Vertices that become ready at the same time are
    /// emitted in insertion order for roots and key order for successors.
    pub fn topological_order(&self) -> Vec<&V> {
        self.topological_keys()
            .into_iter()
            .filter_map(|key| self.vertex(key))
            .collect()
    }

    /// Keys in the order produced by [`topological_order`](Self::topological_order)
    pub fn topological_keys(&self) -> Vec<&VertexKey> {
        let mut in_degrees: HashMap<&VertexKey, usize> = self
            .nodes
            .iter()
            .map(|(key, node)| (key, node.in_degree()))
            .collect();
        let mut queue: VecDeque<&VertexKey> = self
            .insertion_order
            .iter()
            .filter(|key| in_degrees.get(*key) == Some(&0))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        while let Some(key) = queue.pop_front() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            order.push(key);

            for successor in node.successors.keys() {
                if let Some(degree) = in_degrees.get_mut(successor) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(successor);
                    }
                }
            }
        }

        order
    }

    /// Inserts a node for `vertex` unless its key is already present
    ///
    /// Existing nodes keep their original vertex value.
    pub(crate) fn ensure_node(&mut self, key: VertexKey, vertex: Arc<V>) {
        if let Entry::Vacant(slot) = self.nodes.entry(key) {
            self.insertion_order.push(slot.key().clone());
            slot.insert(Node::new(vertex));
        }
    }

    /// Records `start -> end` on both sides without any validation
    ///
    /// Both nodes must already exist.
    pub(crate) fn link(&mut self, start: &VertexKey, end: &VertexKey, weight: i64) {
        if let Some(node) = self.nodes.get_mut(start) {
            node.successors.insert(end.clone(), weight);
        }
        if let Some(node) = self.nodes.get_mut(end) {
            node.predecessors.insert(start.clone(), weight);
        }
        trace!(start = %start, end = %end, weight, "edge linked");
    }

    /// Deletes `start -> end` from both sides, returning the stored weight
    pub(crate) fn unlink(&mut self, start: &VertexKey, end: &VertexKey) -> Option<i64> {
        if !self.nodes.contains_key(start) || !self.nodes.contains_key(end) {
            return None;
        }
        let removed = self
            .nodes
            .get_mut(start)
            .and_then(|node| node.successors.remove(end));
        if let Some(node) = self.nodes.get_mut(end) {
            node.predecessors.remove(start);
        }
        removed
    }

    /// Copies the node under `key` from `source` (vertex only, no edges)
    pub(crate) fn adopt_node(&mut self, source: &Dag<V>, key: &VertexKey) {
        if let Some(node) = source.nodes.get(key) {
            self.ensure_node(key.clone(), Arc::clone(&node.vertex));
        }
    }

    /// Copies the edge `start -> end` from `source`, adopting both endpoints
    pub(crate) fn adopt_edge(
        &mut self,
        source: &Dag<V>,
        start: &VertexKey,
        end: &VertexKey,
        weight: i64,
    ) {
        self.adopt_node(source, start);
        self.adopt_node(source, end);
        self.link(start, end, weight);
    }

    pub(crate) fn insertion_order(&self) -> &[VertexKey] {
        &self.insertion_order
    }
}

impl<V: Vertex> Dag<V> {
    /// Adds the edge `start -> end` with the given weight
    ///
    /// Missing endpoints are created on first reference. Adding an edge that
    /// already exists overwrites its weight.
    ///
    /// Returns an error if:
    /// - Either endpoint has an empty id
    /// - Both endpoints share a key (self-loop)
    /// - `end` can already reach `start` (the edge would close a cycle)
    pub fn add_edge(
        &mut self,
        start: impl Into<Arc<V>>,
        end: impl Into<Arc<V>>,
        weight: i64,
    ) -> DagResult<()> {
        let start = start.into();
        let end = end.into();
        let start_key = start.key();
        let end_key = end.key();

        self.check_edge(&start_key, &end_key)?;

        self.ensure_node(start_key.clone(), start);
        self.ensure_node(end_key.clone(), end);
        self.link(&start_key, &end_key, weight);

        debug!(start = %start_key, end = %end_key, weight, "edge added");
        Ok(())
    }

    /// Adds several edges in order, stopping at the first failure
    ///
    /// Edges before the failing one stay in the graph.
    pub fn add_edges<I>(&mut self, edges: I) -> DagResult<()>
    where
        I: IntoIterator<Item = (V, V, i64)>,
    {
        for (start, end, weight) in edges {
            self.add_edge(start, end, weight)?;
        }
        Ok(())
    }

    /// Validates an edge against the pre-insertion state of the graph
    pub(crate) fn check_edge(&self, start: &VertexKey, end: &VertexKey) -> DagResult<()> {
        if start.id().is_empty() {
            warn!(start = %start, "rejected edge with empty starting id");
            return Err(DagError::invalid_vertex(Endpoint::Start, start.clone()));
        }
        if end.id().is_empty() {
            warn!(end = %end, "rejected edge with empty ending id");
            return Err(DagError::invalid_vertex(Endpoint::End, end.clone()));
        }
        if start == end {
            warn!(key = %start, "rejected self-loop");
            return Err(DagError::self_loop(start.clone()));
        }
        if self.contains_key(start)
            && self.contains_key(end)
            && self.is_reachable_by_key(end, start)
        {
            warn!(start = %start, end = %end, "rejected edge closing a cycle");
            return Err(DagError::cycle(format!(
                "adding edge {} -> {} would create a cycle",
                start, end
            )));
        }
        Ok(())
    }

    /// Removes the edge `start -> end`, returning its weight
    pub fn remove_edge(&mut self, start: &V, end: &V) -> Option<i64> {
        self.remove_edge_by_key(&start.key(), &end.key())
    }

    /// Returns true if a vertex with the same key exists
    pub fn contains(&self, vertex: &V) -> bool {
        self.contains_key(&vertex.key())
    }

    /// Returns the weight of the edge `start -> end`, if present
    pub fn edge_weight(&self, start: &V, end: &V) -> Option<i64> {
        self.edge_weight_by_key(&start.key(), &end.key())
    }

    /// Direct successors of `vertex`; empty if it is unknown
    pub fn successors_of(&self, vertex: &V) -> Vec<&V> {
        self.successors_by_key(&vertex.key())
    }

    /// Direct predecessors of `vertex`; empty if it is unknown
    pub fn predecessors_of(&self, vertex: &V) -> Vec<&V> {
        self.predecessors_by_key(&vertex.key())
    }

    /// Returns true if `to` can be reached from `from`
    pub fn is_reachable(&self, from: &V, to: &V) -> bool {
        self.is_reachable_by_key(&from.key(), &to.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::testing::{build, v, Letter};

    #[test]
    fn test_empty_graph() {
        let dag: Dag<Letter> = Dag::new();
        assert!(dag.is_empty());
        assert_eq!(dag.len(), 0);
        assert_eq!(dag.edge_count(), 0);
        assert!(dag.vertex(&VertexKey::new("", "a")).is_none());
        assert!(dag.vertices().next().is_none());
        assert!(dag.starting_vertices().is_empty());
        assert!(dag.ending_vertices().is_empty());
        assert!(dag.successors_of(&v("a")).is_empty());
        assert!(dag.predecessors_of(&v("a")).is_empty());
    }

    #[test]
    fn test_invalid_endpoints() {
        let mut dag: Dag<Letter> = Dag::new();
        let result = dag.add_edge(v(""), v("b"), 0);
        assert!(matches!(
            result,
            Err(DagError::InvalidVertex {
                role: Endpoint::Start,
                ..
            })
        ));

        let result = dag.add_edge(v("a"), v(""), 0);
        assert!(matches!(
            result,
            Err(DagError::InvalidVertex {
                role: Endpoint::End,
                ..
            })
        ));

        let result = dag.add_edge(v("a"), v("a"), 0);
        assert!(matches!(result, Err(DagError::SelfLoop { .. })));

        // Failed insertions leave nothing behind
        assert!(dag.is_empty());
    }

    #[test]
    fn test_add_edge() {
        let mut dag: Dag<Letter> = Dag::new();
        dag.add_edge(v("a"), v("b"), 3).unwrap();

        assert_eq!(dag.len(), 2);
        assert_eq!(dag.vertex(&VertexKey::new("", "a")), Some(&v("a")));
        assert_eq!(dag.edge_weight(&v("a"), &v("b")), Some(3));
        assert_eq!(dag.starting_vertices(), vec![&v("a")]);
        assert_eq!(dag.ending_vertices(), vec![&v("b")]);
        assert_eq!(dag.successors_of(&v("a")), vec![&v("b")]);
        assert_eq!(dag.predecessors_of(&v("b")), vec![&v("a")]);

        let a = dag.node(&VertexKey::new("", "a")).unwrap();
        let b = dag.node(&VertexKey::new("", "b")).unwrap();
        assert_eq!(a.successors().get(&VertexKey::new("", "b")), Some(&3));
        assert_eq!(b.predecessors().get(&VertexKey::new("", "a")), Some(&3));
    }

    #[test]
    fn test_upsert_overwrites_weight() {
        let mut dag: Dag<Letter> = Dag::new();
        dag.add_edge(v("a"), v("b"), 1).unwrap();
        dag.add_edge(v("a"), v("b"), 1).unwrap();
        assert_eq!(dag.edge_count(), 1);

        dag.add_edge(v("a"), v("b"), 7).unwrap();
        assert_eq!(dag.edge_count(), 1);
        assert_eq!(dag.edge_weight(&v("a"), &v("b")), Some(7));
        let b = dag.node(&VertexKey::new("", "b")).unwrap();
        assert_eq!(b.predecessors().get(&VertexKey::new("", "a")), Some(&7));
    }

    #[test]
    fn test_cycle_detection() {
        let mut dag = build(&[("a", "b", 0), ("b", "c", 0)]);

        let result = dag.add_edge(v("c"), v("a"), 0);
        assert!(matches!(result, Err(DagError::CycleDetected { .. })));
        assert_eq!(dag.edge_count(), 2);

        let result = dag.add_edge(v("b"), v("a"), 0);
        assert!(result.unwrap_err().is_cycle());
    }

    #[test]
    fn test_remove_edge_keeps_nodes() {
        let mut dag = build(&[("a", "b", 0), ("a", "c", 0), ("x", "b", 0), ("a", "x", 0)]);
        assert!(dag.add_edge(v("b"), v("a"), 0).is_err());

        assert_eq!(dag.remove_edge(&v("a"), &v("b")), Some(0));
        assert_eq!(dag.remove_edge(&v("a"), &v("b")), None);
        assert_eq!(dag.remove_edge(&v("a"), &v("missing")), None);

        // a still reaches b through x
        assert!(dag.add_edge(v("b"), v("a"), 0).is_err());
        assert_eq!(dag.len(), 4);
        assert_eq!(dag.successors_of(&v("a")), vec![&v("c"), &v("x")]);
        assert_eq!(dag.predecessors_of(&v("b")), vec![&v("x")]);
    }

    #[test]
    fn test_isolated_vertex_is_starting_only() {
        let mut dag = build(&[("a", "b", 0)]);
        dag.remove_edge(&v("a"), &v("b"));

        assert_eq!(dag.len(), 2);
        assert_eq!(dag.starting_vertices(), vec![&v("a"), &v("b")]);
        assert!(dag.ending_vertices().is_empty());
    }

    #[test]
    fn test_starting_and_ending() {
        let dag = build(&[("a", "b", 0), ("a", "c", 0), ("x", "b", 0)]);
        assert_eq!(dag.starting_vertices(), vec![&v("a"), &v("x")]);
        assert_eq!(dag.ending_vertices(), vec![&v("b"), &v("c")]);
    }

    #[test]
    fn test_reachability() {
        let dag = build(&[("a", "b", 0), ("b", "c", 0), ("x", "c", 0)]);
        assert!(dag.is_reachable(&v("a"), &v("c")));
        assert!(!dag.is_reachable(&v("c"), &v("a")));
        assert!(!dag.is_reachable(&v("a"), &v("x")));
        assert!(!dag.is_reachable(&v("a"), &v("a")));
        assert!(!dag.is_reachable(&v("missing"), &v("a")));
    }

    #[test]
    fn test_categories() {
        let mut dag: Dag<VertexKey> = Dag::new();
        dag.add_edge(VertexKey::new("task", "a"), VertexKey::new("file", "a"), 0)
            .unwrap();
        dag.add_edge(VertexKey::new("task", "a"), VertexKey::new("task", "b"), 0)
            .unwrap();

        // Same id in different categories is a different vertex
        assert_eq!(dag.len(), 3);
        assert_eq!(dag.vertices_in("task").len(), 2);
        assert_eq!(dag.vertices_in("file").len(), 1);
        assert_eq!(dag.vertices_in("").len(), 3);
        assert_eq!(dag.find("a", "").len(), 2);
        assert_eq!(
            dag.find("a", "file"),
            vec![&VertexKey::new("file", "a")]
        );
        assert!(dag.find("b", "file").is_empty());
    }

    #[test]
    fn test_existing_vertex_value_is_kept() {
        let mut dag: Dag<Letter> = Dag::new();
        dag.add_edge(Letter::with_payload("a", 1), v("b"), 0).unwrap();
        dag.add_edge(Letter::with_payload("a", 2), v("c"), 0).unwrap();

        assert_eq!(dag.len(), 3);
        let a = dag.vertex(&VertexKey::new("", "a")).unwrap();
        assert_eq!(a.payload, 1);
    }

    #[test]
    fn test_topological_order() {
        let dag = build(&[("a", "b", 0), ("a", "c", 0), ("b", "d", 0), ("c", "d", 0)]);
        let order: Vec<_> = dag.topological_order().into_iter().map(|l| l.id()).collect();
        assert_eq!(order, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_add_edges_stops_at_first_error() {
        let mut dag: Dag<Letter> = Dag::new();
        let result = dag.add_edges(vec![
            (v("a"), v("b"), 1),
            (v("b"), v("a"), 1),
            (v("b"), v("c"), 1),
        ]);
        assert!(result.unwrap_err().is_cycle());
        assert_eq!(dag.edge_count(), 1);
        assert!(!dag.contains(&v("c")));
    }
}
