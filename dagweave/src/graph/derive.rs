//! Derived graphs
//!
//! Every operation here builds a brand new [`Dag`] from the receiver. Vertex
//! values are shared through their `Arc`, adjacency maps never are.
//!
//! The walks use explicit stacks instead of recursion so long dependency
//! chains cannot exhaust the call stack. Successors are always visited in
//! ascending key order, and nodes are created in the same order a recursive
//! depth-first walk would create them.

use super::dag::{Dag, Node};
use super::vertex::{Vertex, VertexKey};
use std::collections::btree_map;
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// One level of the closure walk
struct ClosureFrame<'a> {
    key: VertexKey,
    successors: btree_map::Iter<'a, VertexKey, i64>,
    /// Child currently being explored, with the weight of the edge to it
    pending: Option<(&'a VertexKey, i64)>,
    /// Whether any successor lies on a path to the end vertex
    on_path: bool,
}

impl<'a> ClosureFrame<'a> {
    fn new<V>(key: VertexKey, node: &'a Node<V>) -> Self {
        Self {
            key,
            successors: node.successors().iter(),
            pending: None,
            on_path: false,
        }
    }
}

impl<V> Dag<V> {
    /// Returns a new graph with every edge direction flipped
    ///
    /// The vertex set and the weights are unchanged.
    pub fn reverse(&self) -> Dag<V> {
        let mut reversed = Dag::new();
        for key in self.insertion_order() {
            reversed.adopt_node(self, key);
        }
        for (key, node) in self.entries() {
            for (next, &weight) in node.successors() {
                reversed.link(next, key, weight);
            }
        }
        reversed
    }

    /// Sub-graph of every vertex and edge reachable from `start`
    pub fn reach_dag_by_key(&self, start: &VertexKey) -> Dag<V> {
        let mut reached = Dag::new();
        let Some(root) = self.node(start) else {
            return reached;
        };

        let mut expanded: HashSet<VertexKey> = HashSet::from([start.clone()]);
        let mut stack = vec![(start.clone(), root.successors().iter())];

        while let Some((key, successors)) = stack.last_mut() {
            match successors.next() {
                Some((next, &weight)) => {
                    reached.adopt_edge(self, key, next, weight);
                    if expanded.insert(next.clone()) {
                        if let Some(node) = self.node(next) {
                            stack.push((next.clone(), node.successors().iter()));
                        }
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }

        debug!(
            start = %start,
            vertices = reached.len(),
            edges = reached.edge_count(),
            "built reachable sub-graph"
        );
        reached
    }

    /// Sub-graph of every vertex and edge lying on a path from `start` to `end`
    ///
    /// Empty when `start == end` or either vertex is unknown.
    pub fn close_dag_by_key(&self, start: &VertexKey, end: &VertexKey) -> Dag<V> {
        let mut closure = Dag::new();
        if start == end || !self.contains_key(end) {
            return closure;
        }
        let Some(root) = self.node(start) else {
            return closure;
        };

        // Whether a fully explored vertex lies on a path to `end`
        let mut on_path: HashMap<VertexKey, bool> = HashMap::new();
        let mut stack = vec![ClosureFrame::new(start.clone(), root)];

        while let Some(frame) = stack.last_mut() {
            match frame.successors.next() {
                Some((next, &weight)) => {
                    if next == end || on_path.get(next) == Some(&true) {
                        closure.adopt_edge(self, &frame.key, next, weight);
                        frame.on_path = true;
                    } else if !on_path.contains_key(next) {
                        if let Some(node) = self.node(next) {
                            frame.pending = Some((next, weight));
                            stack.push(ClosureFrame::new(next.clone(), node));
                        }
                    }
                }
                None => {
                    let Some(done) = stack.pop() else {
                        break;
                    };
                    if let Some(parent) = stack.last_mut() {
                        if let Some((next, weight)) = parent.pending.take() {
                            if done.on_path {
                                closure.adopt_edge(self, &parent.key, next, weight);
                                parent.on_path = true;
                            }
                        }
                    }
                    on_path.insert(done.key, done.on_path);
                }
            }
        }

        debug!(
            start = %start,
            end = %end,
            vertices = closure.len(),
            edges = closure.edge_count(),
            "built transitive closure"
        );
        closure
    }

    /// Transitive reduction of [`close_dag_by_key`](Self::close_dag_by_key)
    ///
    /// Walks backward from `end`. Each incoming edge is removed and stays
    /// removed only if its target is still reachable from its source.
    pub fn reduce_dag_by_key(&self, start: &VertexKey, end: &VertexKey) -> Dag<V> {
        let mut reduced = self.close_dag_by_key(start, end);
        if reduced.is_empty() {
            return reduced;
        }

        let mut visited: HashSet<VertexKey> = HashSet::new();
        let mut stack = vec![end.clone()];

        while let Some(target) = stack.pop() {
            if !visited.insert(target.clone()) {
                continue;
            }

            let incoming: Vec<(VertexKey, i64)> = reduced
                .node(&target)
                .map(|node| {
                    node.predecessors()
                        .iter()
                        .map(|(key, &weight)| (key.clone(), weight))
                        .collect()
                })
                .unwrap_or_default();

            for (source, weight) in incoming {
                reduced.unlink(&source, &target);
                if reduced.is_reachable_by_key(&source, &target) {
                    trace!(start = %source, end = %target, "dropped redundant edge");
                } else {
                    reduced.link(&source, &target, weight);
                }
                stack.push(source);
            }
        }

        debug!(
            start = %start,
            end = %end,
            edges = reduced.edge_count(),
            "built transitive reduction"
        );
        reduced
    }
}

impl<V: Vertex> Dag<V> {
    /// Sub-graph of every vertex and edge reachable from `start`
    ///
    /// Weights are preserved. Unknown vertices yield an empty graph.
    pub fn reach_dag(&self, start: &V) -> Dag<V> {
        self.reach_dag_by_key(&start.key())
    }

    /// Transitive closure restricted to the paths from `start` to `end`
    pub fn close_dag(&self, start: &V, end: &V) -> Dag<V> {
        self.close_dag_by_key(&start.key(), &end.key())
    }

    /// Transitive reduction of the paths from `start` to `end`
    pub fn reduce_dag(&self, start: &V, end: &V) -> Dag<V> {
        self.reduce_dag_by_key(&start.key(), &end.key())
    }
}
