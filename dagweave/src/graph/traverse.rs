//! Traversal and path queries
//!
//! All walks are depth-first with successors taken in ascending key order, so
//! results are fully deterministic. Explicit stacks replace recursion.

use super::dag::{Dag, Node};
use super::vertex::{Vertex, VertexKey};
use std::collections::HashSet;

/// What a path is measured by when picking the shortest or longest one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMetric {
    /// Number of edges
    #[default]
    Hops,
    /// Sum of edge weights
    Weight,
}

impl PathMetric {
    fn measure<V>(self, path: &Path<'_, V>) -> i64 {
        match self {
            PathMetric::Hops => path.hops() as i64,
            PathMetric::Weight => path.weight(),
        }
    }
}

/// A directed path, endpoints included
#[derive(Debug)]
pub struct Path<'g, V> {
    weight: i64,
    vertices: Vec<&'g V>,
}

impl<V> Clone for Path<'_, V> {
    fn clone(&self) -> Self {
        Self {
            weight: self.weight,
            vertices: self.vertices.clone(),
        }
    }
}

impl<'g, V> Path<'g, V> {
    /// Sum of the edge weights along the path
    pub fn weight(&self) -> i64 {
        self.weight
    }

    /// Number of edges along the path
    pub fn hops(&self) -> usize {
        self.vertices.len().saturating_sub(1)
    }

    /// Vertices from start to end
    pub fn vertices(&self) -> &[&'g V] {
        &self.vertices
    }

    /// Consumes the path, returning its vertices
    pub fn into_vertices(self) -> Vec<&'g V> {
        self.vertices
    }
}

/// A partial path waiting on the stack
struct Trail<'g, V> {
    node: &'g Node<V>,
    reaches_end: bool,
    weight: i64,
    vertices: Vec<&'g V>,
}

impl<V> Dag<V> {
    /// Depth-first pre-order fold from `start`
    ///
    /// `combine(vertex, incoming_weight, acc)` runs at every visit and returns
    /// the accumulator handed (as a fresh clone) to each successor. The root is
    /// visited with weight `0`. Each vertex without successors contributes its
    /// accumulator to the result, so there is one entry per path from `start`
    /// to a sink, in visitation order.
    ///
    /// A vertex reachable along several paths is visited once per path.
    pub fn iterate_by_key<A, F>(&self, start: &VertexKey, init: A, mut combine: F) -> Vec<A>
    where
        A: Clone,
        F: FnMut(&V, i64, A) -> A,
    {
        let mut leaves = Vec::new();
        let Some(root) = self.node(start) else {
            return leaves;
        };

        let mut stack: Vec<(&Node<V>, i64, A)> = vec![(root, 0, init)];
        while let Some((node, weight, acc)) = stack.pop() {
            let acc = combine(node.vertex(), weight, acc);
            if node.successors().is_empty() {
                leaves.push(acc);
                continue;
            }
            // Pushed in reverse so the smallest key is visited first
            for (next, &next_weight) in node.successors().iter().rev() {
                if let Some(child) = self.node(next) {
                    stack.push((child, next_weight, acc.clone()));
                }
            }
        }
        leaves
    }

    /// Every directed path from `start` to `end`
    ///
    /// Paths come out in depth-first order over ascending successor keys.
    /// Empty when `start == end`, either vertex is unknown, or `end` cannot
    /// be reached.
    pub fn all_paths_by_key(&self, start: &VertexKey, end: &VertexKey) -> Vec<Path<'_, V>> {
        let mut paths = Vec::new();
        if start == end || !self.contains_key(end) {
            return paths;
        }
        let Some(root) = self.node(start) else {
            return paths;
        };

        // Only vertices that can still reach `end` are worth expanding
        let ancestors = self.ancestors(end);
        if !ancestors.contains(start) {
            return paths;
        }

        let mut stack = vec![Trail {
            node: root,
            reaches_end: false,
            weight: 0,
            vertices: vec![root.vertex()],
        }];
        while let Some(trail) = stack.pop() {
            if trail.reaches_end {
                paths.push(Path {
                    weight: trail.weight,
                    vertices: trail.vertices,
                });
                continue;
            }
            for (next, &weight) in trail.node.successors().iter().rev() {
                let reaches_end = next == end;
                if !reaches_end && !ancestors.contains(next) {
                    continue;
                }
                if let Some(child) = self.node(next) {
                    let mut vertices = trail.vertices.clone();
                    vertices.push(child.vertex());
                    stack.push(Trail {
                        node: child,
                        reaches_end,
                        weight: trail.weight.saturating_add(weight),
                        vertices,
                    });
                }
            }
        }
        paths
    }

    /// Keys of every vertex from which `key` is reachable
    fn ancestors(&self, key: &VertexKey) -> HashSet<&VertexKey> {
        let mut seen = HashSet::new();
        let Some(node) = self.node(key) else {
            return seen;
        };
        let mut stack: Vec<&VertexKey> = node.predecessors().keys().collect();
        while let Some(next) = stack.pop() {
            if seen.insert(next) {
                if let Some(node) = self.node(next) {
                    stack.extend(node.predecessors().keys());
                }
            }
        }
        seen
    }

    /// Path from `start` to `end` minimizing `metric`
    ///
    /// Ties go to the first path in enumeration order. Empty if no path exists.
    pub fn shortest_by_key(&self, start: &VertexKey, end: &VertexKey, metric: PathMetric) -> Vec<&V> {
        select(self.all_paths_by_key(start, end), metric, |candidate, best| {
            candidate < best
        })
    }

    /// Path from `start` to `end` maximizing `metric`
    ///
    /// Ties go to the first path in enumeration order. Empty if no path exists.
    pub fn longest_by_key(&self, start: &VertexKey, end: &VertexKey, metric: PathMetric) -> Vec<&V> {
        select(self.all_paths_by_key(start, end), metric, |candidate, best| {
            candidate > best
        })
    }
}

/// Keeps the first path that no later path strictly beats
fn select<'g, V>(
    paths: Vec<Path<'g, V>>,
    metric: PathMetric,
    beats: fn(i64, i64) -> bool,
) -> Vec<&'g V> {
    let mut best: Option<(i64, Path<'g, V>)> = None;
    for path in paths {
        let score = metric.measure(&path);
        let replace = best
            .as_ref()
            .map_or(true, |(best_score, _)| beats(score, *best_score));
        if replace {
            best = Some((score, path));
        }
    }
    best.map(|(_, path)| path.into_vertices()).unwrap_or_default()
}

impl<V: Vertex> Dag<V> {
    /// Depth-first pre-order fold from `start`; see [`iterate_by_key`](Self::iterate_by_key)
    pub fn iterate<A, F>(&self, start: &V, init: A, combine: F) -> Vec<A>
    where
        A: Clone,
        F: FnMut(&V, i64, A) -> A,
    {
        self.iterate_by_key(&start.key(), init, combine)
    }

    /// Every directed path from `start` to `end`
    pub fn all_paths(&self, start: &V, end: &V) -> Vec<Path<'_, V>> {
        self.all_paths_by_key(&start.key(), &end.key())
    }

    /// Path from `start` to `end` minimizing `metric`
    pub fn shortest(&self, start: &V, end: &V, metric: PathMetric) -> Vec<&V> {
        self.shortest_by_key(&start.key(), &end.key(), metric)
    }

    /// Path from `start` to `end` maximizing `metric`
    pub fn longest(&self, start: &V, end: &V, metric: PathMetric) -> Vec<&V> {
        self.longest_by_key(&start.key(), &end.key(), metric)
    }
}
