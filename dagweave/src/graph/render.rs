//! Inspection helpers: structural summary and Graphviz output

use super::dag::Dag;
use super::vertex::VertexKey;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary information about a graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagSummary {
    pub vertex_count: usize,
    pub edge_count: usize,
    /// Keys of vertices without predecessors
    pub starting: Vec<VertexKey>,
    /// Keys of vertices with predecessors but no successors
    pub ending: Vec<VertexKey>,
    /// Longest path, counted in edges
    pub max_depth: usize,
}

/// How vertices are labelled in DOT output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DotLabel {
    /// Only the vertex id
    Id,
    /// The full `category:id` key
    #[default]
    Key,
}

/// Options for [`Dag::to_dot`]
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Print edge weights as edge labels
    pub edge_weights: bool,
    /// Vertex label style
    pub label: DotLabel,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            edge_weights: true,
            label: DotLabel::Key,
        }
    }
}

impl<V> Dag<V> {
    /// Returns a summary of the graph structure
    pub fn summary(&self) -> DagSummary {
        let starting = self
            .entries()
            .filter(|(_, node)| node.in_degree() == 0)
            .map(|(key, _)| key.clone())
            .collect();
        let ending = self
            .entries()
            .filter(|(_, node)| node.out_degree() == 0 && node.in_degree() > 0)
            .map(|(key, _)| key.clone())
            .collect();

        DagSummary {
            vertex_count: self.len(),
            edge_count: self.edge_count(),
            starting,
            ending,
            max_depth: self.max_depth(),
        }
    }

    /// Longest path in edges, by relaxation over a topological order
    fn max_depth(&self) -> usize {
        let mut depths: HashMap<&VertexKey, usize> = HashMap::new();
        let mut deepest = 0;

        for key in self.topological_keys() {
            let depth = depths.get(key).copied().unwrap_or(0);
            deepest = deepest.max(depth);
            if let Some(node) = self.node(key) {
                for next in node.successors().keys() {
                    let entry = depths.entry(next).or_insert(0);
                    *entry = (*entry).max(depth + 1);
                }
            }
        }

        deepest
    }

    /// Generates a DOT representation of the graph for Graphviz
    ///
    /// Render with `dot -Tpng graph.dot -o graph.png`.
    pub fn to_dot(&self, config: &DotConfig) -> String {
        let mut graph = DiGraph::<String, i64>::new();
        let mut indices: HashMap<&VertexKey, NodeIndex> = HashMap::new();

        for (key, _) in self.entries() {
            let label = match config.label {
                DotLabel::Id => key.id().to_string(),
                DotLabel::Key => key.to_string(),
            };
            indices.insert(key, graph.add_node(label));
        }

        for (key, node) in self.entries() {
            for (next, &weight) in node.successors() {
                if let (Some(&from), Some(&to)) = (indices.get(key), indices.get(next)) {
                    graph.add_edge(from, to, weight);
                }
            }
        }

        if config.edge_weights {
            format!("{}", Dot::new(&graph))
        } else {
            format!("{}", Dot::with_config(&graph, &[Config::EdgeNoLabel]))
        }
    }
}
