//! Shared fixtures for unit tests

use super::{Dag, Vertex};

/// Minimal vertex: an id in the default category plus an opaque payload
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Letter {
    id: String,
    pub(crate) payload: u32,
}

impl Letter {
    pub(crate) fn with_payload(id: &str, payload: u32) -> Self {
        Self {
            id: id.to_string(),
            payload,
        }
    }
}

impl Vertex for Letter {
    fn id(&self) -> &str {
        &self.id
    }
}

pub(crate) fn v(id: &str) -> Letter {
    Letter::with_payload(id, 0)
}

/// Builds a graph from `(start, end, weight)` triples, panicking on rejection
pub(crate) fn build(edges: &[(&str, &str, i64)]) -> Dag<Letter> {
    let mut dag = Dag::new();
    for &(start, end, weight) in edges {
        dag.add_edge(v(start), v(end), weight).unwrap();
    }
    dag
}

/// Ids of a vertex sequence, for compact assertions
pub(crate) fn ids<'a>(vertices: impl IntoIterator<Item = &'a Letter>) -> Vec<&'a str> {
    vertices.into_iter().map(|l| l.id.as_str()).collect()
}

/// The ten-edge graph used throughout the derived-graph tests
pub(crate) fn sample(weight: i64) -> Dag<Letter> {
    build(&[
        ("a", "b", weight),
        ("a", "c", weight),
        ("a", "d", weight),
        ("a", "e", weight),
        ("b", "d", weight),
        ("c", "d", weight),
        ("c", "e", weight),
        ("d", "e", weight),
        ("x", "b", weight),
        ("d", "y", weight),
    ])
}
