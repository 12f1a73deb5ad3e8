//! Error types for graph operations
//!
//! Every failure here is an invariant violation reported synchronously to the
//! caller. Queries never produce these; they return empty results instead.

use super::VertexKey;
use thiserror::Error;

/// Result type for graph operations
pub type DagResult<T> = Result<T, DagError>;

/// Which side of an edge a vertex was supplied for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// The tail of the edge (`start`)
    Start,
    /// The head of the edge (`end`)
    End,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "starting"),
            Endpoint::End => write!(f, "ending"),
        }
    }
}

/// Errors that can occur during graph mutation and import
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum DagError {
    /// An edge endpoint has an empty identifier
    #[error("invalid {role} vertex: {key:?} has an empty id")]
    InvalidVertex {
        /// Which endpoint was rejected
        role: Endpoint,
        /// The offending composite key
        key: VertexKey,
    },

    /// Both endpoints resolve to the same composite key
    #[error("starting vertex is ending vertex: {key}")]
    SelfLoop {
        /// The key used for both endpoints
        key: VertexKey,
    },

    /// The mutation would close a cycle
    #[error("cycle detected: {path}")]
    CycleDetected {
        /// Human-readable description of the offending edge or node
        path: String,
    },

    /// A snapshot could not be turned back into a graph
    #[error("import failed: {0}")]
    Import(#[from] ImportError),
}

/// Reasons a [`Snapshot`](super::Snapshot) is rejected on import
#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum ImportError {
    /// Two records declare the same composite key
    #[error("duplicate vertex: {key}")]
    DuplicateVertex {
        /// The key declared twice
        key: VertexKey,
    },

    /// An edge references a key missing from the vertex list
    #[error("edge {start} -> {end} references undeclared vertex {missing}")]
    UnknownVertex {
        /// Source of the edge
        start: VertexKey,
        /// Target of the edge
        end: VertexKey,
        /// Whichever endpoint was not declared
        missing: VertexKey,
    },

    /// A record's id/category disagree with the identity of its value
    #[error("vertex record {declared} does not match its value {actual}")]
    IdentityMismatch {
        /// Key built from the record fields
        declared: VertexKey,
        /// Key reported by the value itself
        actual: VertexKey,
    },

    /// A record has an empty id
    #[error("vertex record in category {category:?} has an empty id")]
    EmptyId {
        /// Category of the record
        category: String,
    },

    /// An edge failed the same checks `add_edge` applies
    #[error("edge {start} -> {end} rejected: {reason}")]
    RejectedEdge {
        /// Source of the edge
        start: VertexKey,
        /// Target of the edge
        end: VertexKey,
        /// Rendered cause (self-loop or cycle)
        reason: String,
    },
}

impl DagError {
    /// Creates an invalid vertex error
    pub fn invalid_vertex(role: Endpoint, key: VertexKey) -> Self {
        Self::InvalidVertex { role, key }
    }

    /// Creates a self-loop error
    pub fn self_loop(key: VertexKey) -> Self {
        Self::SelfLoop { key }
    }

    /// Creates a cycle detected error with the given path
    pub fn cycle(path: impl Into<String>) -> Self {
        Self::CycleDetected { path: path.into() }
    }

    /// Returns true if this error reports a cycle
    pub fn is_cycle(&self) -> bool {
        matches!(self, Self::CycleDetected { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DagError::self_loop(VertexKey::new("task", "a"));
        assert_eq!(err.to_string(), "starting vertex is ending vertex: task:a");

        let err = DagError::cycle("b -> a");
        assert!(err.is_cycle());
        assert_eq!(err.to_string(), "cycle detected: b -> a");

        let err = DagError::invalid_vertex(Endpoint::End, VertexKey::new("task", ""));
        assert!(err.to_string().starts_with("invalid ending vertex"));
    }

    #[test]
    fn test_import_error_converts() {
        let err: DagError = ImportError::DuplicateVertex {
            key: VertexKey::new("", "a"),
        }
        .into();
        assert!(matches!(err, DagError::Import(ImportError::DuplicateVertex { .. })));
        assert_eq!(err.to_string(), "import failed: duplicate vertex: :a");
    }
}
