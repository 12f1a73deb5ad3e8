//! Vertex identity
//!
//! A vertex is any caller value that can name itself: an `id` unique within a
//! `category`. The pair forms the [`VertexKey`] used to address nodes inside a
//! graph, so two values with the same key are the same graph entity no matter
//! what else they carry.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// The identity contract a value must satisfy to live in a [`Dag`](super::Dag)
///
/// Both strings must stay stable for as long as the value is in a graph.
///
/// # Examples
///
/// ```
/// use dagweave::{Vertex, VertexKey};
///
/// struct Task {
///     name: String,
/// }
///
/// impl Vertex for Task {
///     fn id(&self) -> &str {
///         &self.name
///     }
///
///     fn category(&self) -> &str {
///         "task"
///     }
/// }
///
/// let task = Task { name: "compile".into() };
/// assert_eq!(task.key(), VertexKey::new("task", "compile"));
/// ```
pub trait Vertex {
    /// Identifier, non-empty and unique within the category
    fn id(&self) -> &str;

    /// Namespace the id lives in
    ///
    /// The empty category is reserved to mean "all categories" in lookups.
    fn category(&self) -> &str {
        ""
    }

    /// Composite key addressing this vertex inside a graph
    fn key(&self) -> VertexKey {
        VertexKey::new(self.category(), self.id())
    }
}

impl Vertex for String {
    fn id(&self) -> &str {
        self
    }
}

impl Vertex for VertexKey {
    fn id(&self) -> &str {
        &self.id
    }

    fn category(&self) -> &str {
        &self.category
    }

    fn key(&self) -> VertexKey {
        self.clone()
    }
}

/// Composite `(category, id)` key of a vertex
///
/// Keys order by category first, then id. That order drives every
/// deterministic walk in the crate.
///
/// The textual form is `category:id`. Backslashes and colons inside the
/// category are escaped with a backslash; the id is written verbatim, so the
/// first unescaped colon always separates the two halves.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexKey {
    category: String,
    id: String,
}

impl VertexKey {
    /// Creates a key from its two halves
    pub fn new(category: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            id: id.into(),
        }
    }

    /// Returns the category half
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Returns the id half
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns true when the category matches, treating `""` as a wildcard
    pub fn in_category(&self, category: &str) -> bool {
        category.is_empty() || self.category == category
    }
}

impl fmt::Display for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.category.chars() {
            if c == '\\' || c == ':' {
                write!(f, "\\")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, ":{}", self.id)
    }
}

impl fmt::Debug for VertexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VertexKey({})", self)
    }
}

/// Error returned when a string is not a valid key form
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed vertex key {input:?}: {reason}")]
pub struct ParseKeyError {
    input: String,
    reason: &'static str,
}

impl FromStr for VertexKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ParseKeyError {
            input: s.to_string(),
            reason,
        };

        let mut category = String::new();
        let mut chars = s.char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, escaped)) => category.push(escaped),
                    None => return Err(fail("dangling escape")),
                },
                ':' => return Ok(Self::new(category, &s[i + 1..])),
                _ => category.push(c),
            }
        }

        Err(fail("missing ':' separator"))
    }
}

impl Serialize for VertexKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VertexKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
