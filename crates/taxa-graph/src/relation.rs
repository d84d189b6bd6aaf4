//! Relation types for the taxon graph.
//!
//! Relations are directed, labeled edges between two descriptors. They
//! refer to nodes by descriptor rather than by position, so a relation may
//! point at a node that lives in another source graph until a merge brings
//! both together.

use serde::{Deserialize, Serialize};

/// The label of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationLabel {
    /// Child points at its parent.
    Broader,

    /// Parent points at its child. Always the mirror of a `Broader` edge.
    Narrower,

    /// Alternate name for the same taxon. Stored one direction per call.
    Related,
}

impl RelationLabel {
    /// SKOS predicate used when exporting.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Broader => "skos:broader",
            Self::Narrower => "skos:narrower",
            Self::Related => "skos:related",
        }
    }

    /// Whether the label encodes parent/child hierarchy.
    pub fn is_hierarchy(&self) -> bool {
        matches!(self, Self::Broader | Self::Narrower)
    }
}

impl std::fmt::Display for RelationLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed edge from `start` to `end`.
///
/// In hierarchy terms `start` is the child side of a broader edge; an arrow
/// would be drawn from start to end.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub start: String,
    pub label: RelationLabel,
    pub end: String,
}

impl Relation {
    /// Creates a new relation.
    pub fn new(start: impl Into<String>, label: RelationLabel, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            label,
            end: end.into(),
        }
    }

    /// The same edge walked backwards.
    pub fn reversed(&self) -> Self {
        Self {
            start: self.end.clone(),
            label: self.label,
            end: self.start.clone(),
        }
    }

    /// The endpoint opposite `descriptor`.
    ///
    /// Returns both endpoints for a self-loop, nothing when `descriptor`
    /// is not on the edge.
    pub fn other_endpoints<'a>(&'a self, descriptor: &str) -> impl Iterator<Item = &'a str> {
        let forward = (self.start == descriptor).then_some(self.end.as_str());
        let backward = (self.end == descriptor).then_some(self.start.as_str());
        forward.into_iter().chain(backward)
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -[{}]-> {}", self.start, self.label, self.end)
    }
}
