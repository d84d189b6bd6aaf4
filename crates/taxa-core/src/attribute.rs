//! Attribute vocabulary.
//!
//! Attributes are the literal facts hanging off a node. The schema keys
//! follow SKOS naming so the export can emit them verbatim.

use serde::{Deserialize, Serialize};

/// Preferred (display) label of a taxon.
pub const SCHEMA_PREF_LABEL: &str = "skos:prefLabel";

/// Concept scheme, i.e. the taxonomic rank.
pub const SCHEMA_IN_SCHEME: &str = "skos:inScheme";

/// Taxonomic status as reported by the source (accepted, synonym, ...).
pub const SCHEMA_TAXON_STATUS: &str = "skos:definition";

/// Provenance: which source dataset the node came from.
pub const SCHEMA_HISTORY_NOTE: &str = "skos:historyNote";

/// Scientific name authorship.
pub const SCHEMA_AUTHOR: &str = "skos:scopeNote";

/// A typed key/value fact attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Attribute {
    /// Namespaced key, e.g. `skos:prefLabel`.
    pub schema: String,
    /// The literal value.
    pub literal: String,
}

impl Attribute {
    /// Creates a new attribute.
    pub fn new(schema: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            literal: literal.into(),
        }
    }

    /// Taxonomic status attribute.
    pub fn status(literal: impl Into<String>) -> Self {
        Self::new(SCHEMA_TAXON_STATUS, literal)
    }

    /// Authorship attribute.
    pub fn author(literal: impl Into<String>) -> Self {
        Self::new(SCHEMA_AUTHOR, literal)
    }

    /// Provenance attribute.
    pub fn history_note(literal: impl Into<String>) -> Self {
        Self::new(SCHEMA_HISTORY_NOTE, literal)
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}", self.schema, self.literal)
    }
}
