//! Taxon nodes.
//!
//! A node is a descriptor plus an ordered, append-only list of attributes.
//! Schema keys are unique within one node: adding a second attribute under
//! an existing key is refused instead of overwriting.

use crate::attribute::{
    Attribute, SCHEMA_HISTORY_NOTE, SCHEMA_IN_SCHEME, SCHEMA_PREF_LABEL, SCHEMA_TAXON_STATUS,
};
use crate::scheme::ConceptScheme;
use serde::{Deserialize, Serialize};

/// A named vertex of the taxonomic graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Identity of the node within its graph.
    pub descriptor: String,

    attributes: Vec<Attribute>,
}

impl Node {
    /// Creates a node carrying its preferred label, the caller's attributes
    /// and finally its concept scheme.
    ///
    /// Extra attributes that collide with an earlier key are dropped.
    pub fn new(
        descriptor: impl Into<String>,
        pref_label: impl Into<String>,
        scheme: ConceptScheme,
        extra: impl IntoIterator<Item = Attribute>,
    ) -> Self {
        let mut node = Self {
            descriptor: descriptor.into(),
            attributes: Vec::new(),
        };
        node.add_attribute(SCHEMA_PREF_LABEL, pref_label);
        for attribute in extra {
            node.push(attribute);
        }
        node.add_attribute(SCHEMA_IN_SCHEME, scheme.as_str());
        node
    }

    /// Adds an attribute unless the schema key is already present.
    ///
    /// Returns `false` (and leaves the node untouched) on a duplicate key.
    pub fn add_attribute(&mut self, schema: impl Into<String>, literal: impl Into<String>) -> bool {
        self.push(Attribute::new(schema, literal))
    }

    /// Same as [`Node::add_attribute`] for an already built attribute.
    pub fn push(&mut self, attribute: Attribute) -> bool {
        if self.attribute(&attribute.schema).is_some() {
            return false;
        }
        self.attributes.push(attribute);
        true
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up the attribute stored under `schema`.
    pub fn attribute(&self, schema: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.schema == schema)
    }

    /// Literal stored under `schema`, if any.
    pub fn literal(&self, schema: &str) -> Option<&str> {
        self.attribute(schema).map(|a| a.literal.as_str())
    }

    /// The preferred label, or an empty string for a node without one.
    pub fn pref_label(&self) -> &str {
        self.literal(SCHEMA_PREF_LABEL).unwrap_or_default()
    }

    /// The node's rank, when its `skos:inScheme` literal is a known scheme.
    pub fn concept_scheme(&self) -> Option<ConceptScheme> {
        self.literal(SCHEMA_IN_SCHEME)
            .and_then(ConceptScheme::from_rank)
    }

    /// Taxonomic status literal (`accepted`, `synonym`, ...), if one was
    /// recorded. Only the first status attribute is kept, so this is it.
    pub fn taxon_status(&self) -> Option<&str> {
        self.literal(SCHEMA_TAXON_STATUS)
    }

    /// Source dataset the node was imported from (set by merging).
    pub fn provenance(&self) -> Option<&str> {
        self.literal(SCHEMA_HISTORY_NOTE)
    }
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Descriptor: {}", self.descriptor)?;
        for attribute in &self.attributes {
            writeln!(f, "-> {}", attribute)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribute::SCHEMA_AUTHOR;

    #[test]
    fn test_new_node_has_label_and_scheme() {
        let node = Node::new("s1", "Rosa canina", ConceptScheme::Species, []);

        assert_eq!(node.pref_label(), "Rosa canina");
        assert_eq!(node.concept_scheme(), Some(ConceptScheme::Species));
        assert_eq!(node.attributes().len(), 2);
        assert_eq!(node.attributes()[0].schema, SCHEMA_PREF_LABEL);
        assert_eq!(node.attributes()[1].schema, SCHEMA_IN_SCHEME);
    }

    #[test]
    fn test_duplicate_schema_is_rejected() {
        let mut node = Node::new("g1", "Rosa", ConceptScheme::Genus, []);

        assert!(node.add_attribute(SCHEMA_AUTHOR, "L."));
        assert!(!node.add_attribute(SCHEMA_AUTHOR, "Mill."));
        assert!(!node.add_attribute(SCHEMA_PREF_LABEL, "Other"));

        assert_eq!(node.literal(SCHEMA_AUTHOR), Some("L."));
        assert_eq!(node.pref_label(), "Rosa");
        assert_eq!(node.attributes().len(), 3);
    }

    #[test]
    fn test_extra_attributes_keep_order_and_uniqueness() {
        let node = Node::new(
            "f1",
            "Rosaceae",
            ConceptScheme::Family,
            vec![
                Attribute::status("accepted"),
                Attribute::author("Juss."),
                Attribute::status("synonym"),
            ],
        );

        let schemas: Vec<_> = node.attributes().iter().map(|a| a.schema.as_str()).collect();
        assert_eq!(
            schemas,
            vec![SCHEMA_PREF_LABEL, SCHEMA_TAXON_STATUS, SCHEMA_AUTHOR, SCHEMA_IN_SCHEME]
        );
        assert_eq!(node.taxon_status(), Some("accepted"));
        assert_eq!(node.provenance(), None);
    }

    #[test]
    fn test_taxon_status_absent_without_attribute() {
        let node = Node::new("g1", "Rosa", ConceptScheme::Genus, vec![Attribute::author("L.")]);
        assert_eq!(node.taxon_status(), None);
        assert_eq!(node.concept_scheme(), Some(ConceptScheme::Genus));
    }
}
