//! Core graph data structure.
//!
//! `TaxonGraph` owns the node sequence and the relation sequence. Nodes are
//! appended through rank-specific factories and never reordered or removed.
//! Hierarchy edges are only ever created in mirrored broader/narrower pairs.

use crate::relation::{Relation, RelationLabel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use taxa_core::{Attribute, ConceptScheme, Node, SCHEMA_HISTORY_NOTE};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Descriptor already present in graph: {0}")]
    DuplicateDescriptor(String),
}

/// The taxonomic knowledge graph.
///
/// Descriptors are meant to be unique but merged graphs may legitimately
/// carry collisions, so every lookup hands back a collection.
/// [`TaxonGraph::duplicate_descriptors`] reports the collisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "GraphSnapshot")]
pub struct TaxonGraph {
    name: String,

    nodes: Vec<Node>,

    relations: Vec<Relation>,

    /// Maps descriptors to positions in `nodes`. Never serialized; rebuilt
    /// from `nodes` on load.
    #[serde(skip)]
    descriptor_index: HashMap<String, Vec<usize>>,
}

/// Serialized shape of a [`TaxonGraph`].
#[derive(Deserialize)]
struct GraphSnapshot {
    name: String,
    nodes: Vec<Node>,
    relations: Vec<Relation>,
}

impl From<GraphSnapshot> for TaxonGraph {
    fn from(snapshot: GraphSnapshot) -> Self {
        let mut graph = TaxonGraph::new(snapshot.name);
        graph.relations = snapshot.relations;
        for node in snapshot.nodes {
            graph.push_node(node);
        }
        graph
    }
}

impl TaxonGraph {
    /// Creates a new empty graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appends a node of the given rank and returns it.
    pub fn add_node(
        &mut self,
        scheme: ConceptScheme,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.push_node(Node::new(descriptor, label, scheme, attributes))
    }

    /// Like [`TaxonGraph::add_node`] but refuses a descriptor that is
    /// already taken.
    pub fn try_add_node(
        &mut self,
        scheme: ConceptScheme,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> Result<&Node, GraphError> {
        if self.descriptor_index.contains_key(descriptor) {
            return Err(GraphError::DuplicateDescriptor(descriptor.to_string()));
        }
        Ok(self.add_node(scheme, descriptor, label, attributes))
    }

    pub fn add_kingdom_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::Kingdom, descriptor, label, attributes)
    }

    pub fn add_family_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::Family, descriptor, label, attributes)
    }

    pub fn add_sub_family_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::SubFamily, descriptor, label, attributes)
    }

    pub fn add_genus_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::Genus, descriptor, label, attributes)
    }

    pub fn add_sub_genus_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::SubGenus, descriptor, label, attributes)
    }

    pub fn add_species_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::Species, descriptor, label, attributes)
    }

    pub fn add_sub_species_node(
        &mut self,
        descriptor: &str,
        label: &str,
        attributes: impl IntoIterator<Item = Attribute>,
    ) -> &Node {
        self.add_node(ConceptScheme::SubSpecies, descriptor, label, attributes)
    }

    /// Appends an already built node.
    pub(crate) fn push_node(&mut self, node: Node) -> &Node {
        let position = self.nodes.len();
        let slots = self
            .descriptor_index
            .entry(node.descriptor.clone())
            .or_default();
        if !slots.is_empty() {
            debug!(descriptor = %node.descriptor, "duplicate descriptor appended");
        }
        slots.push(position);
        self.nodes.push(node);
        &self.nodes[position]
    }

    pub(crate) fn push_relation(&mut self, relation: Relation) -> &Relation {
        self.relations.push(relation);
        let last = self.relations.len() - 1;
        &self.relations[last]
    }

    /// Adds a single directed synonym edge `start -> end`. No mirror.
    pub fn add_synonym_relation(&mut self, start: &str, end: &str) -> &Relation {
        self.push_relation(Relation::new(start, RelationLabel::Related, end))
    }

    /// Links `child` under `parent` with the mirrored pair
    /// `(child, broader, parent)` and `(parent, narrower, child)`.
    pub fn link_child(&mut self, child: &str, parent: &str) {
        self.push_relation(Relation::new(child, RelationLabel::Broader, parent));
        self.push_relation(Relation::new(parent, RelationLabel::Narrower, child));
    }

    pub fn add_family_to_kingdom(&mut self, family: &str, kingdom: &str) {
        self.link_child(family, kingdom);
    }

    pub fn add_sub_family_to_family(&mut self, sub_family: &str, family: &str) {
        self.link_child(sub_family, family);
    }

    pub fn add_genus_to_family(&mut self, genus: &str, family: &str) {
        self.link_child(genus, family);
    }

    pub fn add_genus_to_sub_family(&mut self, genus: &str, sub_family: &str) {
        self.link_child(genus, sub_family);
    }

    pub fn add_sub_genus_to_genus(&mut self, sub_genus: &str, genus: &str) {
        self.link_child(sub_genus, genus);
    }

    pub fn add_species_to_genus(&mut self, species: &str, genus: &str) {
        self.link_child(species, genus);
    }

    pub fn add_species_to_sub_genus(&mut self, species: &str, sub_genus: &str) {
        self.link_child(species, sub_genus);
    }

    pub fn add_sub_species_to_species(&mut self, sub_species: &str, species: &str) {
        self.link_child(sub_species, species);
    }

    /// Moves `child` from `old_parent` to `new_parent`.
    ///
    /// Every edge `child -> old_parent` is redirected to `new_parent`, and
    /// every mirrored `old_parent -narrower-> child` edge now starts at
    /// `new_parent`, so the hierarchy stays symmetric. Returns the number of
    /// rewritten relations.
    pub fn change_parent(&mut self, old_parent: &str, child: &str, new_parent: &str) -> usize {
        let mut rewritten = 0;
        for relation in &mut self.relations {
            if relation.start == child && relation.end == old_parent {
                relation.end = new_parent.to_string();
                rewritten += 1;
            } else if relation.label == RelationLabel::Narrower
                && relation.start == old_parent
                && relation.end == child
            {
                relation.start = new_parent.to_string();
                rewritten += 1;
            }
        }
        rewritten
    }

    /// True when a broader edge `child -> parent` exists.
    pub fn is_parent_of(&self, child: &str, parent: &str) -> bool {
        self.relations.iter().any(|r| {
            r.label == RelationLabel::Broader && r.start == child && r.end == parent
        })
    }

    /// Adds `attribute` to every node with this descriptor.
    ///
    /// Returns `true` if at least one node accepted it.
    pub fn add_attribute(&mut self, descriptor: &str, attribute: Attribute) -> bool {
        let Some(slots) = self.descriptor_index.get(descriptor) else {
            return false;
        };
        let mut accepted = false;
        for &slot in slots {
            if let Some(node) = self.nodes.get_mut(slot) {
                accepted |= node.push(attribute.clone());
            }
        }
        accepted
    }

    /// All nodes carrying this descriptor, in insertion order.
    pub fn nodes_by_descriptor(&self, descriptor: &str) -> Vec<&Node> {
        self.descriptor_index
            .get(descriptor)
            .map(|slots| slots.iter().filter_map(|&slot| self.nodes.get(slot)).collect())
            .unwrap_or_default()
    }

    /// All nodes whose preferred label equals `name`.
    ///
    /// Linear scan; build a [`crate::NodeIndex`] for repeated lookups.
    pub fn all_nodes_by_name(&self, name: &str) -> Vec<&Node> {
        self.nodes
            .iter()
            .filter(|node| node.pref_label() == name)
            .collect()
    }

    /// Relations starting at `descriptor`. Linear scan.
    pub fn outgoing_relations(&self, descriptor: &str) -> Vec<&Relation> {
        self.relations
            .iter()
            .filter(|r| r.start == descriptor)
            .collect()
    }

    /// Descriptors shared by more than one node, with their multiplicity.
    pub fn duplicate_descriptors(&self) -> Vec<(&str, usize)> {
        let mut duplicates: Vec<_> = self
            .descriptor_index
            .iter()
            .filter(|(_, slots)| slots.len() > 1)
            .map(|(descriptor, slots)| (descriptor.as_str(), slots.len()))
            .collect();
        duplicates.sort();
        duplicates
    }

    /// Returns a copy of this graph with every node tagged with `source` as
    /// its provenance note. Nodes already carrying a note keep it.
    pub fn with_provenance(&self, source: &str) -> TaxonGraph {
        let mut tagged = self.clone();
        for node in &mut tagged.nodes {
            node.add_attribute(SCHEMA_HISTORY_NOTE, source);
        }
        tagged
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the number of relations.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Relations in insertion order.
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }
}

impl std::fmt::Display for TaxonGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for node in &self.nodes {
            writeln!(f, "{}", node)?;
        }
        for relation in &self.relations {
            writeln!(f, "{}", relation)?;
        }
        Ok(())
    }
}

/// Graph statistics for the status command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub name: String,
    pub node_count: usize,
    pub relation_count: usize,
    pub hierarchy_edges: usize,
    pub synonym_edges: usize,
    pub duplicate_descriptors: usize,
}

impl TaxonGraph {
    /// Returns graph statistics.
    pub fn stats(&self) -> GraphStats {
        let hierarchy_edges = self
            .relations
            .iter()
            .filter(|r| r.label.is_hierarchy())
            .count();
        GraphStats {
            name: self.name.clone(),
            node_count: self.node_count(),
            relation_count: self.relation_count(),
            hierarchy_edges,
            synonym_edges: self.relation_count() - hierarchy_edges,
            duplicate_descriptors: self.duplicate_descriptors().len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Kingdom `k1`, family `f1`, genera `g1`/`g2`, species `s1`/`s2` under
    /// `g1`, and a synonym edge `s1 -> s2`.
    pub(crate) fn plant_graph() -> TaxonGraph {
        let mut graph = TaxonGraph::new("plants");

        graph.add_kingdom_node("k1", "Plantae", []);

        graph.add_family_node("f1", "Rosaceae", []);
        graph.add_family_to_kingdom("f1", "k1");

        graph.add_genus_node("g1", "Rosa", []);
        graph.add_genus_node("g2", "Rubus", []);
        graph.add_genus_to_family("g1", "f1");
        graph.add_genus_to_family("g2", "f1");

        graph.add_species_node("s1", "Rosa canina", []);
        graph.add_species_node("s2", "Rosa gallica", []);
        graph.add_species_to_genus("s1", "g1");
        graph.add_species_to_genus("s2", "g1");

        graph.add_synonym_relation("s1", "s2");
        graph
    }

    fn has_relation(graph: &TaxonGraph, start: &str, label: RelationLabel, end: &str) -> bool {
        graph
            .relations()
            .iter()
            .any(|r| r.start == start && r.label == label && r.end == end)
    }

    #[test]
    fn test_factories_append_in_order() {
        let graph = plant_graph();

        let descriptors: Vec<_> = graph.nodes().iter().map(|n| n.descriptor.as_str()).collect();
        assert_eq!(descriptors, vec!["k1", "f1", "g1", "g2", "s1", "s2"]);
        assert_eq!(
            graph.nodes()[3].concept_scheme(),
            Some(ConceptScheme::Genus)
        );
    }

    #[test]
    fn test_hierarchy_edges_are_mirrored() {
        let graph = plant_graph();

        // 5 mirrored pairs plus one synonym edge
        assert_eq!(graph.relation_count(), 11);
        for relation in graph.relations() {
            match relation.label {
                RelationLabel::Broader => assert!(has_relation(
                    &graph,
                    &relation.end,
                    RelationLabel::Narrower,
                    &relation.start
                )),
                RelationLabel::Narrower => assert!(has_relation(
                    &graph,
                    &relation.end,
                    RelationLabel::Broader,
                    &relation.start
                )),
                RelationLabel::Related => {}
            }
        }
    }

    #[test]
    fn test_synonym_relation_is_not_mirrored() {
        let graph = plant_graph();

        assert!(has_relation(&graph, "s1", RelationLabel::Related, "s2"));
        assert!(!has_relation(&graph, "s2", RelationLabel::Related, "s1"));
        assert!(!graph.is_parent_of("s1", "s2"));
    }

    #[test]
    fn test_change_parent_rewrites_both_directions() {
        let mut graph = plant_graph();
        assert!(graph.is_parent_of("s2", "g1"));

        let rewritten = graph.change_parent("g1", "s2", "g2");

        assert_eq!(rewritten, 2);
        assert!(graph.is_parent_of("s2", "g2"));
        assert!(!graph.is_parent_of("s2", "g1"));
        assert!(has_relation(&graph, "g2", RelationLabel::Narrower, "s2"));
        assert!(!has_relation(&graph, "g1", RelationLabel::Narrower, "s2"));
        // the sibling is untouched
        assert!(graph.is_parent_of("s1", "g1"));
    }

    #[test]
    fn test_lookups_return_collections() {
        let mut graph = plant_graph();
        graph.add_species_node("s1", "Rosa canina", [Attribute::status("synonym")]);

        assert_eq!(graph.nodes_by_descriptor("s1").len(), 2);
        assert!(graph.nodes_by_descriptor("missing").is_empty());
        assert_eq!(graph.all_nodes_by_name("Rosa canina").len(), 2);
        assert!(graph.all_nodes_by_name("Lilium").is_empty());
        assert_eq!(graph.duplicate_descriptors(), vec![("s1", 2)]);
        assert_eq!(graph.outgoing_relations("s1").len(), 2);
    }

    #[test]
    fn test_try_add_node_reports_collision() {
        let mut graph = plant_graph();

        let err = graph
            .try_add_node(ConceptScheme::Genus, "g1", "Rosa", [])
            .unwrap_err();
        assert_eq!(err, GraphError::DuplicateDescriptor("g1".to_string()));
        assert!(graph
            .try_add_node(ConceptScheme::Genus, "g3", "Fragaria", [])
            .is_ok());
        assert_eq!(graph.node_count(), 7);
    }

    #[test]
    fn test_add_attribute_by_descriptor() {
        let mut graph = plant_graph();

        assert!(graph.add_attribute("s1", Attribute::author("L.")));
        assert!(!graph.add_attribute("s1", Attribute::author("Mill.")));
        assert!(!graph.add_attribute("missing", Attribute::author("L.")));
        assert_eq!(
            graph.nodes_by_descriptor("s1")[0].literal(taxa_core::SCHEMA_AUTHOR),
            Some("L.")
        );
    }

    #[test]
    fn test_with_provenance_leaves_input_untouched() {
        let graph = plant_graph();

        let tagged = graph.with_provenance("wfo");
        let retagged = tagged.with_provenance("tpl");

        assert!(graph.nodes().iter().all(|n| n.provenance().is_none()));
        assert!(tagged.nodes().iter().all(|n| n.provenance() == Some("wfo")));
        assert!(retagged.nodes().iter().all(|n| n.provenance() == Some("wfo")));
        assert_eq!(
            retagged.nodes()[0].attributes().len(),
            graph.nodes()[0].attributes().len() + 1
        );
    }

    #[test]
    fn test_stats() {
        let stats = plant_graph().stats();

        assert_eq!(stats.node_count, 6);
        assert_eq!(stats.relation_count, 11);
        assert_eq!(stats.hierarchy_edges, 10);
        assert_eq!(stats.synonym_edges, 1);
        assert_eq!(stats.duplicate_descriptors, 0);
    }

    #[test]
    fn test_descriptor_index_rebuilt_on_deserialize() {
        let mut graph = plant_graph();
        graph.add_species_node("s1", "Rosa canina", []);

        let bytes = bincode::serialize(&graph).unwrap();
        let mut loaded: TaxonGraph = bincode::deserialize(&bytes).unwrap();

        assert_eq!(loaded.duplicate_descriptors(), vec![("s1", 2)]);
        assert_eq!(loaded.nodes_by_descriptor("g2")[0].pref_label(), "Rubus");
        assert!(loaded.add_attribute("s1", Attribute::status("accepted")));

        loaded.add_genus_node("g3", "Prunus", []);
        assert_eq!(loaded.nodes_by_descriptor("g3").len(), 1);
    }
}
