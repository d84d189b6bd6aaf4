//! Read-side queries over a loaded graph.
//!
//! `TaxonQuery` builds the label, descriptor and relation indexes once and
//! answers search, related and hierarchy lookups from them. Results are plain [`NodeRecord`]s so any
//! front end (the CLI today) can render or serialize them.

use crate::closure::synonym_closure;
use crate::graph::TaxonGraph;
use crate::hierarchy::{collapse_repeated_labels, HierarchyResolver};
use crate::node_index::NodeIndex;
use crate::relation_index::RelationIndex;
use serde::{Deserialize, Serialize};
use taxa_core::{Attribute, Node};
use tracing::debug;

/// Statuses listed first by [`order_by_status`], in this order.
pub const STATUS_ORDER: [&str; 5] = ["accepted", "Accepted", "valid", "Synonym", "synonym"];

/// A node flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub descriptor: String,
    pub label: String,
    pub rank: Option<String>,
    pub status: Option<String>,
    pub provenance: Option<String>,
    pub attributes: Vec<Attribute>,
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            descriptor: node.descriptor.clone(),
            label: node.pref_label().to_string(),
            rank: node.concept_scheme().map(|scheme| scheme.as_str().to_string()),
            status: node.taxon_status().map(str::to_string),
            provenance: node.provenance().map(str::to_string),
            attributes: node.attributes().to_vec(),
        }
    }
}

/// Query service over one graph.
pub struct TaxonQuery<'g> {
    graph: &'g TaxonGraph,
    labels: NodeIndex<'g>,
    descriptors: NodeIndex<'g>,
    relations: RelationIndex<'g>,
}

impl<'g> TaxonQuery<'g> {
    /// Builds the indexes for `graph`.
    pub fn new(graph: &'g TaxonGraph) -> Self {
        Self {
            graph,
            labels: NodeIndex::by_pref_label(graph),
            descriptors: NodeIndex::by_descriptor(graph),
            relations: RelationIndex::new(graph),
        }
    }

    pub fn graph(&self) -> &'g TaxonGraph {
        self.graph
    }

    pub fn relations(&self) -> &RelationIndex<'g> {
        &self.relations
    }

    /// Nodes whose preferred label starts with `term`, ignoring case.
    ///
    /// Collects at most `2 * limit` hits in graph order, sorts them by label
    /// length and keeps the first `limit`.
    pub fn search(&self, term: &str, limit: usize) -> Vec<NodeRecord> {
        let needle = term.to_lowercase();
        let mut hits: Vec<&Node> = self
            .graph
            .nodes()
            .iter()
            .filter(|node| node.pref_label().to_lowercase().starts_with(&needle))
            .take(limit.saturating_mul(2))
            .collect();
        order_by_name_length(&mut hits);
        hits.truncate(limit);
        debug!(term, hits = hits.len(), "search");
        hits.into_iter().map(NodeRecord::from).collect()
    }

    /// Nodes whose preferred label is exactly `name`.
    pub fn named(&self, name: &str) -> Vec<NodeRecord> {
        self.labels
            .nodes_for_key(name)
            .iter()
            .map(|node| NodeRecord::from(*node))
            .collect()
    }

    /// Synonym closure of `descriptor`, accepted names first.
    ///
    /// Unknown descriptors yield nothing.
    pub fn related(&self, descriptor: &str, depth: usize) -> Vec<NodeRecord> {
        if self.descriptors.first(descriptor).is_none() {
            return Vec::new();
        }
        let found = synonym_closure(&self.relations, descriptor, depth);
        let nodes = order_by_status(self.descriptors.all_nodes_for_keys(&found));
        nodes.into_iter().map(NodeRecord::from).collect()
    }

    /// Path from `descriptor` up to its root, without consecutive repeats of
    /// the same name.
    pub fn hierarchy(&self, descriptor: &str) -> Vec<NodeRecord> {
        let resolver = HierarchyResolver::new(&self.relations, &self.descriptors);
        collapse_repeated_labels(resolver.upward_chain(descriptor))
            .into_iter()
            .map(NodeRecord::from)
            .collect()
    }
}

/// Sorts by preferred label length, shortest first. Stable.
pub fn order_by_name_length(nodes: &mut [&Node]) {
    nodes.sort_by_key(|node| node.pref_label().chars().count());
}

/// Groups nodes by taxonomic status following [`STATUS_ORDER`]; anything
/// else goes last. Order within a group is kept.
pub fn order_by_status<'g>(mut nodes: Vec<&'g Node>) -> Vec<&'g Node> {
    let rank = |node: &Node| {
        node.taxon_status()
            .and_then(|status| STATUS_ORDER.iter().position(|known| *known == status))
            .unwrap_or(STATUS_ORDER.len())
    };
    nodes.sort_by_key(|node| rank(*node));
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::plant_graph;

    fn descriptors(records: &[NodeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.descriptor.as_str()).collect()
    }

    #[test]
    fn test_search_prefix_ignores_case() {
        let graph = plant_graph();
        let query = TaxonQuery::new(&graph);

        let found = query.search("ROSA", 25);
        assert_eq!(descriptors(&found), vec!["g1", "f1", "s1", "s2"]);
        assert!(query.search("canina", 25).is_empty());
    }

    #[test]
    fn test_search_limit_scans_twice_the_limit() {
        let mut graph = TaxonGraph::new("many");
        graph.add_species_node("long", "Rosa longissima", []);
        graph.add_species_node("mid", "Rosa media", []);
        graph.add_genus_node("short", "Rosa", []);
        let query = TaxonQuery::new(&graph);

        // limit 1 scans two hits, so "Rosa" is never seen
        let found = query.search("rosa", 1);
        assert_eq!(descriptors(&found), vec!["mid"]);
        assert_eq!(descriptors(&query.search("rosa", 2)), vec!["short", "mid"]);
        assert!(query.search("rosa", 0).is_empty());
    }

    #[test]
    fn test_named_is_exact() {
        let graph = plant_graph();
        let query = TaxonQuery::new(&graph);

        assert_eq!(descriptors(&query.named("Rosa")), vec!["g1"]);
        assert!(query.named("rosa").is_empty());
    }

    #[test]
    fn test_related_orders_by_status() {
        let mut graph = TaxonGraph::new("syn");
        graph.add_species_node("a", "Rosa canina", [Attribute::status("synonym")]);
        graph.add_species_node("b", "Rosa lutetiana", [Attribute::status("doubtful")]);
        graph.add_species_node("c", "Rosa canina L.", [Attribute::status("Accepted")]);
        graph.add_species_node("d", "Rosa dumalis", [Attribute::status("accepted")]);
        graph.add_synonym_relation("a", "b");
        graph.add_synonym_relation("a", "c");
        graph.add_synonym_relation("c", "d");
        let query = TaxonQuery::new(&graph);

        let found = query.related("a", 2);
        assert_eq!(descriptors(&found), vec!["d", "c", "a", "b"]);
        assert_eq!(descriptors(&query.related("a", 1)), vec!["c", "b"]);
        assert!(query.related("missing", 3).is_empty());
        assert!(query.related("a", 0).is_empty());
    }

    #[test]
    fn test_hierarchy_collapses_repeated_names() {
        let mut graph = TaxonGraph::new("wfo");
        let note = || [Attribute::history_note("wfo")];
        graph.add_genus_node("g1", "Rosa", note());
        graph.add_species_node("acc", "Rosa canina", note());
        graph.add_species_node("syn", "Rosa canina", note());
        graph.add_species_to_genus("acc", "g1");
        graph.add_synonym_relation("syn", "acc");
        let query = TaxonQuery::new(&graph);

        let chain = query.hierarchy("syn");
        assert_eq!(descriptors(&chain), vec!["syn", "g1"]);
        assert_eq!(chain[1].rank.as_deref(), Some("genus"));
    }

    #[test]
    fn test_record_serializes() {
        let graph = plant_graph();
        let record = NodeRecord::from(graph.nodes_by_descriptor("s1")[0]);

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["descriptor"], "s1");
        assert_eq!(json["label"], "Rosa canina");
        assert_eq!(json["rank"], "species");
        assert!(json["status"].is_null());

        let back: NodeRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
