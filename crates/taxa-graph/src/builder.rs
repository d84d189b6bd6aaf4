//! Graph builder for constructing a taxon graph from tabular rows.
//!
//! The builder takes `TaxonRow`s from whatever reader produced them and
//! resolves their parent and accepted-usage references into relations.

use crate::graph::TaxonGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use taxa_core::TaxonRow;
use tracing::{debug, info};

/// What a build produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildReport {
    pub nodes: usize,
    pub hierarchy_links: usize,
    pub synonym_links: usize,
    /// Rows whose rank is not modelled.
    pub skipped_rows: usize,
    /// Parent ids that named no known row.
    pub unresolved_parents: usize,
    /// Accepted-usage ids that named no known row.
    pub unresolved_synonyms: usize,
}

/// Builds a `TaxonGraph` from rows.
///
/// The builder handles the two-pass process:
/// 1. Add a node for every row of a known rank
/// 2. Resolve parent and accepted-usage ids into relations
pub struct GraphBuilder {
    graph: TaxonGraph,
    rows: Vec<TaxonRow>,
    /// Ids of rows that became nodes.
    known: HashSet<String>,
    report: BuildReport,
}

impl GraphBuilder {
    /// Creates a builder for a graph called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            graph: TaxonGraph::new(name),
            rows: Vec::new(),
            known: HashSet::new(),
            report: BuildReport::default(),
        }
    }

    /// Adds rows to the graph.
    ///
    /// Call this for each batch, then call `build` when all rows are added.
    pub fn add_rows(&mut self, rows: impl IntoIterator<Item = TaxonRow>) {
        for row in rows {
            let Some(scheme) = row.scheme() else {
                debug!(id = %row.id, rank = %row.rank, "skipping row of unmodelled rank");
                self.report.skipped_rows += 1;
                continue;
            };
            self.graph
                .add_node(scheme, &row.id, &row.scientific_name, row.attributes());
            self.known.insert(row.id.clone());
            self.report.nodes += 1;
            self.rows.push(row);
        }
    }

    /// Resolves references into relations and returns the finished graph.
    ///
    /// References are resolved in row order: the parent pair first, then
    /// the synonym edge.
    pub fn build(mut self) -> (TaxonGraph, BuildReport) {
        for row in &self.rows {
            if let Some(parent) = row.parent() {
                if self.known.contains(parent) {
                    self.graph.link_child(&row.id, parent);
                    self.report.hierarchy_links += 1;
                } else {
                    self.report.unresolved_parents += 1;
                }
            }
            if let Some(accepted) = row.accepted() {
                if self.known.contains(accepted) {
                    self.graph.add_synonym_relation(&row.id, accepted);
                    self.report.synonym_links += 1;
                } else {
                    self.report.unresolved_synonyms += 1;
                }
            }
        }

        info!(
            name = self.graph.name(),
            nodes = self.report.nodes,
            hierarchy = self.report.hierarchy_links,
            synonyms = self.report.synonym_links,
            skipped = self.report.skipped_rows,
            "graph built"
        );
        (self.graph, self.report)
    }
}

/// Builds a graph from a single batch of rows.
pub fn build_graph(
    name: impl Into<String>,
    rows: impl IntoIterator<Item = TaxonRow>,
) -> (TaxonGraph, BuildReport) {
    let mut builder = GraphBuilder::new(name);
    builder.add_rows(rows);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relation::RelationLabel;
    use taxa_core::ConceptScheme;

    fn rows() -> Vec<TaxonRow> {
        vec![
            TaxonRow::new("2", "Rosa canina", "species")
                .with_parent("1")
                .with_status("accepted")
                .with_authorship("L."),
            TaxonRow::new("1", "Rosa", "genus"),
            TaxonRow::new("3", "Rosa lutetiana", "species")
                .with_accepted("2")
                .with_status("synonym"),
            TaxonRow::new("4", "Rosa canina var. dumalis", "variety").with_parent("2"),
            TaxonRow::new("5", "Rosoideae", "tribe"),
            TaxonRow::new("6", "Rosa orphana", "species").with_parent("99"),
        ]
    }

    #[test]
    fn test_build_links_parents_declared_later() {
        let (graph, report) = build_graph("tpl", rows());

        assert_eq!(graph.name(), "tpl");
        assert_eq!(report.nodes, 5);
        assert_eq!(report.skipped_rows, 1);
        assert!(graph.is_parent_of("2", "1"));
        assert!(graph.is_parent_of("4", "2"));
        assert_eq!(report.hierarchy_links, 2);
        assert_eq!(report.unresolved_parents, 1);
    }

    #[test]
    fn test_synonym_edge_points_at_accepted() {
        let (graph, report) = build_graph("tpl", rows());

        assert_eq!(report.synonym_links, 1);
        let related: Vec<_> = graph
            .outgoing_relations("3")
            .into_iter()
            .filter(|r| r.label == RelationLabel::Related)
            .collect();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].end, "2");
    }

    #[test]
    fn test_row_fields_become_attributes() {
        let (graph, _) = build_graph("tpl", rows());

        let node = graph.nodes_by_descriptor("2")[0];
        assert_eq!(node.pref_label(), "Rosa canina");
        assert_eq!(node.taxon_status(), Some("accepted"));
        assert_eq!(node.concept_scheme(), Some(ConceptScheme::Species));

        let variety = graph.nodes_by_descriptor("4")[0];
        assert_eq!(variety.concept_scheme(), Some(ConceptScheme::SubSpecies));
    }

    #[test]
    fn test_self_accepted_rows_are_not_synonyms() {
        let rows = vec![
            TaxonRow::new("1", "Rosa", "genus").with_accepted("1"),
            TaxonRow::new("2", "Rubus", "genus").with_accepted("7"),
        ];
        let (graph, report) = build_graph("wfo", rows);

        assert_eq!(graph.relation_count(), 0);
        assert_eq!(report.synonym_links, 0);
        assert_eq!(report.unresolved_synonyms, 1);
    }

    #[test]
    fn test_batches_resolve_across_calls() {
        let mut builder = GraphBuilder::new("itis");
        builder.add_rows([TaxonRow::new("s", "Rosa canina", "species").with_parent("g")]);
        builder.add_rows([TaxonRow::new("g", "Rosa", "genus")]);

        let (graph, report) = builder.build();
        assert_eq!(report.hierarchy_links, 1);
        assert_eq!(graph.relation_count(), 2);
    }
}
