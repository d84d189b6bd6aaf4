//! Multi-source merge.
//!
//! Combines three source graphs into one. Each source is first copied and
//! tagged with its provenance name (the inputs are never touched), then
//! nodes that the matcher considers the same taxon are linked with synonym
//! edges across sources.
//!
//! Cross-source identity defaults to exact preferred-label equality. Two
//! unrelated taxa that share a spelling end up linked; swap the matcher to
//! be stricter.

use crate::graph::TaxonGraph;
use crate::node_index::NodeIndex;
use serde::{Deserialize, Serialize};
use taxa_core::Node;
use tracing::{debug, info, warn};

/// Decides whether two nodes from different sources are the same taxon.
///
/// `key` narrows the candidates: only nodes with equal keys are offered to
/// `matches`.
pub trait IdentityMatcher {
    /// Blocking key used to index the second source of a pair.
    fn key(&self, node: &Node) -> String {
        node.pref_label().to_string()
    }

    /// Final say on a candidate pair sharing a key.
    fn matches(&self, first: &Node, second: &Node) -> bool;
}

/// Same preferred label, nothing else considered.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactLabelMatcher;

impl IdentityMatcher for ExactLabelMatcher {
    fn matches(&self, first: &Node, second: &Node) -> bool {
        first.pref_label() == second.pref_label()
    }
}

/// Same preferred label and same rank.
#[derive(Debug, Clone, Copy, Default)]
pub struct LabelAndRankMatcher;

impl IdentityMatcher for LabelAndRankMatcher {
    fn matches(&self, first: &Node, second: &Node) -> bool {
        first.pref_label() == second.pref_label()
            && first.concept_scheme() == second.concept_scheme()
    }
}

/// A source graph and the provenance name its nodes get tagged with.
#[derive(Debug, Clone, Copy)]
pub struct Source<'a> {
    pub provenance: &'a str,
    pub graph: &'a TaxonGraph,
}

impl<'a> Source<'a> {
    pub fn new(provenance: &'a str, graph: &'a TaxonGraph) -> Self {
        Self { provenance, graph }
    }
}

/// What a merge produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeReport {
    pub node_count: usize,
    pub relation_count: usize,
    /// Synonym edges synthesized between sources.
    pub cross_source_links: usize,
    /// Descriptors carried by more than one node after the union.
    pub duplicate_descriptors: Vec<String>,
}

/// Merges three provenance-tagged sources.
#[derive(Debug, Clone, Default)]
pub struct GraphMerger<M = ExactLabelMatcher> {
    matcher: M,
    name: String,
}

impl GraphMerger<ExactLabelMatcher> {
    /// Creates a merger using exact label matching.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_matcher(name, ExactLabelMatcher)
    }
}

impl<M: IdentityMatcher> GraphMerger<M> {
    pub fn with_matcher(name: impl Into<String>, matcher: M) -> Self {
        Self {
            matcher,
            name: name.into(),
        }
    }

    /// Merges `a`, `b` and `c`.
    ///
    /// Pairs are matched in the order a→b, a→c, b→c; for every node of the
    /// first source each matching node of the second gets a synonym edge
    /// pointing at it. The union then appends nodes of b, c, a and relations
    /// of b, a, c after the synthesized synonyms.
    pub fn merge(&self, a: Source<'_>, b: Source<'_>, c: Source<'_>) -> (TaxonGraph, MergeReport) {
        info!(
            a = a.provenance,
            b = b.provenance,
            c = c.provenance,
            "merging sources"
        );
        let a_graph = a.graph.with_provenance(a.provenance);
        let b_graph = b.graph.with_provenance(b.provenance);
        let c_graph = c.graph.with_provenance(c.provenance);

        let b_index = NodeIndex::with_key(&b_graph, |node| self.matcher.key(node));
        let c_index = NodeIndex::with_key(&c_graph, |node| self.matcher.key(node));

        let mut merged = TaxonGraph::new(self.name.clone());
        let mut links = 0;
        for (first, second, label) in [
            (&a_graph, &b_index, (a.provenance, b.provenance)),
            (&a_graph, &c_index, (a.provenance, c.provenance)),
            (&b_graph, &c_index, (b.provenance, c.provenance)),
        ] {
            let found = self.link_matches(&mut merged, first, second);
            debug!(from = label.0, to = label.1, links = found, "matched sources");
            links += found;
        }

        for graph in [&b_graph, &c_graph, &a_graph] {
            for node in graph.nodes() {
                merged.push_node(node.clone());
            }
        }
        for graph in [&b_graph, &a_graph, &c_graph] {
            for relation in graph.relations() {
                merged.push_relation(relation.clone());
            }
        }

        let duplicate_descriptors: Vec<String> = merged
            .duplicate_descriptors()
            .into_iter()
            .map(|(descriptor, _)| descriptor.to_string())
            .collect();
        if !duplicate_descriptors.is_empty() {
            warn!(
                count = duplicate_descriptors.len(),
                "merged graph carries colliding descriptors"
            );
        }

        let report = MergeReport {
            node_count: merged.node_count(),
            relation_count: merged.relation_count(),
            cross_source_links: links,
            duplicate_descriptors,
        };
        info!(
            nodes = report.node_count,
            relations = report.relation_count,
            links = report.cross_source_links,
            "merge finished"
        );
        (merged, report)
    }

    fn link_matches(
        &self,
        merged: &mut TaxonGraph,
        first: &TaxonGraph,
        second: &NodeIndex<'_>,
    ) -> usize {
        let mut links = 0;
        for node in first.nodes() {
            for candidate in second.nodes_for_key(&self.matcher.key(node)) {
                if self.matcher.matches(node, candidate) {
                    merged.add_synonym_relation(&candidate.descriptor, &node.descriptor);
                    links += 1;
                }
            }
        }
        links
    }
}
