//! Dual relation index.
//!
//! Every relation is filed twice: under its start (forward bucket) and
//! under its end (backward bucket). Like [`NodeIndex`], the index borrows
//! the graph it was built from.

use crate::graph::TaxonGraph;
use crate::node_index::NodeIndex;
use crate::relation::{Relation, RelationLabel};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct RelationIndex<'g> {
    /// Relations keyed by start descriptor.
    forward: HashMap<&'g str, Vec<&'g Relation>>,
    /// Relations keyed by end descriptor.
    backward: HashMap<&'g str, Vec<&'g Relation>>,
}

impl<'g> RelationIndex<'g> {
    /// Builds both buckets in one pass over the graph's relations.
    pub fn new(graph: &'g TaxonGraph) -> Self {
        let mut forward: HashMap<&'g str, Vec<&'g Relation>> = HashMap::new();
        let mut backward: HashMap<&'g str, Vec<&'g Relation>> = HashMap::new();
        for relation in graph.relations() {
            forward.entry(relation.start.as_str()).or_default().push(relation);
            backward.entry(relation.end.as_str()).or_default().push(relation);
        }
        debug!(
            graph = graph.name(),
            starts = forward.len(),
            ends = backward.len(),
            "relation index built"
        );
        Self { forward, backward }
    }

    /// Relations starting at `descriptor`, in graph order.
    pub fn outgoing(&self, descriptor: &str) -> &[&'g Relation] {
        self.forward
            .get(descriptor)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Relations ending at `descriptor`, in graph order.
    pub fn incoming(&self, descriptor: &str) -> &[&'g Relation] {
        self.backward
            .get(descriptor)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Descriptors one `label` edge away from `descriptor`, in either
    /// direction. First-seen order, no duplicates.
    ///
    /// Self-loops are not special-cased, so a loop yields `descriptor`
    /// itself.
    pub fn descriptors_reachable_via(&self, descriptor: &str, label: RelationLabel) -> Vec<&'g str> {
        let mut seen = HashSet::new();
        self.outgoing(descriptor)
            .iter()
            .chain(self.incoming(descriptor))
            .copied()
            .filter(|relation| relation.label == label)
            .flat_map(|relation| relation.other_endpoints(descriptor))
            .filter(|other| seen.insert(*other))
            .collect()
    }

    /// The narrower edge pointing at `descriptor`, i.e. the link to its parent.
    pub fn broader_relation(&self, descriptor: &str) -> Option<&'g Relation> {
        self.incoming(descriptor)
            .iter()
            .copied()
            .find(|relation| relation.label == RelationLabel::Narrower)
    }

    /// Next hop upward from `descriptor`.
    ///
    /// Prefers the parent link. Without one, takes the first outgoing
    /// synonym edge and returns it reversed, so its start is the next hop.
    /// The counterpart may come from another source, which is how a merged
    /// species climbs into a different source's hierarchy. Requires a node
    /// for `descriptor` in `nodes` (a descriptor-keyed index).
    pub fn broader_or_synonym_relation(
        &self,
        descriptor: &str,
        nodes: &NodeIndex<'_>,
    ) -> Option<Cow<'g, Relation>> {
        nodes.first(descriptor)?;

        if let Some(relation) = self.broader_relation(descriptor) {
            return Some(Cow::Borrowed(relation));
        }

        self.outgoing(descriptor)
            .iter()
            .find(|relation| relation.label == RelationLabel::Related)
            .map(|relation| Cow::Owned(relation.reversed()))
    }

    /// Returns the number of distinct start descriptors.
    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
