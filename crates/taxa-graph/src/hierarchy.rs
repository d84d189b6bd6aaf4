//! Upward hierarchy reconstruction.
//!
//! Starting from a descriptor, repeatedly takes the next hop upward (parent
//! link, or a synonym bridge when there is no parent) until the chain runs
//! out. Runaway chains are treated as unresolvable: once the cap
//! is hit the whole chain is discarded.

use crate::node_index::NodeIndex;
use crate::relation_index::RelationIndex;
use taxa_core::Node;
use tracing::{debug, warn};

/// Maximum number of upward hops before a chain is considered cyclic.
pub const MAX_HIERARCHY_HOPS: usize = 26;

/// Walks relation and descriptor indexes upward.
pub struct HierarchyResolver<'a, 'g> {
    relations: &'a RelationIndex<'g>,
    /// Must be keyed by descriptor.
    nodes: &'a NodeIndex<'g>,
}

impl<'a, 'g> HierarchyResolver<'a, 'g> {
    pub fn new(relations: &'a RelationIndex<'g>, nodes: &'a NodeIndex<'g>) -> Self {
        Self { relations, nodes }
    }

    /// Descriptor chain from `start` upward, `start` first.
    ///
    /// Returns an empty chain when more than [`MAX_HIERARCHY_HOPS`] hops
    /// would be needed.
    pub fn upward_descriptors(&self, start: &str) -> Vec<String> {
        let mut chain = vec![start.to_string()];
        let mut next = self.relations.broader_or_synonym_relation(start, self.nodes);

        while let Some(relation) = next {
            if chain.len() > MAX_HIERARCHY_HOPS {
                warn!(start, hops = MAX_HIERARCHY_HOPS, "hierarchy walk capped, discarding chain");
                return Vec::new();
            }
            let hop = relation.start.clone();
            next = self.relations.broader_or_synonym_relation(&hop, self.nodes);
            chain.push(hop);
        }

        debug!(start, length = chain.len(), "hierarchy resolved");
        chain
    }

    /// Nodes from `start` upward to the root.
    ///
    /// Every descriptor resolves to all nodes carrying it, so collisions show
    /// up as repeated entries.
    pub fn upward_chain(&self, start: &str) -> Vec<&'g Node> {
        let chain = self.upward_descriptors(start);
        self.nodes.all_nodes_for_keys(&chain)
    }
}

/// Drops entries whose preferred label equals the one just before them.
///
/// Merged graphs list the same taxon once per source along a synonym bridge;
/// this keeps the first of each run.
pub fn collapse_repeated_labels<'g>(chain: Vec<&'g Node>) -> Vec<&'g Node> {
    let mut collapsed: Vec<&'g Node> = Vec::with_capacity(chain.len());
    for node in chain {
        let repeated = collapsed
            .last()
            .is_some_and(|last| last.pref_label() == node.pref_label());
        if !repeated {
            collapsed.push(node);
        }
    }
    collapsed
}
