//! Key-to-nodes multimap.
//!
//! A `NodeIndex` is a frozen view over one graph: it borrows the graph, so
//! the graph cannot be mutated while the index is alive and an index can
//! never go stale. Rebuild it after mutating.

use crate::graph::TaxonGraph;
use std::collections::HashMap;
use taxa_core::Node;
use tracing::debug;

/// Multimap from a projected key to the nodes that produce it.
///
/// Buckets keep graph insertion order.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex<'g> {
    buckets: HashMap<String, Vec<&'g Node>>,
}

impl<'g> NodeIndex<'g> {
    /// Indexes nodes by preferred label.
    pub fn by_pref_label(graph: &'g TaxonGraph) -> Self {
        Self::with_key(graph, |node| node.pref_label().to_string())
    }

    /// Indexes nodes by descriptor.
    pub fn by_descriptor(graph: &'g TaxonGraph) -> Self {
        Self::with_key(graph, |node| node.descriptor.clone())
    }

    /// Indexes nodes by an arbitrary projection.
    pub fn with_key<F>(graph: &'g TaxonGraph, key: F) -> Self
    where
        F: Fn(&Node) -> String,
    {
        let mut buckets: HashMap<String, Vec<&'g Node>> = HashMap::new();
        for node in graph.nodes() {
            buckets.entry(key(node)).or_default().push(node);
        }
        debug!(graph = graph.name(), keys = buckets.len(), "node index built");
        Self { buckets }
    }

    /// Nodes stored under `key`; empty when the key is unknown.
    pub fn nodes_for_key(&self, key: &str) -> &[&'g Node] {
        self.buckets.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Concatenates the buckets for `keys`, in the order given.
    ///
    /// Repeated keys yield repeated nodes.
    pub fn all_nodes_for_keys<I, K>(&self, keys: I) -> Vec<&'g Node>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter()
            .flat_map(|key| self.nodes_for_key(key.as_ref()).iter().copied())
            .collect()
    }

    /// First node stored under `key`.
    pub fn first(&self, key: &str) -> Option<&'g Node> {
        self.nodes_for_key(key).first().copied()
    }

    /// Returns the number of distinct keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
