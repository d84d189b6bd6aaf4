//! Taxa Graph - taxonomic relationship management
//!
//! This crate owns the graph of taxon nodes and the SKOS relations between
//! them, and everything that reads it in bulk: indexes, closure search,
//! hierarchy reconstruction, multi-source merging, parallel export and
//! snapshots.
//!
//! # Architecture
//!
//! `TaxonGraph` is an append-only pair of sequences (nodes, relations) with a
//! descriptor index on the side. Read-side indexes borrow the graph they
//! were built from, so a graph cannot be mutated while an index over it is
//! alive:
//! - `NodeIndex` keyed by preferred label or descriptor
//! - `RelationIndex` keyed by start and by end descriptor
//!
//! # Example
//!
//! ```
//! use taxa_graph::{synonym_closure, RelationIndex, TaxonGraph};
//!
//! let mut graph = TaxonGraph::new("plants");
//! graph.add_genus_node("g1", "Rosa", []);
//! graph.add_species_node("s1", "Rosa canina", []);
//! graph.add_species_node("s2", "Rosa lutetiana", []);
//! graph.add_species_to_genus("s1", "g1");
//! graph.add_synonym_relation("s2", "s1");
//!
//! let index = RelationIndex::new(&graph);
//! assert_eq!(synonym_closure(&index, "s1", 1), vec!["s2"]);
//! ```

mod builder;
mod closure;
mod export;
mod graph;
mod hierarchy;
mod merge;
mod node_index;
mod query;
mod relation;
mod relation_index;
mod store;

pub use builder::{build_graph, BuildReport, GraphBuilder};
pub use closure::{closure_search, synonym_closure};
pub use export::{ConcurrentExporter, ExportError, ExportStats, DEFAULT_SLICE_CAPACITY};
pub use graph::{GraphError, GraphStats, TaxonGraph};
pub use hierarchy::{collapse_repeated_labels, HierarchyResolver, MAX_HIERARCHY_HOPS};
pub use merge::{
    ExactLabelMatcher, GraphMerger, IdentityMatcher, LabelAndRankMatcher, MergeReport, Source,
};
pub use node_index::NodeIndex;
pub use query::{order_by_name_length, order_by_status, NodeRecord, TaxonQuery, STATUS_ORDER};
pub use relation::{Relation, RelationLabel};
pub use relation_index::RelationIndex;
pub use store::{load_graph_from_file, save_graph_to_file, GraphStore, StoreError};
