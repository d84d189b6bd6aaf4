//! Taxa Core - the taxonomic data model
//!
//! Nodes, their attributes and the rank vocabulary shared by every other
//! Taxa crate. Nothing in here knows about edges; relations and the graph
//! that owns them live in `taxa-graph`.
//!
//! # Example
//!
//! ```
//! use taxa_core::{Attribute, ConceptScheme, Node};
//!
//! let mut node = Node::new("s1", "Rosa canina", ConceptScheme::Species, []);
//! assert!(node.push(Attribute::status("accepted")));
//! assert!(!node.push(Attribute::status("synonym")));
//! ```

mod attribute;
mod node;
mod row;
mod scheme;

pub use attribute::{
    Attribute, SCHEMA_AUTHOR, SCHEMA_HISTORY_NOTE, SCHEMA_IN_SCHEME, SCHEMA_PREF_LABEL,
    SCHEMA_TAXON_STATUS,
};
pub use node::Node;
pub use row::TaxonRow;
pub use scheme::{ConceptScheme, UnknownRank};
