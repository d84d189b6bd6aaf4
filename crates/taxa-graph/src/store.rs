//! Graph snapshots.
//!
//! A snapshot is the whole `TaxonGraph` serialized with bincode. There is no
//! partial load and no versioning: a blob is written as a whole and read
//! back verbatim. Reads are fail-soft, a snapshot that cannot be read is
//! reported as "no graph". The descriptor index is not part of the blob and
//! is rebuilt from the nodes on every load.

use crate::graph::TaxonGraph;
use sled::Db;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A catalog of named graph snapshots backed by sled.
pub struct GraphStore {
    db: Db,
}

impl GraphStore {
    /// Opens or creates a graph store at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    /// Saves `graph` under `name`, replacing any previous snapshot.
    pub fn save_graph(&self, name: &str, graph: &TaxonGraph) -> Result<(), StoreError> {
        let bytes = bincode::serialize(graph)?;
        debug!(name, bytes = bytes.len(), "saving snapshot");
        self.db.insert(name, bytes)?;
        self.db.flush()?;
        Ok(())
    }

    /// Loads the snapshot stored under `name`.
    ///
    /// Missing and unreadable snapshots both come back as `None`.
    pub fn load_graph(&self, name: &str) -> Option<TaxonGraph> {
        match self.try_load_graph(name) {
            Ok(graph) => graph,
            Err(e) => {
                warn!(name, error = %e, "failed to load snapshot");
                None
            }
        }
    }

    fn try_load_graph(&self, name: &str) -> Result<Option<TaxonGraph>, StoreError> {
        match self.db.get(name)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Names of all stored snapshots, sorted.
    pub fn names(&self) -> Vec<String> {
        self.db
            .iter()
            .keys()
            .filter_map(|key| match key {
                Ok(key) => Some(key),
                Err(e) => {
                    warn!(error = %e, "failed to read snapshot key");
                    None
                }
            })
            .map(|key| String::from_utf8_lossy(&key).into_owned())
            .collect()
    }

    /// Removes the snapshot stored under `name`.
    pub fn remove(&self, name: &str) -> Result<bool, StoreError> {
        let removed = self.db.remove(name)?.is_some();
        self.db.flush()?;
        Ok(removed)
    }
}

/// Writes `graph` to a single snapshot file.
pub fn save_graph_to_file<P: AsRef<Path>>(graph: &TaxonGraph, path: P) -> Result<(), StoreError> {
    let bytes = bincode::serialize(graph)?;
    fs::write(path, bytes)?;
    Ok(())
}

/// Reads a snapshot file. Any failure is logged and reported as `None`.
pub fn load_graph_from_file<P: AsRef<Path>>(path: P) -> Option<TaxonGraph> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read snapshot");
            return None;
        }
    };
    match bincode::deserialize(&bytes) {
        Ok(graph) => Some(graph),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to decode snapshot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::tests::plant_graph;
    use crate::relation::Relation;
    use serde::Serialize;
    use std::collections::{HashMap, HashSet};
    use taxa_core::{Attribute, Node};
    use tempfile::tempdir;

    fn attribute_sets(graph: &TaxonGraph) -> Vec<HashSet<Attribute>> {
        graph
            .nodes()
            .iter()
            .map(|node: &Node| node.attributes().iter().cloned().collect())
            .collect()
    }

    #[test]
    fn test_save_load_graph() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();
        let graph = plant_graph();

        store.save_graph("tpl", &graph).unwrap();

        let loaded = store.load_graph("tpl").unwrap();
        assert_eq!(loaded.name(), "plants");
        assert_eq!(loaded.node_count(), graph.node_count());
        assert_eq!(loaded.relation_count(), graph.relation_count());
        assert_eq!(attribute_sets(&loaded), attribute_sets(&graph));
        assert_eq!(loaded.nodes_by_descriptor("g2").len(), 1);
    }

    #[test]
    fn test_missing_and_corrupt_snapshots_are_none() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();

        assert!(store.load_graph("nothing").is_none());

        store.db.insert("broken", vec![0xff, 0x01]).unwrap();
        assert!(store.load_graph("broken").is_none());
    }

    #[test]
    fn test_names_and_remove() {
        let dir = tempdir().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();
        let graph = plant_graph();

        store.save_graph("wfo", &graph).unwrap();
        store.save_graph("itis", &graph).unwrap();
        assert_eq!(store.names(), vec!["itis".to_string(), "wfo".to_string()]);

        assert!(store.remove("wfo").unwrap());
        assert!(!store.remove("wfo").unwrap());
        assert_eq!(store.names(), vec!["itis".to_string()]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plants.graph");
        let mut graph = plant_graph();
        graph.add_species_node("s1", "Rosa canina", [Attribute::status("synonym")]);

        save_graph_to_file(&graph, &path).unwrap();
        let loaded = load_graph_from_file(&path).unwrap();

        let order = |g: &TaxonGraph| -> Vec<String> {
            g.nodes().iter().map(|n| n.descriptor.clone()).collect()
        };
        assert_eq!(order(&loaded), order(&graph));
        assert_eq!(loaded.relations(), graph.relations());
        assert_eq!(attribute_sets(&loaded), attribute_sets(&graph));
        assert_eq!(loaded.duplicate_descriptors(), vec![("s1", 2)]);
    }

    #[test]
    fn test_unreadable_file_is_none() {
        let dir = tempdir().unwrap();
        assert!(load_graph_from_file(dir.path().join("absent.graph")).is_none());

        let garbage = dir.path().join("garbage.graph");
        fs::write(&garbage, b"not a graph").unwrap();
        assert!(load_graph_from_file(&garbage).is_none());
    }

    /// Field layout of a snapshot that also carries a descriptor index.
    #[derive(Serialize)]
    struct IndexedSnapshot {
        name: String,
        nodes: Vec<Node>,
        relations: Vec<Relation>,
        descriptor_index: HashMap<String, Vec<usize>>,
    }

    #[test]
    fn test_stored_index_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.graph");
        let stale = IndexedSnapshot {
            name: "stale".to_string(),
            nodes: Vec::new(),
            relations: Vec::new(),
            descriptor_index: HashMap::from([("x".to_string(), vec![5])]),
        };
        fs::write(&path, bincode::serialize(&stale).unwrap()).unwrap();

        let mut loaded = load_graph_from_file(&path).unwrap();
        assert_eq!(loaded.name(), "stale");
        assert!(loaded.nodes_by_descriptor("x").is_empty());
        assert!(!loaded.add_attribute("x", Attribute::status("accepted")));

        loaded.add_species_node("x", "Rosa canina", []);
        assert_eq!(loaded.nodes_by_descriptor("x").len(), 1);
        assert!(loaded.add_attribute("x", Attribute::status("accepted")));
    }
}
