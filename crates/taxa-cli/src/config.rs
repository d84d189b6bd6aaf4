//! Workspace configuration.
//!
//! Read from `.taxa/config.json` under the working path, falling back to
//! the user's config directory and then to built-in defaults. Missing
//! fields take their default value.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use taxa_graph::{ConcurrentExporter, DEFAULT_SLICE_CAPACITY};
use thiserror::Error;
use tracing::debug;

/// Directory holding config and store under a working path.
pub const TAXA_DIR: &str = ".taxa";
pub const CONFIG_FILE: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaxaConfig {
    /// Namespace prefix used in exported Turtle.
    pub domain: String,
    pub slice_capacity: usize,
    /// Export worker count; one per CPU when unset.
    pub workers: Option<usize>,
    pub closure_depth: usize,
    pub search_limit: usize,
    /// Provenance names of the merge inputs, in merge order.
    pub sources: Vec<String>,
}

impl Default for TaxaConfig {
    fn default() -> Self {
        Self {
            domain: "example".to_string(),
            slice_capacity: DEFAULT_SLICE_CAPACITY,
            workers: None,
            closure_depth: 5,
            search_limit: 25,
            sources: vec!["itis".to_string(), "tpl".to_string(), "wfo".to_string()],
        }
    }
}

impl TaxaConfig {
    /// Loads the config that applies to `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut candidates = vec![config_path(root)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("taxa").join(CONFIG_FILE));
        }
        Self::load_first(&candidates)
    }

    /// Loads the first existing file among `candidates`, or the defaults.
    pub fn load_first(candidates: &[PathBuf]) -> Result<Self, ConfigError> {
        for path in candidates {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::load_file(path);
            }
        }
        Ok(Self::default())
    }

    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An exporter set up from this config. `domain` overrides the
    /// configured one.
    pub fn exporter(&self, domain: Option<&str>) -> ConcurrentExporter {
        let exporter = ConcurrentExporter::new(domain.unwrap_or(&self.domain))
            .with_slice_capacity(self.slice_capacity);
        match self.workers {
            Some(workers) => exporter.with_workers(workers),
            None => exporter,
        }
    }
}

pub fn taxa_dir(root: &Path) -> PathBuf {
    root.join(TAXA_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    taxa_dir(root).join(CONFIG_FILE)
}

pub fn store_path(root: &Path) -> PathBuf {
    taxa_dir(root).join("store")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_when_nothing_exists() {
        let dir = tempdir().unwrap();
        let config = TaxaConfig::load_first(&[config_path(dir.path())]).unwrap();

        assert_eq!(config, TaxaConfig::default());
        assert_eq!(config.sources, vec!["itis", "tpl", "wfo"]);
        assert_eq!(config.slice_capacity, 100_000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(taxa_dir(dir.path())).unwrap();
        fs::write(
            config_path(dir.path()),
            r#"{ "domain": "flora", "workers": 2 }"#,
        )
        .unwrap();

        let config = TaxaConfig::load(dir.path()).unwrap();
        assert_eq!(config.domain, "flora");
        assert_eq!(config.workers, Some(2));
        assert_eq!(config.closure_depth, 5);
        assert_eq!(config.exporter(None).domain(), "flora");
        assert_eq!(config.exporter(Some("fauna")).domain(), "fauna");
    }

    #[test]
    fn test_first_candidate_wins() {
        let dir = tempdir().unwrap();
        let local = dir.path().join("local.json");
        let user = dir.path().join("user.json");
        fs::write(&local, r#"{ "search_limit": 10 }"#).unwrap();
        fs::write(&user, r#"{ "search_limit": 99 }"#).unwrap();

        let config = TaxaConfig::load_first(&[local, user.clone()]).unwrap();
        assert_eq!(config.search_limit, 10);

        let missing = dir.path().join("missing.json");
        let config = TaxaConfig::load_first(&[missing, user]).unwrap();
        assert_eq!(config.search_limit, 99);
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            TaxaConfig::load_file(&path),
            Err(ConfigError::Json { .. })
        ));
    }
}
