//! SKOS/Turtle export.
//!
//! Nodes are cut into fixed-size slices which are rendered in parallel on a
//! bounded worker pool. Workers only read the graph and the relation index
//! and each returns its own string; the slices are joined in slice order,
//! so the output does not depend on scheduling.

use crate::graph::TaxonGraph;
use crate::relation_index::RelationIndex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use taxa_core::{Node, SCHEMA_IN_SCHEME};
use thiserror::Error;
use tracing::{debug, info};

/// Nodes rendered per worker task.
pub const DEFAULT_SLICE_CAPACITY: usize = 100_000;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Summary of a finished export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportStats {
    pub nodes: usize,
    pub slices: usize,
    pub bytes: usize,
    pub duration_ms: u64,
}

/// Renders a graph as Turtle using a bounded pool of workers.
#[derive(Debug, Clone)]
pub struct ConcurrentExporter {
    domain: String,
    slice_capacity: usize,
    workers: usize,
}

impl ConcurrentExporter {
    /// Creates an exporter for `domain` with default slicing and one worker
    /// per CPU.
    pub fn new(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            slice_capacity: DEFAULT_SLICE_CAPACITY,
            workers: num_cpus::get(),
        }
    }

    pub fn with_slice_capacity(mut self, capacity: usize) -> Self {
        self.slice_capacity = capacity.max(1);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Prefix declarations and the concept scheme declarations.
    pub fn header(&self) -> String {
        let d = &self.domain;
        let mut out = String::new();
        out.push_str("@prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n");
        out.push_str("@prefix skos: <http://www.w3.org/2004/02/skos/core#> .\n");
        out.push_str(&format!("@prefix {d}: <http://www.{d}.com/> .\n\n"));
        for scheme in ["kingdom", "family", "species", "genus"] {
            out.push_str(&format!(
                "{d}:{scheme} rdf:type skos:ConceptScheme; skos:prefLabel \"{scheme}\" .\n"
            ));
        }
        out
    }

    /// Renders one node block.
    pub fn render_node(&self, node: &Node, relations: &RelationIndex<'_>) -> String {
        let d = &self.domain;
        let mut lines: Vec<String> = Vec::new();
        for attribute in node.attributes() {
            let literal = sanitize_literal(&attribute.literal);
            if attribute.schema == SCHEMA_IN_SCHEME {
                lines.push(format!("  {} {d}:{literal}", attribute.schema));
            } else {
                lines.push(format!("  {} \"{literal}\"", attribute.schema));
            }
        }
        for relation in relations.outgoing(&node.descriptor) {
            lines.push(format!("  {} {d}:{}", relation.label, relation.end));
        }

        let mut block = format!("{d}:{} rdf:type skos:Concept", node.descriptor);
        if lines.is_empty() {
            block.push_str(" .\n\n");
            return block;
        }
        block.push_str(";\n");
        block.push_str(&lines.join(";\n"));
        block.push_str(".\n\n");
        block
    }

    /// Renders a run of nodes, one block after another.
    pub fn render_slice(&self, nodes: &[Node], relations: &RelationIndex<'_>) -> String {
        let mut out = String::new();
        for node in nodes {
            out.push_str(&self.render_node(node, relations));
        }
        out
    }

    /// Renders every slice on the worker pool and returns them in slice
    /// order.
    pub fn render_slices(
        &self,
        graph: &TaxonGraph,
        relations: &RelationIndex<'_>,
    ) -> Result<Vec<String>, ExportError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("taxa-export-{}", i))
            .build()?;

        debug!(
            nodes = graph.node_count(),
            capacity = self.slice_capacity,
            workers = self.workers,
            "rendering slices"
        );
        let slices: Vec<String> = pool.install(|| {
            graph
                .nodes()
                .par_chunks(self.slice_capacity)
                .map(|slice| self.render_slice(slice, relations))
                .collect()
        });
        Ok(slices)
    }

    /// Renders the whole document into memory.
    pub fn render(
        &self,
        graph: &TaxonGraph,
        relations: &RelationIndex<'_>,
    ) -> Result<String, ExportError> {
        let mut out = self.header();
        for slice in self.render_slices(graph, relations)? {
            out.push_str(&slice);
        }
        Ok(out)
    }

    /// Writes the document to `path`.
    pub fn export<P: AsRef<Path>>(
        &self,
        graph: &TaxonGraph,
        relations: &RelationIndex<'_>,
        path: P,
    ) -> Result<ExportStats, ExportError> {
        let start = Instant::now();
        let slices = self.render_slices(graph, relations)?;

        let header = self.header();
        let mut writer = BufWriter::new(File::create(path.as_ref())?);
        writer.write_all(header.as_bytes())?;
        let mut bytes = header.len();
        for slice in &slices {
            writer.write_all(slice.as_bytes())?;
            bytes += slice.len();
        }
        writer.flush()?;

        let stats = ExportStats {
            nodes: graph.node_count(),
            slices: slices.len(),
            bytes,
            duration_ms: start.elapsed().as_millis() as u64,
        };
        info!(
            path = %path.as_ref().display(),
            nodes = stats.nodes,
            slices = stats.slices,
            bytes = stats.bytes,
            "export written"
        );
        Ok(stats)
    }
}

/// Strips characters that would break the quoted literal.
fn sanitize_literal(literal: &str) -> String {
    literal.chars().filter(|c| !matches!(c, '-' | '"')).collect()
}
