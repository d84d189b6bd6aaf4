//! CLI command implementations.

use crate::config::{config_path, store_path, taxa_dir, TaxaConfig};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use taxa_core::TaxonRow;
use taxa_graph::{
    build_graph, load_graph_from_file, save_graph_to_file, GraphMerger, GraphStore, NodeRecord,
    RelationIndex, Source, TaxonGraph, TaxonQuery,
};
use thiserror::Error;
use tracing::debug;

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("{0} is not initialized, run `taxa init` first")]
    NotInitialized(PathBuf),
    #[error("no graph named \"{0}\" in the store")]
    GraphNotFound(String),
    #[error("merge needs exactly three sources, the config lists {0}")]
    SourceCount(usize),
    #[error("could not read snapshot {0}")]
    BadSnapshot(PathBuf),
}

/// Config and store of an initialized working path.
struct Workspace {
    config: TaxaConfig,
    store: GraphStore,
}

impl Workspace {
    fn open(root: &Path) -> Result<Self> {
        if !taxa_dir(root).is_dir() {
            return Err(CommandError::NotInitialized(root.to_path_buf()).into());
        }
        let config = TaxaConfig::load(root)?;
        let store = GraphStore::open(store_path(root))?;
        debug!(root = %root.display(), "workspace opened");
        Ok(Self { config, store })
    }

    fn graph(&self, name: &str) -> Result<TaxonGraph> {
        self.store
            .load_graph(name)
            .ok_or_else(|| CommandError::GraphNotFound(name.to_string()).into())
    }
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());
    Ok(spinner)
}

/// Initialize Taxa in a directory.
pub fn init(path: &Path) -> Result<()> {
    let dir = taxa_dir(path);

    if dir.exists() {
        println!("{} Already initialized", "✓".green());
        return Ok(());
    }

    fs::create_dir_all(&dir)?;
    let config = TaxaConfig::default();
    fs::write(config_path(path), serde_json::to_string_pretty(&config)?)?;

    println!("{} Initialized Taxa in {}", "✓".green(), path.display());
    println!(
        "  Run {} once per source, then {}",
        "taxa build".cyan(),
        "taxa merge".cyan()
    );

    Ok(())
}

/// Build a graph from a rows file and store it.
pub fn build(path: &Path, rows: &Path, name: &str) -> Result<()> {
    let ws = Workspace::open(path)?;

    let spinner = spinner("Reading rows...")?;
    let rows: Vec<TaxonRow> = serde_json::from_str(&fs::read_to_string(rows)?)?;
    spinner.set_message(format!("Building {} from {} rows...", name, rows.len()));
    let (graph, report) = build_graph(name, rows);
    ws.store.save_graph(name, &graph)?;
    spinner.finish_and_clear();

    println!(
        "{} Built {} ({} nodes, {} parent links, {} synonym links)",
        "✓".green(),
        name.cyan(),
        report.nodes.to_string().cyan(),
        report.hierarchy_links,
        report.synonym_links
    );
    if report.skipped_rows > 0 {
        println!(
            "  {} {} rows of unmodelled rank skipped",
            "⚠".yellow(),
            report.skipped_rows
        );
    }
    let unresolved = report.unresolved_parents + report.unresolved_synonyms;
    if unresolved > 0 {
        println!("  {} {} references left unresolved", "⚠".yellow(), unresolved);
    }

    Ok(())
}

/// Merge the configured sources into one stored graph.
pub fn merge(path: &Path, into: &str) -> Result<()> {
    let ws = Workspace::open(path)?;
    let sources = &ws.config.sources;
    if sources.len() != 3 {
        return Err(CommandError::SourceCount(sources.len()).into());
    }
    let a = ws.graph(&sources[0])?;
    let b = ws.graph(&sources[1])?;
    let c = ws.graph(&sources[2])?;

    let spinner = spinner("Merging sources...")?;
    let (merged, report) = GraphMerger::new(into).merge(
        Source::new(&sources[0], &a),
        Source::new(&sources[1], &b),
        Source::new(&sources[2], &c),
    );
    ws.store.save_graph(into, &merged)?;
    spinner.finish_and_clear();

    println!(
        "{} Merged {} into {} ({} nodes, {} relations, {} cross-source synonyms)",
        "✓".green(),
        sources.join(", "),
        into.cyan(),
        report.node_count.to_string().cyan(),
        report.relation_count,
        report.cross_source_links
    );
    if !report.duplicate_descriptors.is_empty() {
        println!(
            "\n{} descriptors shared between sources:",
            "⚠".yellow()
        );
        for descriptor in report.duplicate_descriptors.iter().take(5) {
            println!("  {}", descriptor.red());
        }
        if report.duplicate_descriptors.len() > 5 {
            println!("  ... and {} more", report.duplicate_descriptors.len() - 5);
        }
    }

    Ok(())
}

/// Export a stored graph as Turtle.
pub fn export(path: &Path, graph: &str, output: &Path, domain: Option<&str>) -> Result<()> {
    let ws = Workspace::open(path)?;
    let graph = ws.graph(graph)?;
    let relations = RelationIndex::new(&graph);
    let exporter = ws.config.exporter(domain);

    let spinner = spinner("Rendering slices...")?;
    let stats = exporter.export(&graph, &relations, output)?;
    spinner.finish_and_clear();

    println!(
        "{} Exported {} nodes in {} slices to {} ({}ms)",
        "✓".green(),
        stats.nodes.to_string().cyan(),
        stats.slices,
        output.display(),
        stats.duration_ms
    );

    Ok(())
}

/// Search a stored graph by name.
pub fn search(
    path: &Path,
    graph: &str,
    term: &str,
    limit: Option<usize>,
    exact: bool,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open(path)?;
    let graph = ws.graph(graph)?;
    let query = TaxonQuery::new(&graph);

    let records = if exact {
        query.named(term)
    } else {
        query.search(term, limit.unwrap_or(ws.config.search_limit))
    };
    if !json && records.is_empty() {
        println!("No matches found for \"{}\"", term);
        return Ok(());
    }
    print_records(&records, json)
}

/// List the synonyms of a taxon.
pub fn related(
    path: &Path,
    graph: &str,
    descriptor: &str,
    depth: Option<usize>,
    json: bool,
) -> Result<()> {
    let ws = Workspace::open(path)?;
    let graph = ws.graph(graph)?;
    let query = TaxonQuery::new(&graph);

    let records = query.related(descriptor, depth.unwrap_or(ws.config.closure_depth));
    if !json && records.is_empty() {
        println!("No synonyms found for {}", descriptor);
        return Ok(());
    }
    print_records(&records, json)
}

/// Show the upward path of a taxon.
pub fn hierarchy(path: &Path, graph: &str, descriptor: &str, json: bool) -> Result<()> {
    let ws = Workspace::open(path)?;
    let graph = ws.graph(graph)?;
    let query = TaxonQuery::new(&graph);

    let records = query.hierarchy(descriptor);
    if json {
        return print_records(&records, true);
    }
    if records.is_empty() {
        println!("No hierarchy found for {}", descriptor);
        return Ok(());
    }
    for (depth, record) in records.iter().rev().enumerate() {
        println!(
            "{}{} {}",
            "  ".repeat(depth),
            record.label.cyan(),
            format!("({})", record.descriptor).dimmed()
        );
    }
    Ok(())
}

fn print_records(records: &[NodeRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
        return Ok(());
    }

    println!("Found {} taxa:\n", records.len());
    for record in records {
        println!(
            "  {} {} {}",
            record.rank.as_deref().unwrap_or("?").yellow(),
            record.label.cyan(),
            format!("({})", record.descriptor).dimmed()
        );
        let notes: Vec<&str> = [record.status.as_deref(), record.provenance.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        if !notes.is_empty() {
            println!("    {}", notes.join(" · ").dimmed());
        }
    }
    Ok(())
}

/// Show stored graphs and their statistics.
pub fn status(path: &Path) -> Result<()> {
    let ws = Workspace::open(path)?;

    println!("{}", "Taxa Status".cyan().bold());
    println!();
    println!("  {} {}", "Domain:".dimmed(), ws.config.domain);
    println!("  {} {}", "Sources:".dimmed(), ws.config.sources.join(", "));

    let names = ws.store.names();
    if names.is_empty() {
        println!("\n  No graphs stored yet");
        return Ok(());
    }
    for name in names {
        let Some(graph) = ws.store.load_graph(&name) else {
            println!("\n  {} {}", name.red(), "(unreadable)".dimmed());
            continue;
        };
        let stats = graph.stats();
        println!();
        println!("  {}", name.cyan().bold());
        println!("    {} {}", "Nodes:".dimmed(), stats.node_count);
        println!("    {} {}", "Hierarchy edges:".dimmed(), stats.hierarchy_edges);
        println!("    {} {}", "Synonym edges:".dimmed(), stats.synonym_edges);
        if stats.duplicate_descriptors > 0 {
            println!(
                "    {} {}",
                "Shared descriptors:".dimmed(),
                stats.duplicate_descriptors.to_string().yellow()
            );
        }
    }

    Ok(())
}

/// Write a stored graph to a snapshot file.
pub fn dump(path: &Path, graph: &str, output: &Path) -> Result<()> {
    let ws = Workspace::open(path)?;
    let snapshot = ws.graph(graph)?;
    save_graph_to_file(&snapshot, output)?;

    println!(
        "{} Wrote {} to {}",
        "✓".green(),
        graph.cyan(),
        output.display()
    );
    Ok(())
}

/// Load a snapshot file into the store under `name`.
pub fn restore(path: &Path, file: &Path, name: &str) -> Result<()> {
    let ws = Workspace::open(path)?;
    let graph = load_graph_from_file(file)
        .ok_or_else(|| CommandError::BadSnapshot(file.to_path_buf()))?;
    ws.store.save_graph(name, &graph)?;

    println!(
        "{} Restored {} ({} nodes) from {}",
        "✓".green(),
        name.cyan(),
        graph.node_count(),
        file.display()
    );
    Ok(())
}
