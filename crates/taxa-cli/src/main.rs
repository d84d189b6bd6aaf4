//! Taxa CLI - Command-line interface for Taxa
//!
//! This is the main entry point for users interacting with Taxa.
//! It provides commands for building, merging, querying and exporting
//! taxonomic graphs.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "taxa")]
#[command(author = "Taxa Contributors")]
#[command(version)]
#[command(about = "Merge, query and export taxonomic knowledge graphs", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Working path holding the .taxa directory
    #[arg(short = 'C', long, global = true, default_value = ".")]
    path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Taxa in the working path
    Init,

    /// Build a graph from a JSON array of taxon rows
    Build {
        /// Rows file
        #[arg(short, long)]
        rows: PathBuf,

        /// Name to store the graph under
        #[arg(short, long)]
        name: String,
    },

    /// Merge the configured source graphs into one
    Merge {
        /// Name to store the merged graph under
        #[arg(long, default_value = "merged")]
        into: String,
    },

    /// Export a graph as SKOS Turtle
    Export {
        /// Graph to export
        #[arg(short, long, default_value = "merged")]
        graph: String,

        /// Output file
        #[arg(short, long, default_value = "out.ttl")]
        output: PathBuf,

        /// Namespace prefix (overrides the config)
        #[arg(long)]
        domain: Option<String>,
    },

    /// Find taxa whose name starts with a term
    Search {
        term: String,

        #[arg(short, long, default_value = "merged")]
        graph: String,

        /// Maximum results (defaults to the config)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Match the whole name exactly
        #[arg(long)]
        exact: bool,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// List synonyms of a taxon
    Related {
        descriptor: String,

        #[arg(short, long, default_value = "merged")]
        graph: String,

        /// Synonym hops to follow (defaults to the config)
        #[arg(short, long)]
        depth: Option<usize>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the path from a taxon up to its kingdom
    Hierarchy {
        descriptor: String,

        #[arg(short, long, default_value = "merged")]
        graph: String,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show stored graphs and their statistics
    Status,

    /// Write a stored graph to a snapshot file
    Dump {
        #[arg(short, long)]
        graph: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Load a snapshot file into the store
    Restore {
        file: PathBuf,

        #[arg(short, long)]
        name: String,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    let path = cli.path;
    let result = match cli.command {
        Commands::Init => commands::init(&path),
        Commands::Build { rows, name } => commands::build(&path, &rows, &name),
        Commands::Merge { into } => commands::merge(&path, &into),
        Commands::Export {
            graph,
            output,
            domain,
        } => commands::export(&path, &graph, &output, domain.as_deref()),
        Commands::Search {
            term,
            graph,
            limit,
            exact,
            json,
        } => commands::search(&path, &graph, &term, limit, exact, json),
        Commands::Related {
            descriptor,
            graph,
            depth,
            json,
        } => commands::related(&path, &graph, &descriptor, depth, json),
        Commands::Hierarchy {
            descriptor,
            graph,
            json,
        } => commands::hierarchy(&path, &graph, &descriptor, json),
        Commands::Status => commands::status(&path),
        Commands::Dump { graph, output } => commands::dump(&path, &graph, &output),
        Commands::Restore { file, name } => commands::restore(&path, &file, &name),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
