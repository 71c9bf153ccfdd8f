//! BISSAP CLI - Gene Ontology annotation summarization from the command line.

mod commands;
mod config;
mod input;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bissap")]
#[command(author, version, about = "BISSAP - Summarize redundant GO annotations of a study set", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (debug logging; RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Inputs shared by every command that reads a study set.
#[derive(Args)]
pub struct StudyArgs {
    /// Study set: one element per line, first tab-separated column
    pub study: PathBuf,

    /// Ontology graph (JSON array of {id, name?, namespace?, is_a})
    #[arg(short, long)]
    pub graph: PathBuf,

    /// Annotation population (JSON object member -> [term ids])
    #[arg(short, long)]
    pub annotations: PathBuf,

    /// Overrepresented terms (JSON array of {term, fdr?}); defaults to every
    /// term annotating the study set
    #[arg(short, long)]
    pub candidates: Option<PathBuf>,

    /// Override the configured FDR threshold
    #[arg(long)]
    pub fdr: Option<f64>,

    /// Override the configured minimum coverage fraction
    #[arg(long)]
    pub min_coverage: Option<f64>,

    /// Restrict candidates to one namespace
    #[arg(long)]
    pub namespace: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new BISSAP project (writes bissap.toml)
    Init {
        /// Project directory (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Summarize the GO annotations of a study set
    Summarize {
        #[command(flatten)]
        study: StudyArgs,

        /// Background frequencies (JSON object term -> p); derived from the
        /// annotations when absent
        #[arg(short, long)]
        background: Option<PathBuf>,

        /// Skip redundancy pruning
        #[arg(long)]
        no_prune: bool,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show annotation and candidate statistics for a study set
    Inspect {
        #[command(flatten)]
        study: StudyArgs,

        /// Number of top candidates to list
        #[arg(short, long)]
        top: Option<usize>,

        /// Print the reports as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "bissap=debug,bissap_core=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Init { path } => commands::init::run(path),
        Commands::Summarize {
            study,
            background,
            no_prune,
            json,
        } => commands::summarize::run(&study, background.as_deref(), no_prune, json),
        Commands::Inspect { study, top, json } => commands::inspect::run(&study, top, json),
    }
}
