//! CLI entry point (spec §6). Subcommands mirror the `index`/`materialize`
//! split in the orchestrator: `index` runs Pass 1 through linking and
//! writes the cache database, `materialize` reads that cache, applies any
//! override flags, and writes the graph store.

use clap::{Parser, Subcommand};
use codegraph_index::config::model::{ImportStrategy, ProjectConfig};
use codegraph_index::materializer::Neo4jDriver;
use codegraph_index::orchestrator::Pipeline;
use codegraph_index::PipelineError;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Multi-language code knowledge graph indexer
#[derive(Parser)]
#[command(name = "codegraph-index", version, about = "Index code and write a symbol/reference graph")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan, parse, resolve, scan config metadata, and cross-language link
    Index {
        /// Path to the project config YAML file
        config: PathBuf,
    },
    /// Write the cached symbol/reference graph into the configured graph store
    Materialize {
        /// Path to the project config YAML file
        config: PathBuf,

        /// Overrides `graph.endpoint`
        #[arg(long)]
        graph_endpoint: Option<String>,

        /// Overrides `graph.wipe_before_import`
        #[arg(long)]
        wipe: Option<bool>,

        /// Overrides `import.strategy` (direct-bulk | parallel-bulk | file-dump)
        #[arg(long)]
        strategy: Option<String>,

        /// Overrides `import.parallel_workers`
        #[arg(long)]
        parallel_workers: Option<usize>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "codegraph-index: fatal error");
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn run() -> Result<(), PipelineError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Index { config } => {
            let config = ProjectConfig::load_from_file(&config).map_err(PipelineError::Other)?;
            let pipeline = Pipeline::new(config);
            let summary = pipeline.index()?;
            println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        }
        Commands::Materialize { config, graph_endpoint, wipe, strategy, parallel_workers } => {
            let mut config = ProjectConfig::load_from_file(&config).map_err(PipelineError::Other)?;
            if let Some(endpoint) = graph_endpoint {
                config.graph.endpoint = endpoint;
            }
            if let Some(wipe) = wipe {
                config.graph.wipe_before_import = wipe;
            }
            if let Some(strategy) = strategy {
                config.import.strategy = parse_strategy(&strategy).map_err(PipelineError::ConfigInvalid)?;
            }
            if let Some(workers) = parallel_workers {
                config.import.parallel_workers = workers;
            }

            let driver = Neo4jDriver::connect(&config.graph)?;
            let pipeline = Pipeline::new(config);
            let summary = pipeline.materialize(&driver)?;
            println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
        }
    }
    Ok(())
}

fn parse_strategy(s: &str) -> Result<ImportStrategy, String> {
    match s {
        "direct-bulk" => Ok(ImportStrategy::DirectBulk),
        "parallel-bulk" => Ok(ImportStrategy::ParallelBulk),
        "file-dump" => Ok(ImportStrategy::FileDump),
        other => Err(format!("unknown import.strategy override: {other}")),
    }
}
