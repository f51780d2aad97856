mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "syndex",
    version,
    about = "Incremental sync of source trees into derived knowledge stores",
    long_about = "Syndex keeps derived stores (vector embeddings, relationship graph) in step\n\
        with a source tree. It hashes every source file, compares against a durable\n\
        per-project hash cache, and dispatches only the files that actually changed.\n\n\
        Quick start:\n  \
        syndex init\n  \
        syndex sync\n  \
        syndex check"
)]
struct Cli {
    /// Enable verbose logging (set log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (default: .syndex/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize syndex for a project
    ///
    /// Creates the per-project data directory and the SQLite hash store
    /// under ~/.syndex/data/.
    ///
    /// Example: syndex init --path /path/to/project
    Init {
        /// Path to the project root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },
    /// Run a sync pass over the project tree
    ///
    /// Scans source files, classifies them against the hash store, and
    /// dispatches added/modified files to the configured embedding and
    /// graph services. Only changed files are reprocessed.
    ///
    /// Examples:
    ///   syndex sync
    ///   syndex sync --force
    ///   syndex sync --no-graph --exclude "vendor/**"
    Sync {
        /// Path to the project root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,

        /// Force full re-sync, ignoring stored hashes (computes no deletions)
        #[arg(long)]
        force: bool,

        /// Skip the embedding service for this pass
        #[arg(long)]
        no_embeddings: bool,

        /// Skip the graph service for this pass
        #[arg(long)]
        no_graph: bool,

        /// Extra exclude glob (repeatable), applied on top of config
        #[arg(long = "exclude")]
        exclude: Vec<String>,

        /// Include glob (repeatable); when set, only matching files are scanned
        #[arg(long = "include")]
        include: Vec<String>,
    },
    /// Probe whether the project is likely out of sync
    ///
    /// Hashes a small sample of files (biased toward entry points like
    /// main.* and index.*) and compares against the hash store. Also runs
    /// a SQLite integrity check on the store itself.
    ///
    /// Example: syndex check
    Check {
        /// Path to the project root (default: current directory)
        #[arg(short, long)]
        path: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_file = cli.config.as_deref().map(std::path::Path::new);

    match cli.command {
        Commands::Init { path } => {
            let path = resolve_path(path)?;
            commands::init::run(&path, config_file)?;
        }
        Commands::Sync {
            path,
            force,
            no_embeddings,
            no_graph,
            exclude,
            include,
        } => {
            let path = resolve_path(path)?;
            commands::sync::run(
                &path,
                config_file,
                commands::sync::SyncArgs {
                    force,
                    no_embeddings,
                    no_graph,
                    exclude,
                    include,
                },
            )?;
        }
        Commands::Check { path } => {
            let path = resolve_path(path)?;
            commands::check::run(&path, config_file)?;
        }
    }

    Ok(())
}

fn resolve_path(path: Option<String>) -> anyhow::Result<std::path::PathBuf> {
    match path {
        Some(p) => Ok(std::path::PathBuf::from(p)),
        None => Ok(std::env::current_dir()?),
    }
}
