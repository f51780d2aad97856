use anyhow::Result;
use std::path::Path;
use syndex_core::types::SyncOptions;
use tracing::info;

use super::{build_engine, resolve_project};

pub struct SyncArgs {
    pub force: bool,
    pub no_embeddings: bool,
    pub no_graph: bool,
    pub exclude: Vec<String>,
    pub include: Vec<String>,
}

pub fn run(repo_root: &Path, config_file: Option<&Path>, args: SyncArgs) -> Result<()> {
    let ctx = resolve_project(repo_root, config_file)?;
    let mut engine = build_engine(&ctx)?;

    // Command-line globs stack on top of the configured ones.
    let mut exclude_patterns = ctx.config.scan.exclude_patterns.clone();
    exclude_patterns.extend(args.exclude);
    let mut include_patterns = ctx.config.scan.include_patterns.clone();
    include_patterns.extend(args.include);

    let options = SyncOptions {
        force_full_sync: args.force,
        update_embeddings: !args.no_embeddings,
        update_graph: !args.no_graph,
        exclude_patterns,
        include_patterns,
    };

    println!(
        "Syncing {} (mode: {}) ...",
        ctx.repo_root.display(),
        if args.force { "full" } else { "incremental" }
    );
    let result = engine.sync_project(&ctx.project_id, &ctx.repo_root, &options)?;

    println!();
    println!("Sync complete ({})", result.strategy.as_str());
    println!("  Total files:   {}", result.total_files);
    println!("  New files:     {}", result.new_files);
    println!("  Changed files: {}", result.changed_files);
    println!("  Deleted files: {}", result.deleted_files);
    println!("  Embeddings:    {}", result.updated_embeddings);
    println!("  Graph nodes:   {}", result.updated_graph_nodes);
    println!("  Duration:      {:.1}s", result.duration_ms as f64 / 1000.0);

    info!(
        project_id = %ctx.project_id,
        strategy = result.strategy.as_str(),
        changed_files = result.changed_files,
        "Sync command complete"
    );
    Ok(())
}
