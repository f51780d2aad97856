use anyhow::{Context, Result};
use std::path::Path;
use syndex_state::hash_store::HashStore;
use tracing::info;

use super::{resolve_project, state_db_path};

pub fn run(repo_root: &Path, config_file: Option<&Path>) -> Result<()> {
    let ctx = resolve_project(repo_root, config_file)?;

    let db_path = state_db_path(&ctx);
    let already_initialized = db_path.exists();

    std::fs::create_dir_all(&ctx.data_dir).context("Failed to create data directory")?;

    // Opening the store creates the schema.
    let store = HashStore::open_with_config(
        &db_path,
        ctx.config.storage.retention_days,
        ctx.config.storage.busy_timeout_ms,
        ctx.config.storage.cache_size,
    )?;
    let tracked = store.entry_count(&ctx.project_id)?;

    if already_initialized {
        println!("Project already initialized:");
    } else {
        println!("Project initialized successfully!");
    }
    println!("  ID:            {}", ctx.project_id);
    println!("  Root:          {}", ctx.repo_root.display());
    println!("  Data dir:      {}", ctx.data_dir.display());
    println!("  Tracked files: {}", tracked);
    println!(
        "  Embedding:     {}",
        ctx.config.embedding.endpoint.as_deref().unwrap_or("(not configured)")
    );
    println!(
        "  Graph:         {}",
        ctx.config.graph.endpoint.as_deref().unwrap_or("(not configured)")
    );
    if !already_initialized {
        println!();
        println!("Next step: run `syndex sync` to sync your codebase.");
    }

    info!(
        project_id = %ctx.project_id,
        repo_root = %ctx.repo_root.display(),
        "Project initialized"
    );
    Ok(())
}
