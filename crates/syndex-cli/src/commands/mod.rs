pub mod check;
pub mod init;
pub mod sync;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use syndex_core::config::Config;
use syndex_core::constants;
use syndex_core::types::generate_project_id;
use syndex_engine::collaborators::{HttpEmbeddingClient, HttpGraphClient};
use syndex_engine::dispatch::{EmbeddingDispatcher, GraphDispatcher};
use syndex_engine::sync::SyncEngine;
use syndex_state::hash_store::HashStore;
use tracing::warn;

/// Resolved per-project context shared by every command.
pub(crate) struct ProjectContext {
    pub repo_root: PathBuf,
    pub project_id: String,
    pub config: Config,
    pub data_dir: PathBuf,
}

pub(crate) fn resolve_project(repo_root: &Path, config_file: Option<&Path>) -> Result<ProjectContext> {
    let repo_root = std::fs::canonicalize(repo_root).context("Failed to resolve project path")?;
    let config = Config::load_with_file(Some(&repo_root), config_file)?;
    let project_id = generate_project_id(&repo_root.to_string_lossy());
    let data_dir = config.project_data_dir(&project_id);
    Ok(ProjectContext {
        repo_root,
        project_id,
        config,
        data_dir,
    })
}

pub(crate) fn state_db_path(ctx: &ProjectContext) -> PathBuf {
    ctx.data_dir.join(constants::STATE_DB_FILE)
}

/// Assemble the sync engine from config. A collaborator whose client fails
/// to construct degrades to not-configured instead of aborting the command.
pub(crate) fn build_engine(ctx: &ProjectContext) -> Result<SyncEngine> {
    let store = HashStore::open_with_config(
        &state_db_path(ctx),
        ctx.config.storage.retention_days,
        ctx.config.storage.busy_timeout_ms,
        ctx.config.storage.cache_size,
    )?;

    let embeddings = match &ctx.config.embedding.endpoint {
        Some(endpoint) => {
            match HttpEmbeddingClient::new(
                endpoint,
                &ctx.config.embedding.model,
                ctx.config.embedding.timeout_ms,
            ) {
                Ok(client) => EmbeddingDispatcher::new(Arc::new(client)),
                Err(e) => {
                    warn!(error = %e, "Embedding client unavailable; continuing without it");
                    EmbeddingDispatcher::not_configured()
                }
            }
        }
        None => EmbeddingDispatcher::not_configured(),
    };

    let graph = match &ctx.config.graph.endpoint {
        Some(endpoint) => match HttpGraphClient::new(endpoint, ctx.config.graph.timeout_ms) {
            Ok(client) => GraphDispatcher::new(Arc::new(client)),
            Err(e) => {
                warn!(error = %e, "Graph client unavailable; continuing without it");
                GraphDispatcher::not_configured()
            }
        },
        None => GraphDispatcher::not_configured(),
    };

    Ok(SyncEngine::new(
        store,
        embeddings,
        graph,
        ctx.config.embedding.version.clone(),
        ctx.config.scan.max_file_size,
    ))
}
