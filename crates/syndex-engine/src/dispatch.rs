use rayon::prelude::*;
use std::path::Path;
use std::sync::Arc;
use syndex_core::error::DispatchError;
use syndex_core::types::FileRecord;
use tracing::{debug, warn};

/// Properties for a graph file-node upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNodeProps {
    /// Absolute identity of the file.
    pub identity: String,
    /// Project-relative identity.
    pub relative_identity: String,
    /// Filesystem mtime in unix seconds, when known.
    pub last_modified: Option<i64>,
}

/// Embedding collaborator boundary. The core needs exactly one call per
/// changed file plus a path-keyed cleanup; vector storage and versioning
/// stay on the collaborator's side.
pub trait EmbeddingClient: Send + Sync {
    fn generate_embedding(&self, text: &str, identity: &str) -> Result<Vec<f32>, DispatchError>;
    fn remove_embeddings(&self, paths: &[String]) -> Result<(), DispatchError>;
}

/// Graph collaborator boundary.
pub trait GraphClient: Send + Sync {
    fn upsert_node(&self, type_tag: &str, props: &FileNodeProps) -> Result<String, DispatchError>;
    fn remove_nodes(&self, paths: &[String]) -> Result<(), DispatchError>;
}

const FILE_NODE_TAG: &str = "File";

/// Updater feeding changed files to the embedding service.
///
/// Independently optional: without a configured client every call degrades
/// to zero processed with a warning, and per-file failures are logged and
/// skipped so one bad file never stops the rest of the batch. The returned
/// count is reporting-only; hash-store persistence does not depend on it.
pub struct EmbeddingDispatcher {
    client: Option<Arc<dyn EmbeddingClient>>,
}

impl EmbeddingDispatcher {
    pub fn new(client: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn not_configured() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Re-embed the changed files, returning how many succeeded.
    pub fn process(&self, root: &Path, changed: &[FileRecord]) -> usize {
        let Some(client) = &self.client else {
            warn!("Embedding service not configured; skipping embedding update");
            return 0;
        };
        if changed.is_empty() {
            return 0;
        }

        let processed = changed
            .par_iter()
            .filter(|record| embed_one(client.as_ref(), root, record))
            .count();
        debug!(processed, total = changed.len(), "Embedding dispatch done");
        processed
    }

    /// Drop embeddings for deleted paths. Failures are logged and swallowed.
    pub fn cleanup(&self, deleted: &[String]) {
        let Some(client) = &self.client else {
            return;
        };
        if deleted.is_empty() {
            return;
        }
        if let Err(e) = client.remove_embeddings(deleted) {
            warn!(error = %e, count = deleted.len(), "Embedding cleanup failed");
        }
    }
}

fn embed_one(client: &dyn EmbeddingClient, root: &Path, record: &FileRecord) -> bool {
    let full_path = root.join(&record.path);
    let text = match std::fs::read_to_string(&full_path) {
        Ok(text) => text,
        Err(e) => {
            warn!(path = %record.path, error = %e, "Skipping embedding for unreadable file");
            return false;
        }
    };
    match client.generate_embedding(&text, &record.path) {
        Ok(_) => true,
        Err(e) => {
            warn!(path = %record.path, error = %e, "Embedding failed for file");
            false
        }
    }
}

/// Updater mirroring changed files into the relationship graph. Same
/// degrade-and-continue policy as the embedding dispatcher.
pub struct GraphDispatcher {
    client: Option<Arc<dyn GraphClient>>,
}

impl GraphDispatcher {
    pub fn new(client: Arc<dyn GraphClient>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn not_configured() -> Self {
        Self { client: None }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Upsert a node per changed file, returning how many succeeded.
    pub fn process(&self, root: &Path, changed: &[FileRecord]) -> usize {
        let Some(client) = &self.client else {
            warn!("Graph service not configured; skipping graph update");
            return 0;
        };
        if changed.is_empty() {
            return 0;
        }

        let processed = changed
            .par_iter()
            .filter(|record| {
                let props = FileNodeProps {
                    identity: root.join(&record.path).to_string_lossy().to_string(),
                    relative_identity: record.path.clone(),
                    last_modified: record.last_modified,
                };
                match client.upsert_node(FILE_NODE_TAG, &props) {
                    Ok(_) => true,
                    Err(e) => {
                        warn!(path = %record.path, error = %e, "Graph upsert failed for file");
                        false
                    }
                }
            })
            .count();
        debug!(processed, total = changed.len(), "Graph dispatch done");
        processed
    }

    /// Remove nodes for deleted paths. Failures are logged and swallowed.
    pub fn cleanup(&self, deleted: &[String]) {
        let Some(client) = &self.client else {
            return;
        };
        if deleted.is_empty() {
            return;
        }
        if let Err(e) = client.remove_nodes(deleted) {
            warn!(error = %e, count = deleted.len(), "Graph cleanup failed");
        }
    }
}
