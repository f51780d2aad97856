use serde::{Deserialize, Serialize};

/// One tracked source file, as observed by a single scan pass.
///
/// Records are ephemeral: the scanner builds them fresh on every run and the
/// hash store persists a string-field projection of the ones that survive a
/// pass. `path` is the stable identity key, always relative to the scan root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    /// Hex digest of the raw file bytes. The definitive change signal.
    pub content_hash: String,
    /// Hex digest of the sorted extracted declaration signatures. Advisory:
    /// carried for downstream consumers, never consulted by classification.
    pub structural_hash: String,
    pub size_bytes: u64,
    /// Filesystem mtime in unix seconds. Informational only, never used to
    /// decide change status.
    pub last_modified: Option<i64>,
    /// Engine-assigned timestamp of the last successful processing.
    pub last_synced: Option<String>,
    /// Tag of the embedding-model generation that produced any associated
    /// vector. A version bump alone forces reprocessing.
    pub embedding_version: String,
}

impl FileRecord {
    /// Two records are equivalent when path, content hash, and embedding
    /// version all match; every other field is ignored.
    pub fn is_equivalent(&self, other: &FileRecord) -> bool {
        self.path == other.path
            && self.content_hash == other.content_hash
            && self.embedding_version == other.embedding_version
    }
}

/// The added/modified/deleted/unchanged partition produced by one
/// classification pass. Produced fresh every pass, consumed once, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub added: Vec<FileRecord>,
    pub modified: Vec<FileRecord>,
    pub deleted: Vec<String>,
    pub unchanged_count: usize,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.deleted.is_empty()
    }

    /// Union of added and modified records, the input to both dispatchers.
    pub fn changed_files(&self) -> Vec<FileRecord> {
        let mut files = Vec::with_capacity(self.added.len() + self.modified.len());
        files.extend(self.added.iter().cloned());
        files.extend(self.modified.iter().cloned());
        files
    }
}

/// Strategy label reported in a sync summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStrategy {
    NoChanges,
    Incremental,
    FullSync,
}

impl SyncStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoChanges => "no-changes",
            Self::Incremental => "incremental",
            Self::FullSync => "full-sync",
        }
    }
}

impl std::fmt::Display for SyncStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable summary of one completed sync pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub total_files: usize,
    pub changed_files: usize,
    pub deleted_files: usize,
    pub new_files: usize,
    pub updated_embeddings: usize,
    pub updated_graph_nodes: usize,
    pub duration_ms: u64,
    pub strategy: SyncStrategy,
}

/// Caller-supplied options for a sync pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Bypass the hash store comparison: every scanned file classifies as
    /// added and no deletions are computed. Files removed from disk before a
    /// forced full sync are therefore never cleaned up; a known limitation
    /// kept for compatibility.
    pub force_full_sync: bool,
    pub update_embeddings: bool,
    pub update_graph: bool,
    pub exclude_patterns: Vec<String>,
    pub include_patterns: Vec<String>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            force_full_sync: false,
            update_embeddings: true,
            update_graph: true,
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

/// Generate a stable project ID from a repo root path.
/// Uses blake3 hash of the canonical path, truncated to 16 hex characters.
pub fn generate_project_id(repo_root: &str) -> String {
    let canonical =
        std::fs::canonicalize(repo_root).unwrap_or_else(|_| std::path::PathBuf::from(repo_root));
    let hash = blake3::hash(canonical.to_string_lossy().as_bytes());
    hash.to_hex()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(path: &str, content_hash: &str, version: &str) -> FileRecord {
        FileRecord {
            path: path.to_string(),
            content_hash: content_hash.to_string(),
            structural_hash: "structural".to_string(),
            size_bytes: 10,
            last_modified: Some(1_700_000_000),
            last_synced: None,
            embedding_version: version.to_string(),
        }
    }

    #[test]
    fn equivalence_ignores_mtime_and_structural_hash() {
        let a = record("src/lib.rs", "h1", "v1");
        let mut b = a.clone();
        b.last_modified = Some(1_800_000_000);
        b.structural_hash = "different".to_string();
        b.size_bytes = 999;
        assert!(a.is_equivalent(&b));
    }

    #[test]
    fn equivalence_requires_matching_embedding_version() {
        let a = record("src/lib.rs", "h1", "v1");
        let b = record("src/lib.rs", "h1", "v2");
        assert!(!a.is_equivalent(&b));
    }

    #[test]
    fn changeset_empty_ignores_unchanged_count() {
        let set = ChangeSet {
            unchanged_count: 42,
            ..Default::default()
        };
        assert!(set.is_empty());
    }

    #[test]
    fn changed_files_is_added_then_modified() {
        let set = ChangeSet {
            added: vec![record("a.rs", "h1", "v1")],
            modified: vec![record("b.rs", "h2", "v1")],
            deleted: vec!["c.rs".to_string()],
            unchanged_count: 0,
        };
        let changed = set.changed_files();
        assert_eq!(changed.len(), 2);
        assert_eq!(changed[0].path, "a.rs");
        assert_eq!(changed[1].path, "b.rs");
    }

    #[test]
    fn strategy_labels_are_stable() {
        assert_eq!(SyncStrategy::NoChanges.as_str(), "no-changes");
        assert_eq!(SyncStrategy::Incremental.as_str(), "incremental");
        assert_eq!(SyncStrategy::FullSync.as_str(), "full-sync");
    }

    #[test]
    fn default_options_enable_both_dispatchers() {
        let opts = SyncOptions::default();
        assert!(opts.update_embeddings);
        assert!(opts.update_graph);
        assert!(!opts.force_full_sync);
    }

    #[test]
    fn project_id_is_16_hex_and_deterministic() {
        let id = generate_project_id("/some/missing/path");
        assert_eq!(id.len(), 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(id, generate_project_id("/some/missing/path"));
    }
}
