use rand::seq::SliceRandom;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::time::Instant;
use syndex_core::constants::{ENTRY_POINT_PREFIXES, QUICK_CHECK_SAMPLE_SIZE};
use syndex_core::error::SyncError;
use syndex_core::time::now_iso8601;
use syndex_core::types::{FileRecord, SyncOptions, SyncResult, SyncStrategy};
use syndex_state::hash_store::HashStore;
use tracing::{debug, info, warn};

use crate::classifier;
use crate::dispatch::{EmbeddingDispatcher, GraphDispatcher};
use crate::scanner::{self, ScanFilter};

/// Orchestrates a sync pass: scan, classify, dispatch, persist, report.
///
/// The hash store is the only authority on what changed. Downstream
/// dispatchers are reporting-only: their failures never abort a pass and
/// never prevent the scanned hashes from being persisted, so a file that
/// failed to embed is not retried until its content actually changes.
pub struct SyncEngine {
    store: HashStore,
    embeddings: EmbeddingDispatcher,
    graph: GraphDispatcher,
    embedding_version: String,
    max_file_size: u64,
}

impl SyncEngine {
    pub fn new(
        store: HashStore,
        embeddings: EmbeddingDispatcher,
        graph: GraphDispatcher,
        embedding_version: impl Into<String>,
        max_file_size: u64,
    ) -> Self {
        Self {
            store,
            embeddings,
            graph,
            embedding_version: embedding_version.into(),
            max_file_size,
        }
    }

    /// Run one sync pass for `project_id` over the tree at `root`.
    ///
    /// Fatal errors are an invalid root, an invalid filter pattern, or a
    /// failed hash store write. A failed hash store read degrades to an empty
    /// baseline (everything reclassifies as added), because re-dispatching is
    /// safe and a half-read baseline would silently miss deletions.
    pub fn sync_project(
        &mut self,
        project_id: &str,
        root: &Path,
        options: &SyncOptions,
    ) -> Result<SyncResult, SyncError> {
        let start = Instant::now();
        info!(
            project_id,
            root = %root.display(),
            force_full_sync = options.force_full_sync,
            "Starting sync pass"
        );

        let filter = ScanFilter::new(&options.include_patterns, &options.exclude_patterns)?;
        let current = scanner::scan_tree(root, &filter, self.max_file_size, &self.embedding_version)?;

        let known = match self.store.get_all(project_id) {
            Ok(known) => known,
            Err(e) => {
                warn!(error = %e, "Hash store read failed; treating every file as new");
                HashMap::new()
            }
        };

        let change_set = classifier::classify(&current, &known, options.force_full_sync);

        if change_set.is_empty() {
            info!(total_files = current.len(), "No changes detected");
            return Ok(SyncResult {
                total_files: current.len(),
                changed_files: 0,
                deleted_files: 0,
                new_files: 0,
                updated_embeddings: 0,
                updated_graph_nodes: 0,
                duration_ms: start.elapsed().as_millis() as u64,
                strategy: SyncStrategy::NoChanges,
            });
        }

        debug!(
            added = change_set.added.len(),
            modified = change_set.modified.len(),
            deleted = change_set.deleted.len(),
            unchanged = change_set.unchanged_count,
            "Change classification done"
        );

        let changed = change_set.changed_files();
        let (updated_embeddings, updated_graph_nodes) = {
            let embeddings = &self.embeddings;
            let graph = &self.graph;
            rayon::join(
                || {
                    if options.update_embeddings {
                        embeddings.process(root, &changed)
                    } else {
                        0
                    }
                },
                || {
                    if options.update_graph {
                        graph.process(root, &changed)
                    } else {
                        0
                    }
                },
            )
        };

        if !change_set.deleted.is_empty() {
            if options.update_embeddings {
                self.embeddings.cleanup(&change_set.deleted);
            }
            if options.update_graph {
                self.graph.cleanup(&change_set.deleted);
            }
        }

        // Persist only after dispatch so a crash mid-pass re-dispatches the
        // same files next time instead of silently dropping them.
        let now = now_iso8601();
        let mut to_persist = changed;
        for record in &mut to_persist {
            record.last_synced = Some(now.clone());
        }
        self.store.set_many(project_id, &to_persist)?;
        self.store.delete_many(project_id, &change_set.deleted)?;

        let strategy = if options.force_full_sync {
            self.store.record_last_full_scan(project_id, &now)?;
            SyncStrategy::FullSync
        } else {
            SyncStrategy::Incremental
        };

        let result = SyncResult {
            total_files: current.len(),
            changed_files: to_persist.len(),
            deleted_files: change_set.deleted.len(),
            new_files: change_set.added.len(),
            updated_embeddings,
            updated_graph_nodes,
            duration_ms: start.elapsed().as_millis() as u64,
            strategy,
        };
        info!(
            total_files = result.total_files,
            changed_files = result.changed_files,
            deleted_files = result.deleted_files,
            updated_embeddings = result.updated_embeddings,
            updated_graph_nodes = result.updated_graph_nodes,
            duration_ms = result.duration_ms,
            strategy = strategy.as_str(),
            "Sync pass complete"
        );
        Ok(result)
    }

    /// Cheap staleness probe: hash a small sample of files, biased toward
    /// entry-point names, and compare against the stored state.
    ///
    /// `filter` must carry the same include/exclude patterns the sync passes
    /// run with; files the sync never tracks would otherwise sample as
    /// permanently "added". Returns `true` when any sampled file is new or
    /// modified. Deletions are not detectable from a sample and are
    /// deliberately ignored; a `false` here means "probably in sync", never
    /// a guarantee.
    pub fn quick_sync_check(
        &self,
        project_id: &str,
        root: &Path,
        filter: &ScanFilter,
    ) -> Result<bool, SyncError> {
        let paths = scanner::list_source_files(root, filter, self.max_file_size)?;
        if paths.is_empty() {
            return Ok(false);
        }

        let sample = sample_paths(&paths);
        let records = scanner::scan_paths(root, &sample, &self.embedding_version);

        let known = match self.store.get_all(project_id) {
            Ok(known) => known,
            Err(e) => {
                warn!(error = %e, "Hash store read failed during quick check");
                HashMap::new()
            }
        };
        let sampled: HashSet<&str> = sample.iter().map(String::as_str).collect();
        let known: HashMap<String, FileRecord> = known
            .into_iter()
            .filter(|(path, _)| sampled.contains(path.as_str()))
            .collect();

        let change_set = classifier::classify(&records, &known, false);
        let stale = !change_set.added.is_empty() || !change_set.modified.is_empty();
        debug!(
            sampled = sample.len(),
            added = change_set.added.len(),
            modified = change_set.modified.len(),
            stale,
            "Quick sync check done"
        );
        Ok(stale)
    }

    /// Timestamp of the last recorded full scan, if any.
    pub fn last_full_scan(&self, project_id: &str) -> Result<Option<String>, SyncError> {
        Ok(self.store.last_full_scan(project_id)?)
    }

    /// Number of live hash entries tracked for the project.
    pub fn tracked_file_count(&self, project_id: &str) -> Result<u64, SyncError> {
        Ok(self.store.entry_count(project_id)?)
    }

    /// Integrity check over the backing hash store. `None` means healthy.
    pub fn store_integrity(&self) -> Result<Option<String>, SyncError> {
        Ok(self.store.integrity_check()?)
    }
}

/// Pick up to [`QUICK_CHECK_SAMPLE_SIZE`] paths, entry-point names first,
/// topped up with a random draw from the rest.
fn sample_paths(paths: &[String]) -> Vec<String> {
    let mut sample = Vec::new();
    let mut rest = Vec::new();
    for path in paths {
        if has_entry_point_name(path) && sample.len() < QUICK_CHECK_SAMPLE_SIZE {
            sample.push(path.clone());
        } else {
            rest.push(path.clone());
        }
    }
    if sample.len() < QUICK_CHECK_SAMPLE_SIZE {
        rest.shuffle(&mut rand::rng());
        sample.extend(
            rest.into_iter()
                .take(QUICK_CHECK_SAMPLE_SIZE - sample.len()),
        );
    }
    sample
}

fn has_entry_point_name(path: &str) -> bool {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_name.split('.').next().unwrap_or(file_name);
    let stem = stem.to_ascii_lowercase();
    ENTRY_POINT_PREFIXES
        .iter()
        .any(|prefix| stem.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::test_support::{FakeEmbeddingClient, FakeGraphClient};
    use std::fs;
    use std::sync::Arc;
    use syndex_core::constants::MAX_FILE_SIZE;

    fn write_project(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(&full, content).unwrap();
        }
        dir
    }

    struct Harness {
        engine: SyncEngine,
        embedding: Arc<FakeEmbeddingClient>,
        graph: Arc<FakeGraphClient>,
    }

    fn harness() -> Harness {
        harness_with(FakeEmbeddingClient::new(), "v1")
    }

    fn harness_with(embedding_client: FakeEmbeddingClient, version: &str) -> Harness {
        let embedding = Arc::new(embedding_client);
        let graph = Arc::new(FakeGraphClient::new());
        let engine = SyncEngine::new(
            HashStore::open_in_memory(14).unwrap(),
            EmbeddingDispatcher::new(embedding.clone()),
            GraphDispatcher::new(graph.clone()),
            version,
            MAX_FILE_SIZE,
        );
        Harness {
            engine,
            embedding,
            graph,
        }
    }

    fn embedded_paths(harness: &Harness) -> Vec<String> {
        let mut paths = harness.embedding.embedded.lock().unwrap().clone();
        paths.sort();
        paths
    }

    #[test]
    fn first_sync_adds_and_dispatches_every_file() {
        let dir = write_project(&[("src/main.rs", "fn main() {}"), ("src/lib.rs", "pub fn f() {}")]);
        let mut h = harness();

        let result = h
            .engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();

        assert_eq!(result.total_files, 2);
        assert_eq!(result.new_files, 2);
        assert_eq!(result.changed_files, 2);
        assert_eq!(result.deleted_files, 0);
        assert_eq!(result.updated_embeddings, 2);
        assert_eq!(result.updated_graph_nodes, 2);
        assert_eq!(result.strategy, SyncStrategy::Incremental);
        assert_eq!(h.engine.tracked_file_count("proj").unwrap(), 2);
        assert_eq!(embedded_paths(&h), vec!["src/lib.rs", "src/main.rs"]);
    }

    #[test]
    fn unchanged_second_pass_short_circuits() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let mut h = harness();
        let options = SyncOptions::default();

        h.engine.sync_project("proj", dir.path(), &options).unwrap();
        let second = h.engine.sync_project("proj", dir.path(), &options).unwrap();

        assert_eq!(second.strategy, SyncStrategy::NoChanges);
        assert_eq!(second.total_files, 1);
        assert_eq!(second.changed_files, 0);
        assert_eq!(second.updated_embeddings, 0);
        assert_eq!(second.updated_graph_nodes, 0);
        // The dispatchers were called exactly once per file overall.
        assert_eq!(h.embedding.embedded.lock().unwrap().len(), 1);
        assert_eq!(h.graph.upserted.lock().unwrap().len(), 1);
    }

    #[test]
    fn rewrite_with_identical_bytes_is_no_changes() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let mut h = harness();
        let options = SyncOptions::default();
        h.engine.sync_project("proj", dir.path(), &options).unwrap();

        // New mtime, same content.
        fs::write(dir.path().join("src/main.rs"), "fn main() {}").unwrap();
        let result = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(result.strategy, SyncStrategy::NoChanges);
    }

    #[test]
    fn edited_file_is_the_only_one_redispatched() {
        let dir = write_project(&[("src/a.rs", "fn a() {}"), ("src/b.rs", "fn b() {}")]);
        let mut h = harness();
        let options = SyncOptions::default();
        h.engine.sync_project("proj", dir.path(), &options).unwrap();

        fs::write(dir.path().join("src/b.rs"), "fn b() { changed(); }").unwrap();
        let result = h.engine.sync_project("proj", dir.path(), &options).unwrap();

        assert_eq!(result.changed_files, 1);
        assert_eq!(result.new_files, 0);
        assert_eq!(result.updated_embeddings, 1);
        let embedded = h.embedding.embedded.lock().unwrap();
        assert_eq!(embedded.iter().filter(|p| *p == "src/b.rs").count(), 2);
        assert_eq!(embedded.iter().filter(|p| *p == "src/a.rs").count(), 1);
    }

    #[test]
    fn deletion_cleans_up_collaborators_and_store() {
        let dir = write_project(&[("src/a.rs", "fn a() {}"), ("src/b.rs", "fn b() {}")]);
        let mut h = harness();
        let options = SyncOptions::default();
        h.engine.sync_project("proj", dir.path(), &options).unwrap();

        fs::remove_file(dir.path().join("src/b.rs")).unwrap();
        let result = h.engine.sync_project("proj", dir.path(), &options).unwrap();

        assert_eq!(result.deleted_files, 1);
        assert_eq!(result.changed_files, 0);
        assert_eq!(
            *h.embedding.removed.lock().unwrap(),
            vec![vec!["src/b.rs".to_string()]]
        );
        assert_eq!(
            *h.graph.removed.lock().unwrap(),
            vec![vec!["src/b.rs".to_string()]]
        );
        assert_eq!(h.engine.tracked_file_count("proj").unwrap(), 1);

        // Cleanup does not repeat once the deletion is persisted.
        let third = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(third.strategy, SyncStrategy::NoChanges);
        assert_eq!(h.embedding.removed.lock().unwrap().len(), 1);
    }

    #[test]
    fn embedding_version_bump_reprocesses_unmodified_files() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let store_dir = tempfile::tempdir().unwrap();
        let db_path = store_dir.path().join("state.db");
        let options = SyncOptions::default();

        {
            let embedding = Arc::new(FakeEmbeddingClient::new());
            let mut engine = SyncEngine::new(
                HashStore::open(&db_path, 14).unwrap(),
                EmbeddingDispatcher::new(embedding),
                GraphDispatcher::new(Arc::new(FakeGraphClient::new())),
                "v1",
                MAX_FILE_SIZE,
            );
            engine.sync_project("proj", dir.path(), &options).unwrap();
        }

        let embedding = Arc::new(FakeEmbeddingClient::new());
        let mut engine = SyncEngine::new(
            HashStore::open(&db_path, 14).unwrap(),
            EmbeddingDispatcher::new(embedding.clone()),
            GraphDispatcher::new(Arc::new(FakeGraphClient::new())),
            "v2",
            MAX_FILE_SIZE,
        );
        let result = engine.sync_project("proj", dir.path(), &options).unwrap();

        assert_eq!(result.changed_files, 1);
        assert_eq!(result.new_files, 0);
        assert_eq!(result.updated_embeddings, 1);

        // And the bump is recorded, so the next pass is quiet again.
        let quiet = engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(quiet.strategy, SyncStrategy::NoChanges);
    }

    #[test]
    fn force_full_sync_reprocesses_everything_without_deletions() {
        let dir = write_project(&[("src/a.rs", "fn a() {}"), ("src/b.rs", "fn b() {}")]);
        let mut h = harness();
        h.engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();

        fs::remove_file(dir.path().join("src/b.rs")).unwrap();
        let forced = SyncOptions {
            force_full_sync: true,
            ..SyncOptions::default()
        };
        let result = h.engine.sync_project("proj", dir.path(), &forced).unwrap();

        assert_eq!(result.strategy, SyncStrategy::FullSync);
        assert_eq!(result.new_files, 1);
        assert_eq!(result.deleted_files, 0, "forced sync must not delete");
        assert!(h.embedding.removed.lock().unwrap().is_empty());
        assert!(h.engine.last_full_scan("proj").unwrap().is_some());

        // The stale entry survives until the next regular pass notices it.
        assert_eq!(h.engine.tracked_file_count("proj").unwrap(), 2);
        let followup = h
            .engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();
        assert_eq!(followup.deleted_files, 1);
    }

    #[test]
    fn per_file_embedding_failure_neither_blocks_nor_retries() {
        let dir = write_project(&[
            ("src/a.rs", "fn a() {}"),
            ("src/b.rs", "fn b() {}"),
            ("src/c.rs", "fn c() {}"),
        ]);
        let mut h = harness_with(FakeEmbeddingClient::failing_on(&["src/b.rs"]), "v1");
        let options = SyncOptions::default();

        let result = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(result.changed_files, 3);
        assert_eq!(result.updated_embeddings, 2);
        assert_eq!(result.updated_graph_nodes, 3);
        assert_eq!(embedded_paths(&h), vec!["src/a.rs", "src/c.rs"]);

        // Hashes persisted regardless, so the failed file is not retried
        // until its content changes.
        let second = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(second.strategy, SyncStrategy::NoChanges);
    }

    #[test]
    fn dispatch_toggles_skip_the_disabled_side() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let mut h = harness();
        let options = SyncOptions {
            update_embeddings: false,
            ..SyncOptions::default()
        };

        let result = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(result.updated_embeddings, 0);
        assert_eq!(result.updated_graph_nodes, 1);
        assert!(h.embedding.embedded.lock().unwrap().is_empty());
    }

    #[test]
    fn unconfigured_collaborators_degrade_to_zero() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let mut engine = SyncEngine::new(
            HashStore::open_in_memory(14).unwrap(),
            EmbeddingDispatcher::not_configured(),
            GraphDispatcher::not_configured(),
            "v1",
            MAX_FILE_SIZE,
        );

        let result = engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();
        assert_eq!(result.changed_files, 1);
        assert_eq!(result.updated_embeddings, 0);
        assert_eq!(result.updated_graph_nodes, 0);
        // Hash state still advances.
        assert_eq!(engine.tracked_file_count("proj").unwrap(), 1);
    }

    #[test]
    fn invalid_root_is_fatal() {
        let mut h = harness();
        let err = h
            .engine
            .sync_project("proj", Path::new("/no/such/root"), &SyncOptions::default())
            .unwrap_err();
        assert!(matches!(err, SyncError::Scan(_)));
    }

    #[test]
    fn quick_check_is_false_after_sync_and_true_after_edit() {
        let dir = write_project(&[("src/main.rs", "fn main() {}"), ("src/lib.rs", "pub fn f() {}")]);
        let mut h = harness();
        h.engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();
        let filter = ScanFilter::default();
        assert!(!h.engine.quick_sync_check("proj", dir.path(), &filter).unwrap());

        fs::write(dir.path().join("src/main.rs"), "fn main() { edited(); }").unwrap();
        assert!(h.engine.quick_sync_check("proj", dir.path(), &filter).unwrap());
    }

    #[test]
    fn quick_check_is_true_for_unsynced_project() {
        let dir = write_project(&[("src/main.rs", "fn main() {}")]);
        let h = harness();
        assert!(
            h.engine
                .quick_sync_check("proj", dir.path(), &ScanFilter::default())
                .unwrap()
        );
    }

    #[test]
    fn quick_check_ignores_deletions() {
        let dir = write_project(&[("src/main.rs", "fn main() {}"), ("src/lib.rs", "pub fn f() {}")]);
        let mut h = harness();
        h.engine
            .sync_project("proj", dir.path(), &SyncOptions::default())
            .unwrap();

        fs::remove_file(dir.path().join("src/lib.rs")).unwrap();
        assert!(
            !h.engine
                .quick_sync_check("proj", dir.path(), &ScanFilter::default())
                .unwrap()
        );
    }

    #[test]
    fn quick_check_honors_the_sync_exclude_patterns() {
        // web/index.ts has an entry-point name, so an unfiltered sample would
        // pick it first and report it as forever-added.
        let dir = write_project(&[
            ("src/main.rs", "fn main() {}"),
            ("web/index.ts", "export function render(): void {}"),
        ]);
        let mut h = harness();
        let options = SyncOptions {
            exclude_patterns: vec!["web/**".to_string()],
            ..SyncOptions::default()
        };
        h.engine.sync_project("proj", dir.path(), &options).unwrap();
        let quiet = h.engine.sync_project("proj", dir.path(), &options).unwrap();
        assert_eq!(quiet.strategy, SyncStrategy::NoChanges);

        let filter = ScanFilter::new(&[], &["web/**".to_string()]).unwrap();
        assert!(
            !h.engine
                .quick_sync_check("proj", dir.path(), &filter)
                .unwrap(),
            "quick check must agree with a fully-synced filtered project"
        );
    }

    #[test]
    fn quick_check_on_empty_tree_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let h = harness();
        assert!(
            !h.engine
                .quick_sync_check("proj", dir.path(), &ScanFilter::default())
                .unwrap()
        );
    }

    #[test]
    fn sample_prefers_entry_point_names() {
        let paths: Vec<String> = (0..50)
            .map(|i| format!("src/module_{i:02}.rs"))
            .chain(["src/main.rs".to_string(), "src/server.ts".to_string()])
            .collect();

        let sample = sample_paths(&paths);
        assert_eq!(sample.len(), QUICK_CHECK_SAMPLE_SIZE);
        assert!(sample.contains(&"src/main.rs".to_string()));
        assert!(sample.contains(&"src/server.ts".to_string()));
    }

    #[test]
    fn sample_of_small_tree_is_every_path() {
        let paths = vec!["a.rs".to_string(), "b.rs".to_string()];
        let mut sample = sample_paths(&paths);
        sample.sort();
        assert_eq!(sample, paths);
    }
}
