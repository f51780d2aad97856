use std::collections::HashMap;
use syndex_core::types::{ChangeSet, FileRecord};

/// Partition the current scan against the stored hash state.
///
/// Content hash is the sole authority for added/modified/unchanged, with one
/// exception: a differing `embedding_version` also classifies as modified so
/// a model-generation bump forces reprocessing of byte-identical files. The
/// structural hash is carried through untouched and never consulted here.
///
/// `force_full_sync` bypasses the comparison entirely: every scanned file is
/// added and no deletions are computed (full-sync mode has no baseline to
/// compare against, so it intentionally does not clean up vanished files).
pub fn classify(
    current: &[FileRecord],
    known: &HashMap<String, FileRecord>,
    force_full_sync: bool,
) -> ChangeSet {
    if force_full_sync {
        return ChangeSet {
            added: current.to_vec(),
            modified: Vec::new(),
            deleted: Vec::new(),
            unchanged_count: 0,
        };
    }

    let mut change_set = ChangeSet::default();

    for record in current {
        match known.get(&record.path) {
            None => change_set.added.push(record.clone()),
            Some(stored)
                if stored.content_hash != record.content_hash
                    || stored.embedding_version != record.embedding_version =>
            {
                change_set.modified.push(record.clone());
            }
            Some(_) => change_set.unchanged_count += 1,
        }
    }

    let current_paths: std::collections::HashSet<&str> =
        current.iter().map(|r| r.path.as_str()).collect();
    for path in known.keys() {
        if !current_paths.contains(path.as_str()) {
            change_set.deleted.push(path.clone());
        }
    }
    change_set.deleted.sort();

    change_set
}
