use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;
use std::path::Path;
use syndex_core::error::ScanError;
use syndex_core::languages;
use syndex_core::types::FileRecord;
use tracing::{debug, warn};

use crate::signatures;

/// Built-in ignored directory names for build output and dependency trees.
const BUILTIN_IGNORE_DIRS: &[&str] = &[
    ".git",
    "node_modules",
    "__pycache__",
    ".tox",
    "target",
    "build",
    "dist",
    "out",
    ".next",
    ".nuxt",
    "vendor",
    ".venv",
    "venv",
    "coverage",
];

/// Compiled include/exclude filter applied to project-relative paths.
///
/// Exclusion wins over inclusion; an empty include list means "everything
/// that survives the defaults".
#[derive(Debug, Default)]
pub struct ScanFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl ScanFilter {
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self, ScanError> {
        Ok(Self {
            include: build_globset(include_patterns)?,
            exclude: build_globset(exclude_patterns)?,
        })
    }

    fn matches(&self, relative_path: &str) -> bool {
        if let Some(exclude) = &self.exclude
            && exclude.is_match(relative_path)
        {
            return false;
        }
        if let Some(include) = &self.include {
            return include.is_match(relative_path);
        }
        true
    }
}

fn build_globset(patterns: &[String]) -> Result<Option<GlobSet>, ScanError> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
            pattern: pattern.clone(),
            reason: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| ScanError::InvalidPattern {
        pattern: patterns.join(","),
        reason: e.to_string(),
    })?;
    Ok(Some(set))
}

/// List project-relative paths of every eligible source file under `root`.
///
/// Eligibility: extension on the source allow-list, not under a hidden or
/// built-in ignored directory, not over `max_file_size`, and passing the
/// include/exclude filter. Unlistable directories are treated as absent.
pub fn list_source_files(
    root: &Path,
    filter: &ScanFilter,
    max_file_size: u64,
) -> Result<Vec<String>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::InvalidRoot {
            path: root.to_string_lossy().to_string(),
        });
    }

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(false);

    let mut paths = Vec::new();
    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                // Unlistable directory or racy entry: absent, not an error.
                debug!("Walk error: {}", e);
                continue;
            }
        };

        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/");

        if in_builtin_ignore_dir(&relative) {
            debug!(path = %relative, "Skipped by built-in ignore");
            continue;
        }

        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !languages::is_source_extension(ext) {
            continue;
        }

        if let Ok(metadata) = std::fs::metadata(path)
            && metadata.len() > max_file_size
        {
            warn!(path = %relative, size = metadata.len(), "Skipped: file too large");
            continue;
        }

        if !filter.matches(&relative) {
            continue;
        }

        paths.push(relative);
    }

    paths.sort();
    Ok(paths)
}

/// Hash a set of project-relative paths into `FileRecord`s.
///
/// Per-file work (read, content hash, structural extraction) runs on the
/// rayon pool. A file that cannot be read is skipped with a warning and
/// never aborts its siblings.
pub fn scan_paths(root: &Path, relative_paths: &[String], embedding_version: &str) -> Vec<FileRecord> {
    let mut records: Vec<FileRecord> = relative_paths
        .par_iter()
        .filter_map(|relative| hash_one_file(root, relative, embedding_version))
        .collect();
    records.sort_by(|a, b| a.path.cmp(&b.path));
    records
}

/// Full scan: list eligible files, then hash them all.
pub fn scan_tree(
    root: &Path,
    filter: &ScanFilter,
    max_file_size: u64,
    embedding_version: &str,
) -> Result<Vec<FileRecord>, ScanError> {
    let paths = list_source_files(root, filter, max_file_size)?;
    Ok(scan_paths(root, &paths, embedding_version))
}

fn hash_one_file(root: &Path, relative: &str, embedding_version: &str) -> Option<FileRecord> {
    let full_path = root.join(relative);
    let bytes = match std::fs::read(&full_path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %relative, error = %e, "Skipped unreadable file");
            return None;
        }
    };

    let content_hash = blake3::hash(&bytes).to_hex().to_string();

    let language = full_path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(languages::detect_language_from_extension);
    let text = String::from_utf8_lossy(&bytes);
    let structural_hash = signatures::structural_hash(language, &text, &content_hash);

    let (size_bytes, last_modified) = match std::fs::metadata(&full_path) {
        Ok(metadata) => {
            let mtime = metadata
                .modified()
                .ok()
                .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                .map(|d| d.as_secs() as i64);
            (metadata.len(), mtime)
        }
        Err(_) => (bytes.len() as u64, None),
    };

    Some(FileRecord {
        path: relative.to_string(),
        content_hash,
        structural_hash,
        size_bytes,
        last_modified,
        last_synced: None,
        embedding_version: embedding_version.to_string(),
    })
}

fn in_builtin_ignore_dir(relative_path: &str) -> bool {
    relative_path
        .split('/')
        .any(|component| BUILTIN_IGNORE_DIRS.contains(&component))
}
