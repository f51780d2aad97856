use rusqlite::{Connection, params};
use std::collections::HashMap;
use std::path::Path;
use syndex_core::constants;
use syndex_core::error::StateError;
use syndex_core::time::now_unix_secs;
use syndex_core::types::FileRecord;
use tracing::debug;

const SECS_PER_DAY: i64 = 86_400;

/// Durable per-project cache mapping file path to last-known hash state.
///
/// Entries expire after the retention window; an unmodified file whose entry
/// expired is rediscovered as "added" on the next scan. Batched reads and
/// writes run as a single transaction per call, so a sync pass costs O(1)
/// store round-trips rather than O(files).
pub struct HashStore {
    conn: Connection,
    retention_days: u32,
}

impl HashStore {
    /// Open (or create) the store at `db_path` with default pragmas.
    pub fn open(db_path: &Path, retention_days: u32) -> Result<Self, StateError> {
        Self::open_with_config(db_path, retention_days, 5000, -64000)
    }

    /// Open with explicit pragma configuration.
    pub fn open_with_config(
        db_path: &Path,
        retention_days: u32,
        busy_timeout_ms: u32,
        cache_size: i32,
    ) -> Result<Self, StateError> {
        let conn = open_store_database(db_path, busy_timeout_ms, cache_size)?;
        crate::schema::create_tables(&conn)?;
        Ok(Self {
            conn,
            retention_days,
        })
    }

    /// In-memory store, for tests.
    pub fn open_in_memory(retention_days: u32) -> Result<Self, StateError> {
        let conn = Connection::open_in_memory().map_err(StateError::sqlite)?;
        crate::schema::create_tables(&conn)?;
        Ok(Self {
            conn,
            retention_days,
        })
    }

    pub fn retention_days(&self) -> u32 {
        self.retention_days
    }

    fn expiry_from_now(&self) -> i64 {
        now_unix_secs() + i64::from(self.retention_days) * SECS_PER_DAY
    }

    /// All live records for a project, keyed by path.
    ///
    /// Expired rows are purged before the read and treated as absent. A row
    /// with an empty content hash is a cache miss, never a zero-value match.
    pub fn get_all(&self, project_id: &str) -> Result<HashMap<String, FileRecord>, StateError> {
        self.purge_expired()?;

        let mut stmt = self
            .conn
            .prepare(
                "SELECT path, content_hash, structural_hash, size_bytes,
                        last_modified, last_synced, embedding_version
                 FROM file_hashes WHERE project_id = ?1",
            )
            .map_err(StateError::sqlite)?;

        let rows = stmt
            .query_map(params![project_id], |row| {
                let path: String = row.get(0)?;
                let content_hash: String = row.get(1)?;
                let structural_hash: String = row.get(2)?;
                let size_bytes: String = row.get(3)?;
                let last_modified: String = row.get(4)?;
                let last_synced: String = row.get(5)?;
                let embedding_version: String = row.get(6)?;
                Ok(FileRecord {
                    path,
                    content_hash,
                    structural_hash,
                    size_bytes: size_bytes.parse().unwrap_or(0),
                    last_modified: last_modified.parse().ok(),
                    last_synced: if last_synced.is_empty() {
                        None
                    } else {
                        Some(last_synced)
                    },
                    embedding_version,
                })
            })
            .map_err(StateError::sqlite)?;

        let mut records = HashMap::new();
        for row in rows {
            let record = row.map_err(StateError::sqlite)?;
            if record.content_hash.is_empty() {
                continue;
            }
            records.insert(record.path.clone(), record);
        }
        Ok(records)
    }

    /// Upsert a batch of records in one transaction.
    pub fn set_many(&mut self, project_id: &str, records: &[FileRecord]) -> Result<(), StateError> {
        if records.is_empty() {
            return Ok(());
        }
        let expires_at = self.expiry_from_now();
        let tx = self.conn.transaction().map_err(StateError::sqlite)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO file_hashes (project_id, path, content_hash, structural_hash,
                                              size_bytes, last_modified, last_synced,
                                              embedding_version, expires_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                     ON CONFLICT(project_id, path) DO UPDATE SET
                       content_hash = excluded.content_hash,
                       structural_hash = excluded.structural_hash,
                       size_bytes = excluded.size_bytes,
                       last_modified = excluded.last_modified,
                       last_synced = excluded.last_synced,
                       embedding_version = excluded.embedding_version,
                       expires_at = excluded.expires_at",
                )
                .map_err(StateError::sqlite)?;
            for record in records {
                stmt.execute(params![
                    project_id,
                    record.path,
                    record.content_hash,
                    record.structural_hash,
                    record.size_bytes.to_string(),
                    record
                        .last_modified
                        .map(|m| m.to_string())
                        .unwrap_or_default(),
                    record.last_synced.clone().unwrap_or_default(),
                    record.embedding_version,
                    expires_at,
                ])
                .map_err(StateError::sqlite)?;
            }
        }
        tx.commit().map_err(StateError::sqlite)?;
        debug!(project_id, count = records.len(), "Hash store batch upsert");
        Ok(())
    }

    /// Delete a batch of paths in one transaction. Missing paths are a no-op.
    pub fn delete_many(&mut self, project_id: &str, paths: &[String]) -> Result<(), StateError> {
        if paths.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction().map_err(StateError::sqlite)?;
        {
            let mut stmt = tx
                .prepare("DELETE FROM file_hashes WHERE project_id = ?1 AND path = ?2")
                .map_err(StateError::sqlite)?;
            for path in paths {
                stmt.execute(params![project_id, path])
                    .map_err(StateError::sqlite)?;
            }
        }
        tx.commit().map_err(StateError::sqlite)?;
        debug!(project_id, count = paths.len(), "Hash store batch delete");
        Ok(())
    }

    /// Number of live entries for a project.
    pub fn entry_count(&self, project_id: &str) -> Result<u64, StateError> {
        let now = now_unix_secs();
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM file_hashes
                 WHERE project_id = ?1 AND expires_at > ?2",
                params![project_id, now],
                |row| row.get(0),
            )
            .map_err(StateError::sqlite)?;
        Ok(count as u64)
    }

    /// Record the timestamp of the last full scan. Observability only; shares
    /// the retention window of the hash entries it describes.
    pub fn record_last_full_scan(
        &self,
        project_id: &str,
        timestamp: &str,
    ) -> Result<(), StateError> {
        self.conn
            .execute(
                "INSERT INTO sync_meta (project_id, key, value, expires_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(project_id, key) DO UPDATE SET
                   value = excluded.value,
                   expires_at = excluded.expires_at",
                params![
                    project_id,
                    constants::META_LAST_FULL_SCAN,
                    timestamp,
                    self.expiry_from_now()
                ],
            )
            .map_err(StateError::sqlite)?;
        Ok(())
    }

    /// Timestamp of the last full scan, if still within retention.
    pub fn last_full_scan(&self, project_id: &str) -> Result<Option<String>, StateError> {
        let result = self.conn.query_row(
            "SELECT value FROM sync_meta
             WHERE project_id = ?1 AND key = ?2 AND expires_at > ?3",
            params![project_id, constants::META_LAST_FULL_SCAN, now_unix_secs()],
            |row| row.get(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StateError::sqlite(e)),
        }
    }

    /// Run SQLite's `quick_check` over the backing file. `None` means
    /// healthy; `Some(detail)` carries the corruption report.
    pub fn integrity_check(&self) -> Result<Option<String>, StateError> {
        let result: String = self
            .conn
            .query_row("PRAGMA quick_check", [], |row| row.get(0))
            .map_err(StateError::sqlite)?;
        if result == "ok" {
            Ok(None)
        } else {
            Ok(Some(result))
        }
    }

    fn purge_expired(&self) -> Result<(), StateError> {
        let now = now_unix_secs();
        let purged = self
            .conn
            .execute(
                "DELETE FROM file_hashes WHERE expires_at <= ?1",
                params![now],
            )
            .map_err(StateError::sqlite)?;
        let meta_purged = self
            .conn
            .execute("DELETE FROM sync_meta WHERE expires_at <= ?1", params![now])
            .map_err(StateError::sqlite)?;
        if purged > 0 || meta_purged > 0 {
            debug!(purged, meta_purged, "Expired hash store entries purged");
        }
        Ok(())
    }

    #[cfg(test)]
    fn force_expire_all(&self) {
        self.conn
            .execute("UPDATE file_hashes SET expires_at = 0", [])
            .unwrap();
    }
}

/// Open the backing database, creating parent directories as needed.
///
/// WAL with NORMAL synchronous lets a `check` probe read while a sync pass
/// writes; busy timeout and cache size come straight from the storage
/// config.
fn open_store_database(
    db_path: &Path,
    busy_timeout_ms: u32,
    cache_size: i32,
) -> Result<Connection, StateError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path).map_err(StateError::sqlite)?;
    conn.execute_batch(&format!(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA busy_timeout = {busy_timeout_ms};
         PRAGMA cache_size = {cache_size};"
    ))
    .map_err(StateError::sqlite)?;

    debug!(path = %db_path.display(), "Hash store database opened");
    Ok(conn)
}
