use rusqlite::Connection;
use syndex_core::error::StateError;

/// Create all tables if they do not exist.
///
/// Hash-store values are stored as TEXT columns: the wire format for a record
/// is flat string fields, and an all-empty record is a cache miss, never a
/// zero-value match.
pub fn create_tables(conn: &Connection) -> Result<(), StateError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS file_hashes (
            project_id TEXT NOT NULL,
            path TEXT NOT NULL,
            content_hash TEXT NOT NULL,
            structural_hash TEXT NOT NULL,
            size_bytes TEXT NOT NULL,
            last_modified TEXT NOT NULL,
            last_synced TEXT NOT NULL,
            embedding_version TEXT NOT NULL,
            expires_at INTEGER NOT NULL,
            PRIMARY KEY (project_id, path)
        );
        CREATE INDEX IF NOT EXISTS idx_file_hashes_expires
            ON file_hashes (expires_at);

        CREATE TABLE IF NOT EXISTS sync_meta (
            project_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            expires_at INTEGER NOT NULL,
            PRIMARY KEY (project_id, key)
        );",
    )
    .map_err(StateError::sqlite)?;
    Ok(())
}
