/// Default data directory name under home.
pub const DEFAULT_DATA_DIR: &str = ".syndex";

/// Project config file name, relative to the project root.
pub const PROJECT_CONFIG_FILE: &str = ".syndex/config.toml";

/// SQLite database file name.
pub const STATE_DB_FILE: &str = "state.db";

/// Maximum file size to scan (1MB).
pub const MAX_FILE_SIZE: u64 = 1_048_576;

/// Default retention window for hash store entries, in days.
///
/// An unmodified file whose entry has expired is rediscovered as "new" on
/// the next scan. That redundant re-dispatch is an accepted cost trade-off,
/// not a correctness bug; sensible values are 7-30 days.
pub const DEFAULT_RETENTION_DAYS: u32 = 14;

/// Default per-request timeout for downstream collaborator calls, in ms.
pub const DEFAULT_DISPATCH_TIMEOUT_MS: u64 = 30_000;

/// Default embedding model version tag. Bumping this forces every file to
/// reclassify as modified on the next pass.
pub const DEFAULT_EMBEDDING_VERSION: &str = "v1";

/// Number of files hashed by a quick staleness check.
pub const QUICK_CHECK_SAMPLE_SIZE: usize = 20;

/// File-name prefixes that bias the quick-check sample toward conventional
/// entry points, which change most often when a tree changes at all.
pub const ENTRY_POINT_PREFIXES: [&str; 5] = ["index", "main", "app", "server", "client"];

/// Metadata key recording the timestamp of the last full scan per project.
/// Observability only; never consulted by classification.
pub const META_LAST_FULL_SCAN: &str = "last_full_scan";
