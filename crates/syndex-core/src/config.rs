use crate::constants;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_ms: u32,
    #[serde(default = "default_cache_size")]
    pub cache_size: i32,
}

/// Embedding collaborator settings. `endpoint = None` means the embedding
/// dispatcher runs in its not-configured state and reports zero processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default = "default_embedding_version")]
    pub version: String,
    #[serde(default = "default_dispatch_timeout_ms")]
    pub timeout_ms: u64,
}

/// Graph collaborator settings, same not-configured convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default = "default_dispatch_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Config {
    /// Load configuration, layering project config over the global one.
    pub fn load(repo_root: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_file(repo_root, None)
    }

    /// Load configuration with an explicit config file path (highest priority layer).
    pub fn load_with_file(
        repo_root: Option<&Path>,
        config_file: Option<&Path>,
    ) -> Result<Self, ConfigError> {
        // Start with an empty TOML table, then layer each config file on top so
        // only explicitly-set fields override previous layers.
        let mut merged = toml::Value::Table(toml::map::Map::new());

        if let Some(home) = dirs::home_dir() {
            let global_path = home.join(constants::DEFAULT_DATA_DIR).join("config.toml");
            if global_path.exists() {
                let raw = load_toml_value(&global_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(root) = repo_root {
            let project_path = root.join(constants::PROJECT_CONFIG_FILE);
            if project_path.exists() {
                let raw = load_toml_value(&project_path)?;
                merge_toml_values(&mut merged, &raw);
            }
        }

        if let Some(cf) = config_file {
            if !cf.exists() {
                return Err(ConfigError::NotFound {
                    path: cf.to_string_lossy().to_string(),
                });
            }
            let raw = load_toml_value(cf)?;
            merge_toml_values(&mut merged, &raw);
        }

        let config_str =
            toml::to_string(&merged).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        let config: Config =
            toml::from_str(&config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.retention_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "storage.retention_days".to_string(),
                reason: "must be at least 1 day".to_string(),
            });
        }
        if self.scan.max_file_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scan.max_file_size".to_string(),
                reason: "must be non-zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve the data directory, expanding a leading `~`.
    pub fn data_dir_path(&self) -> PathBuf {
        if let Some(stripped) = self.storage.data_dir.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(stripped);
        }
        PathBuf::from(&self.storage.data_dir)
    }

    /// Per-project data directory under the configured data dir.
    pub fn project_data_dir(&self, project_id: &str) -> PathBuf {
        self.data_dir_path().join("data").join(project_id)
    }
}

fn load_toml_value(path: &Path) -> Result<toml::Value, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    raw.parse::<toml::Value>()
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))
}

/// Recursively merge `overlay` into `base`; overlay table keys win.
fn merge_toml_values(base: &mut toml::Value, overlay: &toml::Value) {
    if let (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) = (base, overlay) {
        for (key, overlay_value) in overlay_table {
            match base_table.get_mut(key) {
                Some(base_value) if base_value.is_table() && overlay_value.is_table() => {
                    merge_toml_values(base_value, overlay_value);
                }
                _ => {
                    base_table.insert(key.clone(), overlay_value.clone());
                }
            }
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            exclude_patterns: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            retention_days: default_retention_days(),
            busy_timeout_ms: default_busy_timeout(),
            cache_size: default_cache_size(),
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: default_embedding_model(),
            version: default_embedding_version(),
            timeout_ms: default_dispatch_timeout_ms(),
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: default_dispatch_timeout_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_max_file_size() -> u64 {
    constants::MAX_FILE_SIZE
}

fn default_data_dir() -> String {
    format!("~/{}", constants::DEFAULT_DATA_DIR)
}

fn default_retention_days() -> u32 {
    constants::DEFAULT_RETENTION_DAYS
}

fn default_busy_timeout() -> u32 {
    5000
}

fn default_cache_size() -> i32 {
    -64000
}

fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_embedding_version() -> String {
    constants::DEFAULT_EMBEDDING_VERSION.to_string()
}

fn default_dispatch_timeout_ms() -> u64 {
    constants::DEFAULT_DISPATCH_TIMEOUT_MS
}

fn default_log_level() -> String {
    "info".to_string()
}
