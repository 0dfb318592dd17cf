//! Engine configuration
//!
//! Handles parsing of `.tabular-import.toml` configuration files and
//! environment variable overrides. Configuration is an explicit value
//! handed to `Store::open` and the import entry points — there is no
//! process-wide mutable state.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::import::ImportOptions;
use crate::loader::DEFAULT_BATCH_SIZE;
use crate::store::Store;

/// Default configuration filename
pub const CONFIG_FILENAME: &str = ".tabular-import.toml";

/// Environment variable overriding the store path
pub const ENV_STORE_PATH: &str = "TABULAR_IMPORT_STORE_PATH";

/// Environment variable overriding the insert batch size
pub const ENV_BATCH_SIZE: &str = "TABULAR_IMPORT_BATCH_SIZE";

/// Store configuration section
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreSection {
    /// Path to the database file; empty means in-memory
    #[serde(default)]
    pub path: String,
}

/// Import configuration section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSection {
    /// Rows per insert batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Replace existing tables instead of appending
    #[serde(default)]
    pub replace_existing: bool,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

impl Default for ImportSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            replace_existing: false,
        }
    }
}

/// Main configuration structure
///
/// Represents the `.tabular-import.toml` configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineConfig {
    /// Store configuration
    #[serde(default)]
    pub store: StoreSection,

    /// Import configuration
    #[serde(default)]
    pub import: ImportSection,
}

impl EngineConfig {
    /// Create a new default configuration (in-memory store)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for a file-backed store
    pub fn file_backed(path: impl Into<String>) -> Self {
        Self {
            store: StoreSection { path: path.into() },
            ..Default::default()
        }
    }

    /// Load configuration from a directory.
    ///
    /// Looks for [`CONFIG_FILENAME`] there, falls back to defaults when
    /// absent, then applies environment variable overrides.
    pub fn load(directory: &Path) -> EngineResult<Self> {
        let config_path = directory.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .map_err(|e| EngineError::Io(format!("Failed to read config: {}", e)))?;
            Self::parse(&content)?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string
    pub fn parse(content: &str) -> EngineResult<Self> {
        toml::from_str(content)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to a directory
    pub fn save(&self, directory: &Path) -> EngineResult<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| EngineError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(directory.join(CONFIG_FILENAME), content)
            .map_err(|e| EngineError::Io(format!("Failed to write config: {}", e)))
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(ENV_STORE_PATH) {
            self.store.path = path;
        }
        if let Ok(size) = std::env::var(ENV_BATCH_SIZE)
            && let Ok(size) = size.parse()
        {
            self.import.batch_size = size;
        }
    }

    /// Resolve the store path relative to a base directory, or `None` for
    /// an in-memory store
    pub fn store_path(&self, base: &Path) -> Option<PathBuf> {
        if self.store.path.is_empty() {
            None
        } else if Path::new(&self.store.path).is_absolute() {
            Some(PathBuf::from(&self.store.path))
        } else {
            Some(base.join(&self.store.path))
        }
    }

    /// Open the configured store
    pub fn open_store(&self, base: &Path) -> EngineResult<Store> {
        match self.store_path(base) {
            Some(path) => Store::open(path),
            None => Store::in_memory(),
        }
    }

    /// Import options carrying the configured defaults
    pub fn import_options(&self) -> ImportOptions {
        ImportOptions {
            replace_existing: self.import.replace_existing,
            batch_size: self.import.batch_size,
            table_name: None,
        }
    }
}

/// Generate a sample configuration file content
pub fn sample_config() -> &'static str {
    r#"# Tabular import configuration

[store]
# Path to the database file (relative to this file, or absolute).
# Leave empty for an in-memory store.
path = "measurements.duckdb"

[import]
# Rows per insert batch
batch_size = 1000

# Replace existing tables instead of appending
replace_existing = false
"#
}
