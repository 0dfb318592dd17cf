//! CLI command handlers

use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::store::Store;

use super::error::CliError;

pub mod import;
pub mod query;

/// Open the store named on the command line, or the configured one.
///
/// Without `--store` the configuration in the current directory decides;
/// its default is an in-memory store.
pub fn open_store(store_path: &Option<PathBuf>) -> Result<Store, CliError> {
    match store_path {
        Some(path) => Ok(Store::open(path)?),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| CliError::IoError(format!("Failed to resolve cwd: {}", e)))?;
            let config = EngineConfig::load(&cwd)?;
            Ok(config.open_store(&cwd)?)
        }
    }
}
