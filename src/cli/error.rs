//! CLI-specific error types

use thiserror::Error;

use crate::error::EngineError;

/// CLI-specific error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Engine(#[from] EngineError),

    #[error("IO error: {0}")]
    IoError(String),
}
