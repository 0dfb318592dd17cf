//! Error taxonomy for the import and query engine
//!
//! Structural problems (unreadable files, conflicting schemas, missing
//! query targets) surface immediately; cell-level problems are recovered
//! locally with a safe fallback and never reach this type.

/// Error type for import and query operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// File type is unreadable or unknown. Fatal, no format fallback.
    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    /// Ambiguous or duplicate column identifiers. Aborts before any DDL.
    #[error("Schema conflict: {0}")]
    SchemaConflict(String),

    /// Query against a table that does not exist
    #[error("No such table: {0}")]
    NoSuchTable(String),

    /// Query against a column that does not exist
    #[error("No such column: {0}.{1}")]
    NoSuchColumn(String, String),

    /// Store-level failure (connection, DDL, DML)
    #[error("Store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for import and query operations
pub type EngineResult<T> = Result<T, EngineError>;
