//! Tabular Import SDK
//!
//! Imports semi-structured tabular files (delimited text and legacy XLS
//! workbooks) into an embedded SQL store, inferring a schema on the fly,
//! and answers time-indexed point/range queries against the imported
//! tables.
//!
//! The pipeline:
//! - Row sources parse a file into string rows ([`reader`])
//! - Header names become store-legal identifiers ([`identifier`])
//! - Each column gets one SQL type from header hints and sampled values
//!   ([`infer`])
//! - Tables are created or replaced idempotently ([`schema`])
//! - Rows commit in bounded batches with partial-success accounting
//!   ([`loader`])
//! - Point/range/sum lookups run against the populated tables
//!   ([`timeseries`])

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod identifier;
pub mod import;
pub mod infer;
pub mod loader;
pub mod reader;
pub mod schema;
pub mod store;
pub mod timeseries;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use import::{ImportOptions, ImportReport, import_directory, import_file};
pub use infer::SqlType;
pub use loader::{BatchFailure, BatchOutcome, DEFAULT_BATCH_SIZE, load};
pub use reader::{RawRow, SourceFormat, read_rows};
pub use schema::{ColumnSpec, TableTarget, ensure_table};
pub use store::{OutputFormat, QueryResult, Store, format_query_result};
pub use timeseries::{point_lookup, range_lookup, sum_over_range};
