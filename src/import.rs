//! File import orchestration
//!
//! One primary entry point per source file: read rows, derive the target
//! schema, create or replace the table, load in batches, and report what
//! happened. A directory import is a loop over that entry point that
//! keeps going when a single file fails.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::identifier::sanitize_identifier;
use crate::loader::{self, BatchOutcome, DEFAULT_BATCH_SIZE};
use crate::reader::{self, SourceFormat};
use crate::schema::{TableTarget, ensure_table};
use crate::store::Store;

/// Recognized options for one import operation
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Drop and recreate an existing table instead of appending
    pub replace_existing: bool,
    /// Rows per insert batch
    pub batch_size: usize,
    /// Target table name; derived from the file name when absent
    pub table_name: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            replace_existing: false,
            batch_size: DEFAULT_BATCH_SIZE,
            table_name: None,
        }
    }
}

/// Accounting for one imported file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// Table the file was imported into
    pub table: String,
    /// Columns in the derived schema
    pub columns: usize,
    /// Data rows read from the source (header excluded)
    pub rows_read: usize,
    /// Load accounting
    pub outcome: BatchOutcome,
    /// Duration of the whole import in milliseconds
    pub duration_ms: u64,
}

/// Import a single tabular file into one table.
///
/// The first row is the header; the schema is inferred from it and the
/// data rows. With `replace_existing` the old table is dropped first,
/// otherwise rows append to the existing table. An empty source is
/// reported, not an error — no table is created for it.
pub fn import_file(
    store: &Store,
    path: &Path,
    options: &ImportOptions,
) -> EngineResult<ImportReport> {
    let start = Instant::now();
    let rows = reader::read_rows(path)?;

    let table = match &options.table_name {
        Some(name) if !name.trim().is_empty() => sanitize_identifier(name),
        _ => derive_table_name(path),
    };

    let (header, data) = match rows.split_first() {
        Some(split) => split,
        None => {
            tracing::warn!(file = %path.display(), "source is empty, nothing imported");
            return Ok(empty_report(table, start));
        }
    };
    if header.is_empty() {
        tracing::warn!(file = %path.display(), "source has no header columns, nothing imported");
        return Ok(empty_report(table, start));
    }

    let target = TableTarget::from_rows(&table, header, data);
    ensure_table(store, &target, options.replace_existing)?;
    let outcome = loader::load(store, &target, data, options.batch_size)?;

    let report = ImportReport {
        table: target.name.clone(),
        columns: target.columns.len(),
        rows_read: data.len(),
        outcome,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    tracing::info!(
        file = %path.display(),
        table = %report.table,
        rows = report.rows_read,
        committed = report.outcome.rows_committed,
        "import finished"
    );
    Ok(report)
}

/// Import every supported file in a directory, one table per file.
///
/// Table names are derived from the file names; `table_name` in the
/// options is ignored here. A failing file is logged and skipped so the
/// rest of the directory still imports.
pub fn import_directory(
    store: &Store,
    directory: &Path,
    options: &ImportOptions,
) -> EngineResult<Vec<ImportReport>> {
    if !directory.is_dir() {
        return Err(EngineError::Io(format!(
            "{} is not a directory",
            directory.display()
        )));
    }

    let mut paths: Vec<_> = std::fs::read_dir(directory)
        .map_err(|e| EngineError::Io(format!("Failed to read {}: {}", directory.display(), e)))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && SourceFormat::from_path(path).is_ok())
        .collect();
    paths.sort();

    let per_file = ImportOptions {
        table_name: None,
        ..options.clone()
    };

    let mut reports = Vec::with_capacity(paths.len());
    for path in &paths {
        match import_file(store, path, &per_file) {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::warn!(file = %path.display(), "skipping file: {}", e);
            }
        }
    }

    tracing::info!(
        directory = %directory.display(),
        imported = reports.len(),
        found = paths.len(),
        "directory import finished"
    );
    Ok(reports)
}

/// Table name from the file stem
fn derive_table_name(path: &Path) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    sanitize_identifier(stem)
}

fn empty_report(table: String, start: Instant) -> ImportReport {
    ImportReport {
        table,
        columns: 0,
        rows_read: 0,
        outcome: BatchOutcome {
            rows_attempted: 0,
            rows_committed: 0,
            first_failure: None,
        },
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_derive_table_name() {
        assert_eq!(derive_table_name(Path::new("/tmp/sample_csv.csv")), "sample_csv");
        assert_eq!(derive_table_name(Path::new("PV Produktion.xls")), "pv_produktion");
        assert_eq!(derive_table_name(Path::new("2024-export.csv")), "col_2024export");
    }

    #[test]
    fn test_import_directory_rejects_plain_file() {
        let store = Store::in_memory().unwrap();
        let err =
            import_directory(&store, &PathBuf::from("/no/such/dir"), &ImportOptions::default())
                .unwrap_err();
        assert!(matches!(err, EngineError::Io(_)));
    }
}
