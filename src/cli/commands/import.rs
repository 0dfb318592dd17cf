//! Import CLI commands

use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::import::{ImportOptions, ImportReport, import_directory, import_file};

use crate::cli::error::CliError;

use super::open_store;

/// Arguments for importing a single file
#[derive(Debug, Clone)]
pub struct ImportFileArgs {
    /// Source file (.csv or .xls)
    pub file: PathBuf,
    /// Target table name (derived from the file name when absent)
    pub table: Option<String>,
    /// Store database file (configured store when absent)
    pub store: Option<PathBuf>,
    /// Replace an existing table instead of appending
    pub replace: bool,
    /// Rows per insert batch
    pub batch_size: Option<usize>,
}

/// Arguments for importing a directory
#[derive(Debug, Clone)]
pub struct ImportDirArgs {
    /// Directory containing .csv/.xls files
    pub directory: PathBuf,
    /// Store database file (configured store when absent)
    pub store: Option<PathBuf>,
    /// Replace existing tables instead of appending
    pub replace: bool,
}

/// Import one file into one table
pub fn handle_import_file(args: &ImportFileArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let options = build_options(args.table.clone(), args.replace, args.batch_size)?;

    let report = import_file(&store, &args.file, &options)?;
    print_report(&report);
    Ok(())
}

/// Import every supported file in a directory
pub fn handle_import_dir(args: &ImportDirArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let options = build_options(None, args.replace, None)?;

    let reports = import_directory(&store, &args.directory, &options)?;
    for report in &reports {
        print_report(report);
    }
    println!("Imported {} file(s) from {}", reports.len(), args.directory.display());
    Ok(())
}

fn build_options(
    table_name: Option<String>,
    replace: bool,
    batch_size: Option<usize>,
) -> Result<ImportOptions, CliError> {
    let cwd = std::env::current_dir()
        .map_err(|e| CliError::IoError(format!("Failed to resolve cwd: {}", e)))?;
    let config = EngineConfig::load(&cwd)?;

    let mut options = config.import_options();
    options.table_name = table_name;
    if replace {
        options.replace_existing = true;
    }
    if let Some(size) = batch_size {
        if size == 0 {
            return Err(CliError::InvalidArgument(
                "batch size must be at least 1".to_string(),
            ));
        }
        options.batch_size = size;
    }
    Ok(options)
}

fn print_report(report: &ImportReport) {
    println!(
        "{}: {} column(s), {} row(s) read, {} committed in {}ms",
        report.table,
        report.columns,
        report.rows_read,
        report.outcome.rows_committed,
        report.duration_ms
    );
    if let Some(failure) = &report.outcome.first_failure {
        eprintln!(
            "  batch starting at row {} failed: {}",
            failure.row_index, failure.message
        );
    }
}
