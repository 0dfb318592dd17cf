//! Query CLI commands
//!
//! Table inspection plus the time-indexed lookups, printed through the
//! shared result formatters.

use std::path::PathBuf;

use chrono::NaiveDateTime;

use crate::infer::parse_timestamp;
use crate::store::{OutputFormat, QueryResult, format_query_result};
use crate::timeseries::{point_lookup, range_lookup, sum_over_range};

use crate::cli::error::CliError;

use super::open_store;

/// Arguments for showing the head of a table
#[derive(Debug, Clone)]
pub struct ShowTableArgs {
    pub table: String,
    pub max_rows: usize,
    pub store: Option<PathBuf>,
    pub format: String,
}

/// Arguments for a point lookup
#[derive(Debug, Clone)]
pub struct PointArgs {
    pub table: String,
    pub column: String,
    pub at: String,
    pub store: Option<PathBuf>,
}

/// Arguments for a range lookup
#[derive(Debug, Clone)]
pub struct RangeArgs {
    pub table: String,
    pub column: String,
    pub start: String,
    pub end: String,
    pub store: Option<PathBuf>,
    pub format: String,
}

/// Arguments for a range sum
#[derive(Debug, Clone)]
pub struct SumArgs {
    pub table: String,
    pub timestamp_column: String,
    pub value_column: String,
    pub start: String,
    pub end: String,
    pub store: Option<PathBuf>,
}

/// Print the first rows of a table
pub fn handle_show_table(args: &ShowTableArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let format = parse_format(&args.format)?;
    let result = store.preview(&args.table, args.max_rows)?;
    println!("{}", format_query_result(&result, format));
    Ok(())
}

/// List all tables in the store
pub fn handle_list_tables(store_path: &Option<PathBuf>) -> Result<(), CliError> {
    let store = open_store(store_path)?;
    let tables = store.list_tables()?;
    if tables.is_empty() {
        println!("(no tables)");
    }
    for table in tables {
        println!("{}", table);
    }
    Ok(())
}

/// Row with the greatest timestamp at or before the given one
pub fn handle_point(args: &PointArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let at = parse_cli_timestamp(&args.at)?;
    match point_lookup(&store, &args.table, &args.column, at)? {
        Some(row) => println!("{}", serde_json::to_string_pretty(&row).unwrap_or_default()),
        None => println!("(not found)"),
    }
    Ok(())
}

/// All rows inside an inclusive timestamp window
pub fn handle_range(args: &RangeArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let format = parse_format(&args.format)?;
    let (start, end) = parse_window(&args.start, &args.end)?;
    let result: QueryResult = range_lookup(&store, &args.table, &args.column, start, end)?;
    println!("{}", format_query_result(&result, format));
    Ok(())
}

/// Sum of a numeric column inside an inclusive timestamp window
pub fn handle_sum(args: &SumArgs) -> Result<(), CliError> {
    let store = open_store(&args.store)?;
    let (start, end) = parse_window(&args.start, &args.end)?;
    match sum_over_range(
        &store,
        &args.table,
        &args.timestamp_column,
        &args.value_column,
        start,
        end,
    )? {
        Some(total) => println!("{}", total),
        None => println!("(no rows in range)"),
    }
    Ok(())
}

fn parse_format(format: &str) -> Result<OutputFormat, CliError> {
    format.parse().map_err(CliError::InvalidArgument)
}

fn parse_cli_timestamp(value: &str) -> Result<NaiveDateTime, CliError> {
    parse_timestamp(value).ok_or_else(|| {
        CliError::InvalidArgument(format!(
            "{:?} is not a timestamp (expected e.g. 2005-01-01 16:30:00)",
            value
        ))
    })
}

fn parse_window(start: &str, end: &str) -> Result<(NaiveDateTime, NaiveDateTime), CliError> {
    let start = parse_cli_timestamp(start)?;
    let end = parse_cli_timestamp(end)?;
    if end < start {
        return Err(CliError::InvalidArgument(
            "range end lies before range start".to_string(),
        ));
    }
    Ok((start, end))
}
