//! Embedded SQL store access
//!
//! Wraps one DuckDB connection for the import and query paths. Supports
//! file-backed and in-memory databases; the connection is released when
//! the [`Store`] is dropped, on every exit path.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::DateTime;
use duckdb::types::{TimeUnit, Value, ValueRef};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Handle to an embedded SQL store
///
/// One connection, guarded by a mutex. Imports and queries against the
/// same table must be serialized by the caller; separate stores (or
/// separate tables) are independent.
pub struct Store {
    /// Path to the database file (None for in-memory)
    path: Option<PathBuf>,
    conn: Mutex<duckdb::Connection>,
}

impl Store {
    /// Open a file-backed store, creating the file if needed
    pub fn open(path: impl AsRef<Path>) -> EngineResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = duckdb::Connection::open(&path).map_err(|e| {
            EngineError::Store(format!("Failed to open store at {}: {}", path.display(), e))
        })?;
        Ok(Self {
            path: Some(path),
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory store. Nothing survives the handle being dropped.
    pub fn in_memory() -> EngineResult<Self> {
        let conn = duckdb::Connection::open_in_memory()
            .map_err(|e| EngineError::Store(format!("Failed to open in-memory store: {}", e)))?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Database file path (None for in-memory)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) fn lock(&self) -> EngineResult<MutexGuard<'_, duckdb::Connection>> {
        self.conn
            .lock()
            .map_err(|e| EngineError::Store(format!("Connection lock poisoned: {}", e)))
    }

    /// Execute a statement that returns no rows
    pub fn execute(&self, sql: &str) -> EngineResult<usize> {
        let conn = self.lock()?;
        conn.execute(sql, [])
            .map_err(|e| EngineError::Store(format!("Execute failed: {}", e)))
    }

    /// Execute a SQL query and return all rows
    pub fn query(&self, sql: &str) -> EngineResult<QueryResult> {
        self.query_params(sql, &[])
    }

    /// Execute a parameterized SQL query (`?` placeholders)
    pub fn query_params(&self, sql: &str, params: &[Value]) -> EngineResult<QueryResult> {
        let start = std::time::Instant::now();
        let conn = self.lock()?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| EngineError::Store(format!("Prepare failed: {}", e)))?;

        let param_refs: Vec<&dyn duckdb::ToSql> =
            params.iter().map(|p| p as &dyn duckdb::ToSql).collect();

        // The result schema is only known after execution
        let mut raw_rows = stmt
            .query(param_refs.as_slice())
            .map_err(|e| EngineError::Store(format!("Query failed: {}", e)))?;

        let column_count = raw_rows.as_ref().map(|r| r.column_count()).unwrap_or(0);
        let columns: Vec<String> = (0..column_count)
            .map(|i| {
                raw_rows
                    .as_ref()
                    .and_then(|r| r.column_name(i).ok())
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| format!("col{}", i))
            })
            .collect();

        let mut rows = Vec::new();
        while let Some(row) = raw_rows
            .next()
            .map_err(|e| EngineError::Store(format!("Row fetch failed: {}", e)))?
        {
            let mut object = serde_json::Map::new();
            for (i, name) in columns.iter().enumerate() {
                let value = match row.get_ref(i) {
                    Ok(value_ref) => value_ref_to_json(value_ref),
                    Err(_) => serde_json::Value::Null,
                };
                object.insert(name.clone(), value);
            }
            rows.push(serde_json::Value::Object(object));
        }

        Ok(QueryResult {
            columns,
            rows,
            execution_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Check whether a table exists
    pub fn table_exists(&self, table: &str) -> EngineResult<bool> {
        let result = self.query_params(
            "SELECT table_name FROM information_schema.tables WHERE table_name = ?",
            &[Value::Text(table.to_string())],
        )?;
        Ok(!result.rows.is_empty())
    }

    /// Check whether a column exists on a table
    pub fn column_exists(&self, table: &str, column: &str) -> EngineResult<bool> {
        let result = self.query_params(
            "SELECT column_name FROM information_schema.columns \
             WHERE table_name = ? AND column_name = ?",
            &[
                Value::Text(table.to_string()),
                Value::Text(column.to_string()),
            ],
        )?;
        Ok(!result.rows.is_empty())
    }

    /// Names of all user tables, sorted
    pub fn list_tables(&self) -> EngineResult<Vec<String>> {
        let result = self.query(
            "SELECT table_name FROM information_schema.tables \
             WHERE table_schema = 'main' ORDER BY table_name",
        )?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get("table_name"))
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect())
    }

    /// Number of rows in a table
    pub fn count_rows(&self, table: &str) -> EngineResult<u64> {
        if !self.table_exists(table)? {
            return Err(EngineError::NoSuchTable(table.to_string()));
        }
        let result = self.query(&format!("SELECT COUNT(*) AS n FROM {}", table))?;
        Ok(result
            .rows
            .first()
            .and_then(|row| row.get("n"))
            .and_then(|v| v.as_u64())
            .unwrap_or(0))
    }

    /// First `max_rows` rows of a table, for display. Not part of the core
    /// import/query path — this is where the LIMIT dialect assumption lives.
    pub fn preview(&self, table: &str, max_rows: usize) -> EngineResult<QueryResult> {
        if !self.table_exists(table)? {
            return Err(EngineError::NoSuchTable(table.to_string()));
        }
        self.query(&format!("SELECT * FROM {} LIMIT {}", table, max_rows))
    }
}

/// Convert one stored value to JSON for the opaque row representation
fn value_ref_to_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Boolean(b) => serde_json::Value::Bool(b),
        ValueRef::TinyInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::SmallInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::Int(i) => serde_json::Value::Number(i.into()),
        ValueRef::BigInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::UTinyInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::USmallInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::UInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::UBigInt(i) => serde_json::Value::Number(i.into()),
        ValueRef::Float(f) => serde_json::Number::from_f64(f as f64)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Double(f) => serde_json::Number::from_f64(f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        // i128 aggregates may not fit a JSON number
        ValueRef::HugeInt(i) => serde_json::Value::String(i.to_string()),
        ValueRef::Decimal(d) => serde_json::Value::String(d.to_string()),
        ValueRef::Text(bytes) => String::from_utf8_lossy(bytes).into_owned().into(),
        ValueRef::Timestamp(unit, raw) => serde_json::Value::String(format_timestamp(unit, raw)),
        ValueRef::Time64(unit, raw) => serde_json::Value::String(format_time(unit, raw)),
        ValueRef::Date32(days) => serde_json::Value::String(format_date(days)),
        other => serde_json::Value::String(format!("{:?}", other)),
    }
}

fn to_micros(unit: TimeUnit, raw: i64) -> i64 {
    match unit {
        TimeUnit::Second => raw.saturating_mul(1_000_000),
        TimeUnit::Millisecond => raw.saturating_mul(1_000),
        TimeUnit::Microsecond => raw,
        TimeUnit::Nanosecond => raw / 1_000,
    }
}

fn format_timestamp(unit: TimeUnit, raw: i64) -> String {
    DateTime::from_timestamp_micros(to_micros(unit, raw))
        .map(|ts| ts.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn format_time(unit: TimeUnit, raw: i64) -> String {
    let micros = to_micros(unit, raw);
    let seconds = (micros / 1_000_000) as u32;
    chrono::NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn format_date(days: i32) -> String {
    DateTime::from_timestamp(i64::from(days) * 86_400, 0)
        .map(|ts| ts.naive_utc().date().format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| days.to_string())
}

/// Query result set: column names plus rows as JSON objects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names in result order
    pub columns: Vec<String>,
    /// Rows of data, one JSON object per row
    pub rows: Vec<serde_json::Value>,
    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl QueryResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Value of `column` in row `index`, Null when absent
    pub fn value(&self, index: usize, column: &str) -> &serde_json::Value {
        self.rows
            .get(index)
            .and_then(|row| row.get(column))
            .unwrap_or(&serde_json::Value::Null)
    }
}

/// Output format for rendering query results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// ASCII table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Render query results for display
pub fn format_query_result(result: &QueryResult, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result.rows).unwrap_or_else(|_| "[]".to_string())
        }
        OutputFormat::Csv => format_as_csv(result),
        OutputFormat::Table => format_as_table(result),
    }
}

fn display_value(value: &serde_json::Value, null_text: &str) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => null_text.to_string(),
        other => other.to_string(),
    }
}

fn format_as_csv(result: &QueryResult) -> String {
    let mut output = String::new();
    output.push_str(&result.columns.join(","));
    output.push('\n');

    for row in &result.rows {
        let values: Vec<String> = result
            .columns
            .iter()
            .map(|col| {
                let text = display_value(row.get(col).unwrap_or(&serde_json::Value::Null), "");
                if text.contains(',') || text.contains('"') || text.contains('\n') {
                    format!("\"{}\"", text.replace('"', "\"\""))
                } else {
                    text
                }
            })
            .collect();
        output.push_str(&values.join(","));
        output.push('\n');
    }

    output
}

fn format_as_table(result: &QueryResult) -> String {
    if result.is_empty() {
        return "(0 rows)".to_string();
    }

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.len()).collect();
    for row in &result.rows {
        for (i, col) in result.columns.iter().enumerate() {
            let len = display_value(row.get(col).unwrap_or(&serde_json::Value::Null), "null").len();
            widths[i] = widths[i].max(len);
        }
    }

    let mut output = String::new();

    let header: Vec<String> = result
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:width$}", c, width = widths[i]))
        .collect();
    output.push_str(&header.join(" | "));
    output.push('\n');

    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    output.push_str(&separator.join("-+-"));
    output.push('\n');

    for row in &result.rows {
        let values: Vec<String> = result
            .columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let text =
                    display_value(row.get(col).unwrap_or(&serde_json::Value::Null), "null");
                format!("{:width$}", text, width = widths[i])
            })
            .collect();
        output.push_str(&values.join(" | "));
        output.push('\n');
    }

    output.push_str(&format!("({} rows)", result.row_count()));
    output
}
