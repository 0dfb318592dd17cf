//! Batched row loading
//!
//! Binds raw rows positionally to a [`TableTarget`] and commits them in
//! fixed-size batches, each submitted as one store transaction. Typing is
//! a hint, not a hard constraint: a cell that refuses its column's type
//! becomes NULL instead of sinking the row. Batches already committed
//! stay committed when a later batch fails; nothing is retried.

use duckdb::types::Value;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::infer::{SqlType, parse_time, parse_timestamp};
use crate::reader::RawRow;
use crate::schema::TableTarget;
use crate::store::Store;

/// Default number of rows per insert batch
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Accounting for one `load` call, consumed by the caller for logging and
/// tests. Never retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchOutcome {
    /// Rows handed to the loader
    pub rows_attempted: usize,
    /// Rows durably committed
    pub rows_committed: usize,
    /// First failing row (absolute index within this call) and the store's
    /// message, when a batch failed
    pub first_failure: Option<BatchFailure>,
}

impl BatchOutcome {
    /// True when every attempted row committed
    pub fn is_complete(&self) -> bool {
        self.first_failure.is_none() && self.rows_committed == self.rows_attempted
    }
}

/// Position and cause of the first failed batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Index of the first row of the failed batch, relative to the rows
    /// passed to `load`
    pub row_index: usize,
    /// Store error message
    pub message: String,
}

/// Load rows into the target table in batches of `batch_size`.
///
/// Each batch commits or rolls back as a unit; on the first failed batch
/// the loader records the failure and stops. Rows wider than the target
/// are truncated, narrower ones padded with NULL — both logged.
pub fn load(
    store: &Store,
    target: &TableTarget,
    rows: &[RawRow],
    batch_size: usize,
) -> EngineResult<BatchOutcome> {
    target.validate()?;
    let batch_size = batch_size.max(1);

    let mut outcome = BatchOutcome {
        rows_attempted: rows.len(),
        rows_committed: 0,
        first_failure: None,
    };

    let mut truncated = 0usize;
    let mut padded = 0usize;
    let insert_sql = target.insert_sql();

    for (batch_index, batch) in rows.chunks(batch_size).enumerate() {
        let base = batch_index * batch_size;
        match insert_batch(store, target, &insert_sql, batch, &mut truncated, &mut padded) {
            Ok(()) => outcome.rows_committed += batch.len(),
            Err(message) => {
                tracing::warn!(
                    table = %target.name,
                    batch = batch_index,
                    "batch failed, stopping load: {}",
                    message
                );
                outcome.first_failure = Some(BatchFailure {
                    row_index: base,
                    message,
                });
                break;
            }
        }
    }

    if truncated > 0 || padded > 0 {
        tracing::warn!(
            table = %target.name,
            truncated,
            padded,
            "normalized row widths to {} columns",
            target.columns.len()
        );
    }

    Ok(outcome)
}

/// Insert one batch inside a single transaction. Returns the store's
/// message on failure, after rolling back.
fn insert_batch(
    store: &Store,
    target: &TableTarget,
    insert_sql: &str,
    batch: &[RawRow],
    truncated: &mut usize,
    padded: &mut usize,
) -> Result<(), String> {
    let conn = store.lock().map_err(|e| e.to_string())?;

    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| e.to_string())?;

    let result = (|| -> Result<(), String> {
        let mut stmt = conn.prepare(insert_sql).map_err(|e| e.to_string())?;
        for row in batch {
            if row.len() > target.columns.len() {
                *truncated += 1;
            } else if row.len() < target.columns.len() {
                *padded += 1;
            }
            let values = bind_row(target, row);
            let refs: Vec<&dyn duckdb::ToSql> =
                values.iter().map(|v| v as &dyn duckdb::ToSql).collect();
            stmt.execute(refs.as_slice()).map_err(|e| e.to_string())?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => conn.execute_batch("COMMIT").map_err(|e| e.to_string()),
        Err(message) => {
            // Whole batch counts as not-committed
            let _ = conn.execute_batch("ROLLBACK");
            Err(message)
        }
    }
}

/// Bind one row positionally, normalizing its width to the target's
fn bind_row(target: &TableTarget, row: &RawRow) -> Vec<Value> {
    target
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| bind_cell(row.get(index), column.sql_type))
        .collect()
}

/// Coerce one cell to its column type. A value the type cannot hold is
/// stored as NULL and logged — never an error.
fn bind_cell(cell: Option<&str>, sql_type: SqlType) -> Value {
    let Some(text) = cell else {
        return Value::Null;
    };

    match sql_type {
        SqlType::Integer => match text.parse::<i64>() {
            Ok(i) => Value::BigInt(i),
            Err(_) => coercion_fallback(text, sql_type),
        },
        SqlType::Double => match text.parse::<f64>() {
            Ok(f) => Value::Double(f),
            Err(_) => coercion_fallback(text, sql_type),
        },
        SqlType::Timestamp => match parse_timestamp(text) {
            Some(ts) => Value::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string()),
            None => coercion_fallback(text, sql_type),
        },
        SqlType::Time => match parse_time(text) {
            Some(t) => Value::Text(t.format("%H:%M:%S").to_string()),
            None => coercion_fallback(text, sql_type),
        },
        SqlType::Text => Value::Text(text.to_string()),
    }
}

fn coercion_fallback(text: &str, sql_type: SqlType) -> Value {
    tracing::debug!("cell {:?} does not coerce to {}, storing NULL", text, sql_type);
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ensure_table;

    fn sample_target() -> TableTarget {
        let header = RawRow::from_texts(["zeit", "kwh"]);
        let rows = vec![RawRow::from_texts(["2005-01-01 00:00:00", "10"])];
        TableTarget::from_rows("messwerte", &header, &rows)
    }

    #[test]
    fn test_bind_cell_coercions() {
        assert_eq!(bind_cell(Some("42"), SqlType::Integer), Value::BigInt(42));
        assert_eq!(bind_cell(Some("4.5"), SqlType::Double), Value::Double(4.5));
        assert_eq!(bind_cell(None, SqlType::Integer), Value::Null);
        // Coercion failure stores NULL, never errors
        assert_eq!(bind_cell(Some("broken"), SqlType::Integer), Value::Null);
        assert_eq!(bind_cell(Some("broken"), SqlType::Double), Value::Null);
        assert_eq!(bind_cell(Some("broken"), SqlType::Timestamp), Value::Null);
    }

    #[test]
    fn test_bind_cell_canonicalizes_temporal_text() {
        assert_eq!(
            bind_cell(Some("01.02.2005 16:30"), SqlType::Timestamp),
            Value::Text("2005-02-01 16:30:00".to_string())
        );
        assert_eq!(
            bind_cell(Some("16:30"), SqlType::Time),
            Value::Text("16:30:00".to_string())
        );
    }

    #[test]
    fn test_load_commits_all_rows() {
        let store = Store::in_memory().unwrap();
        let target = sample_target();
        ensure_table(&store, &target, false).unwrap();

        let rows: Vec<RawRow> = (0..5)
            .map(|i| {
                RawRow::from_texts([
                    format!("2005-01-01 {:02}:{:02}:00", i * 15 / 60, i * 15 % 60),
                    format!("{}", (i + 1) * 10),
                ])
            })
            .collect();

        let outcome = load(&store, &target, &rows, DEFAULT_BATCH_SIZE).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.rows_committed, 5);
        assert_eq!(store.count_rows("messwerte").unwrap(), 5);
    }

    #[test]
    fn test_load_normalizes_row_widths() {
        let store = Store::in_memory().unwrap();
        let target = sample_target();
        ensure_table(&store, &target, false).unwrap();

        let rows = vec![
            // Too wide: the extra cell is dropped
            RawRow::from_texts(["2005-01-01 00:00:00", "10", "extra"]),
            // Too narrow: kwh becomes NULL
            RawRow::from_texts(["2005-01-01 00:15:00"]),
        ];
        let outcome = load(&store, &target, &rows, DEFAULT_BATCH_SIZE).unwrap();
        assert_eq!(outcome.rows_committed, 2);

        let result = store
            .query("SELECT kwh FROM messwerte ORDER BY zeit")
            .unwrap();
        assert_eq!(result.value(0, "kwh"), 10);
        assert!(result.value(1, "kwh").is_null());
    }

    #[test]
    fn test_load_in_multiple_batches() {
        let store = Store::in_memory().unwrap();
        let target = sample_target();
        ensure_table(&store, &target, false).unwrap();

        let rows: Vec<RawRow> = (0..25)
            .map(|i| RawRow::from_texts([format!("2005-01-{:02} 00:00:00", i % 28 + 1), i.to_string()]))
            .collect();

        let outcome = load(&store, &target, &rows, 10).unwrap();
        assert_eq!(outcome.rows_attempted, 25);
        assert_eq!(outcome.rows_committed, 25);
        assert_eq!(store.count_rows("messwerte").unwrap(), 25);
    }

    #[test]
    fn test_empty_load_is_complete() {
        let store = Store::in_memory().unwrap();
        let target = sample_target();
        ensure_table(&store, &target, false).unwrap();
        let outcome = load(&store, &target, &[], DEFAULT_BATCH_SIZE).unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.rows_attempted, 0);
    }
}
