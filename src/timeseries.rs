//! Time-indexed lookups over imported tables
//!
//! Read-only point, range, and aggregate queries keyed by a timestamp
//! column. The target table and column must already exist — their absence
//! is a distinct error, never conflated with an empty result.

use chrono::NaiveDateTime;
use duckdb::types::Value;

use crate::error::{EngineError, EngineResult};
use crate::store::{QueryResult, Store};

/// Row with the greatest timestamp at or before `at`, or `None` when
/// every row lies after it
pub fn point_lookup(
    store: &Store,
    table: &str,
    timestamp_column: &str,
    at: NaiveDateTime,
) -> EngineResult<Option<serde_json::Value>> {
    check_target(store, table, &[timestamp_column])?;

    let sql = format!(
        "SELECT * FROM {table} \
         WHERE {col} = (SELECT MAX({col}) FROM {table} WHERE {col} <= CAST(? AS TIMESTAMP))",
        table = table,
        col = timestamp_column,
    );
    let result = store.query_params(&sql, &[timestamp_value(at)])?;
    Ok(result.rows.into_iter().next())
}

/// All rows with timestamp in the inclusive `[start, end]` window,
/// ordered ascending by the timestamp column
pub fn range_lookup(
    store: &Store,
    table: &str,
    timestamp_column: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> EngineResult<QueryResult> {
    check_target(store, table, &[timestamp_column])?;

    let sql = format!(
        "SELECT * FROM {table} \
         WHERE {col} >= CAST(? AS TIMESTAMP) AND {col} <= CAST(? AS TIMESTAMP) \
         ORDER BY {col} ASC",
        table = table,
        col = timestamp_column,
    );
    store.query_params(&sql, &[timestamp_value(start), timestamp_value(end)])
}

/// Sum of a numeric column over the inclusive `[start, end]` window, or
/// `None` when no row falls inside it
pub fn sum_over_range(
    store: &Store,
    table: &str,
    timestamp_column: &str,
    value_column: &str,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> EngineResult<Option<f64>> {
    check_target(store, table, &[timestamp_column, value_column])?;

    let sql = format!(
        "SELECT CAST(SUM({value}) AS DOUBLE) AS total FROM {table} \
         WHERE {col} >= CAST(? AS TIMESTAMP) AND {col} <= CAST(? AS TIMESTAMP)",
        value = value_column,
        table = table,
        col = timestamp_column,
    );
    let result = store.query_params(&sql, &[timestamp_value(start), timestamp_value(end)])?;
    Ok(result
        .rows
        .first()
        .and_then(|row| row.get("total"))
        .and_then(|v| v.as_f64()))
}

/// Verify table and columns exist before touching them
fn check_target(store: &Store, table: &str, columns: &[&str]) -> EngineResult<()> {
    if !store.table_exists(table)? {
        return Err(EngineError::NoSuchTable(table.to_string()));
    }
    for column in columns {
        if !store.column_exists(table, column)? {
            return Err(EngineError::NoSuchColumn(
                table.to_string(),
                column.to_string(),
            ));
        }
    }
    Ok(())
}

fn timestamp_value(ts: NaiveDateTime) -> Value {
    Value::Text(ts.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2005, 1, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn seeded_store() -> Store {
        let store = Store::in_memory().unwrap();
        store
            .execute("CREATE TABLE IF NOT EXISTS messwerte (zeit TIMESTAMP, kwh DOUBLE)")
            .unwrap();
        store
            .execute(
                "INSERT INTO messwerte VALUES \
                 ('2005-01-01 00:00:00', 10), ('2005-01-01 00:15:00', 20), \
                 ('2005-01-01 00:30:00', 30), ('2005-01-01 00:45:00', 40), \
                 ('2005-01-01 01:00:00', 50)",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_point_lookup_between_rows() {
        let store = seeded_store();
        let row = point_lookup(&store, "messwerte", "zeit", ts(0, 40))
            .unwrap()
            .expect("a row at or before 00:40");
        assert_eq!(row.get("kwh").unwrap().as_f64(), Some(30.0));
    }

    #[test]
    fn test_point_lookup_before_first_row_is_none() {
        let store = seeded_store();
        let row = point_lookup(
            &store,
            "messwerte",
            "zeit",
            NaiveDate::from_ymd_opt(2004, 12, 31)
                .unwrap()
                .and_hms_opt(23, 59, 0)
                .unwrap(),
        )
        .unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn test_point_lookup_after_last_row_is_last_row() {
        let store = seeded_store();
        let row = point_lookup(&store, "messwerte", "zeit", ts(9, 0))
            .unwrap()
            .expect("the last row");
        assert_eq!(row.get("kwh").unwrap().as_f64(), Some(50.0));
    }

    #[test]
    fn test_range_lookup_inclusive_and_ascending() {
        let store = seeded_store();
        let result = range_lookup(&store, "messwerte", "zeit", ts(0, 15), ts(0, 45)).unwrap();
        let values: Vec<f64> = result
            .rows
            .iter()
            .filter_map(|row| row.get("kwh").and_then(|v| v.as_f64()))
            .collect();
        assert_eq!(values, vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_sum_over_range() {
        let store = seeded_store();
        let total = sum_over_range(&store, "messwerte", "zeit", "kwh", ts(0, 15), ts(0, 45))
            .unwrap();
        assert_eq!(total, Some(90.0));

        let empty = sum_over_range(&store, "messwerte", "zeit", "kwh", ts(5, 0), ts(6, 0))
            .unwrap();
        assert_eq!(empty, None);
    }

    #[test]
    fn test_missing_table_and_column_are_distinct_errors() {
        let store = seeded_store();
        assert!(matches!(
            point_lookup(&store, "nothing", "zeit", ts(0, 0)).unwrap_err(),
            EngineError::NoSuchTable(_)
        ));
        assert!(matches!(
            point_lookup(&store, "messwerte", "volt", ts(0, 0)).unwrap_err(),
            EngineError::NoSuchColumn(_, _)
        ));
    }
}
