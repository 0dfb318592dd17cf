//! Table schema derivation and management
//!
//! Builds a [`TableTarget`] from a header row plus sampled data rows, and
//! creates or replaces the backing table idempotently. Column order in
//! the created table matches the [`ColumnSpec`] sequence exactly; the
//! loader relies on that for positional binding.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::identifier::{MAX_IDENTIFIER_LEN, sanitize_identifier};
use crate::infer::{SqlType, infer_column_type};
use crate::reader::RawRow;
use crate::store::Store;

/// One column of an import target: the declared source name, the
/// store-legal name derived from it, and the inferred SQL type.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name as declared in the source header
    pub source_name: String,
    /// Sanitized, collision-free identifier
    pub name: String,
    /// Inferred SQL type
    pub sql_type: SqlType,
}

/// Target table of one import operation
///
/// Owned by a single import; concurrent imports into the same logical
/// table need external serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTarget {
    /// Sanitized table name
    pub name: String,
    /// Columns in source order
    pub columns: Vec<ColumnSpec>,
}

impl TableTarget {
    /// Build the target from a header row and the materialized data rows.
    ///
    /// Headers are sanitized; a sanitized name already taken by an earlier
    /// column gets a positional `_{n}` suffix so reruns stay reproducible.
    /// Types come from scanning every non-blank value per column.
    pub fn from_rows(table: &str, header: &RawRow, rows: &[RawRow]) -> Self {
        let mut used: Vec<String> = Vec::with_capacity(header.len());
        let mut columns = Vec::with_capacity(header.len());

        for index in 0..header.len() {
            let source_name = header.get(index).unwrap_or("").to_string();
            let mut name = sanitize_identifier(&source_name);
            if used.contains(&name) {
                name = positional_suffix(&name, index + 1);
            }
            used.push(name.clone());

            let samples: Vec<&str> = rows.iter().filter_map(|row| row.get(index)).collect();
            let sql_type = infer_column_type(&source_name, &samples);

            columns.push(ColumnSpec {
                source_name,
                name,
                sql_type,
            });
        }

        Self {
            name: sanitize_identifier(table),
            columns,
        }
    }

    /// Idempotent creation DDL
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type.sql_name()))
            .collect();
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            columns.join(", ")
        )
    }

    /// Idempotent drop DDL
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", self.name)
    }

    /// Positional insert DML with one placeholder per column
    pub fn insert_sql(&self) -> String {
        let names: Vec<&str> = self.columns.iter().map(|c| c.name.as_str()).collect();
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.name,
            names.join(", "),
            placeholders
        )
    }

    /// Reject targets that cannot be expressed as DDL: an empty table or
    /// column name, or two source columns collapsing onto one identifier.
    pub fn validate(&self) -> EngineResult<()> {
        if self.name.is_empty() {
            return Err(EngineError::SchemaConflict("empty table name".to_string()));
        }
        if self.columns.is_empty() {
            return Err(EngineError::SchemaConflict(format!(
                "table {} has no columns",
                self.name
            )));
        }

        let mut seen: HashMap<&str, &str> = HashMap::new();
        for column in &self.columns {
            if column.name.is_empty() {
                return Err(EngineError::SchemaConflict(format!(
                    "column {:?} sanitizes to an empty name",
                    column.source_name
                )));
            }
            if let Some(previous_source) = seen.insert(&column.name, &column.source_name) {
                return Err(EngineError::SchemaConflict(format!(
                    "columns {:?} and {:?} both map to identifier {:?}",
                    previous_source, column.source_name, column.name
                )));
            }
        }
        Ok(())
    }
}

fn positional_suffix(name: &str, position: usize) -> String {
    let suffix = format!("_{}", position);
    let mut base = name.to_string();
    base.truncate(MAX_IDENTIFIER_LEN - suffix.len());
    format!("{}{}", base, suffix)
}

/// Create the target table, dropping any existing one first when asked.
///
/// Validation failures abort before any DDL reaches the store. Creation
/// is idempotent: calling twice with the same target neither fails nor
/// duplicates columns.
pub fn ensure_table(store: &Store, target: &TableTarget, drop_first: bool) -> EngineResult<()> {
    target.validate()?;

    if drop_first {
        store.execute(&target.drop_sql())?;
        tracing::debug!(table = %target.name, "dropped existing table before import");
    }

    store.execute(&target.create_sql())?;
    tracing::info!(
        table = %target.name,
        columns = target.columns.len(),
        "ensured table"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_from(header: &[&str], rows: &[&[&str]]) -> TableTarget {
        let header = RawRow::from_texts(header.iter().copied());
        let rows: Vec<RawRow> = rows
            .iter()
            .map(|r| RawRow::from_texts(r.iter().copied()))
            .collect();
        TableTarget::from_rows("sample_csv", &header, &rows)
    }

    #[test]
    fn test_from_rows_infers_per_column() {
        let target = target_from(
            &["zeit", "kWh", "Ort"],
            &[
                &["2005-01-01 00:00:00", "10.5", "Haus A"],
                &["2005-01-01 00:15:00", "11", "Haus B"],
            ],
        );
        assert_eq!(target.name, "sample_csv");
        assert_eq!(target.columns.len(), 3);
        assert_eq!(target.columns[0].name, "zeit");
        assert_eq!(target.columns[0].sql_type, SqlType::Timestamp);
        assert_eq!(target.columns[1].name, "kwh");
        assert_eq!(target.columns[1].sql_type, SqlType::Double);
        assert_eq!(target.columns[2].sql_type, SqlType::Text);
    }

    #[test]
    fn test_duplicate_headers_get_positional_suffix() {
        let target = target_from(&["Wert", "wert", "WERT"], &[&["1", "2", "3"]]);
        let names: Vec<&str> = target.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["wert", "wert_2", "wert_3"]);
        // Reruns produce the same disambiguation
        let rerun = target_from(&["Wert", "wert", "WERT"], &[&["1", "2", "3"]]);
        assert_eq!(target, rerun);
    }

    #[test]
    fn test_create_sql_preserves_column_order() {
        let target = target_from(&["zeit", "kwh"], &[&["2005-01-01 00:00:00", "10"]]);
        assert_eq!(
            target.create_sql(),
            "CREATE TABLE IF NOT EXISTS sample_csv (zeit TIMESTAMP, kwh BIGINT)"
        );
        assert_eq!(target.drop_sql(), "DROP TABLE IF EXISTS sample_csv");
        assert_eq!(
            target.insert_sql(),
            "INSERT INTO sample_csv (zeit, kwh) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_validate_rejects_hand_built_duplicates() {
        let target = TableTarget {
            name: "t".to_string(),
            columns: vec![
                ColumnSpec {
                    source_name: "A".to_string(),
                    name: "a".to_string(),
                    sql_type: SqlType::Text,
                },
                ColumnSpec {
                    source_name: "a ".to_string(),
                    name: "a".to_string(),
                    sql_type: SqlType::Text,
                },
            ],
        };
        assert!(matches!(
            target.validate().unwrap_err(),
            EngineError::SchemaConflict(_)
        ));
    }

    #[test]
    fn test_validate_rejects_empty_column_name() {
        let target = TableTarget {
            name: "t".to_string(),
            columns: vec![ColumnSpec {
                source_name: "x".to_string(),
                name: String::new(),
                sql_type: SqlType::Text,
            }],
        };
        assert!(matches!(
            target.validate().unwrap_err(),
            EngineError::SchemaConflict(_)
        ));
    }

    #[test]
    fn test_ensure_table_is_idempotent() {
        let store = Store::in_memory().unwrap();
        let target = target_from(&["zeit", "kwh"], &[&["2005-01-01 00:00:00", "10"]]);

        ensure_table(&store, &target, false).unwrap();
        ensure_table(&store, &target, false).unwrap();

        assert!(store.table_exists("sample_csv").unwrap());
        let preview = store.preview("sample_csv", 1).unwrap();
        assert_eq!(preview.columns, vec!["zeit", "kwh"]);
    }

    #[test]
    fn test_ensure_table_drop_first_tolerates_absence() {
        let store = Store::in_memory().unwrap();
        let target = target_from(&["a"], &[&["1"]]);
        ensure_table(&store, &target, true).unwrap();
        assert!(store.table_exists("sample_csv").unwrap());
    }
}
