//! Legacy binary workbook row source
//!
//! Reads the first sheet of an XLS workbook. Structurally absent rows are
//! skipped, except that the header position is always reserved: a sheet
//! with no usable content yields one synthesized empty-header row instead
//! of failing. Formula cells surface as their cached results; integral
//! numeric cells render as integer text.

use std::path::Path;

use calamine::{Data, DataType, Reader, Xls, open_workbook};

use super::RawRow;
use crate::error::{EngineError, EngineResult};

/// Read every populated row of the first sheet as a [`RawRow`]
pub fn read_workbook(path: &Path) -> EngineResult<Vec<RawRow>> {
    let mut workbook: Xls<_> = open_workbook(path).map_err(|e| {
        EngineError::UnsupportedFormat(format!(
            "{}: not a readable XLS workbook: {}",
            path.display(),
            e
        ))
    })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| {
            EngineError::UnsupportedFormat(format!("{}: workbook has no sheets", path.display()))
        })?
        .map_err(|e| {
            EngineError::UnsupportedFormat(format!(
                "{}: failed to read first sheet: {}",
                path.display(),
                e
            ))
        })?;

    let mut rows = Vec::new();
    for sheet_row in range.rows() {
        let mut fields: Vec<Option<String>> = sheet_row.iter().map(cell_to_text).collect();
        // Drop trailing empty cells so ragged sheets keep their true width
        while fields.last().is_some_and(|f| f.is_none()) {
            fields.pop();
        }
        if !fields.is_empty() {
            rows.push(RawRow::new(fields));
        }
    }

    // The header position is reserved even when the sheet offers nothing
    if rows.is_empty() {
        rows.push(RawRow::default());
    }

    Ok(rows)
}

/// Render one workbook cell as text, or `None` for a blank cell.
///
/// The match is exhaustive over the cell kinds; formulas never appear
/// here because the reader resolves them to their cached results.
fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(render_number(*f)),
        Data::Bool(b) => Some(b.to_string()),
        Data::Error(e) => {
            tracing::debug!("workbook error cell treated as blank: {:?}", e);
            None
        }
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Some(s.clone()),
    }
}

/// Mathematically integral numbers render as integer text
fn render_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_floats_render_as_integer_text() {
        assert_eq!(cell_to_text(&Data::Float(21.0)), Some("21".to_string()));
        assert_eq!(cell_to_text(&Data::Float(-3.0)), Some("-3".to_string()));
    }

    #[test]
    fn test_fractional_floats_keep_their_fraction() {
        assert_eq!(cell_to_text(&Data::Float(21.5)), Some("21.5".to_string()));
    }

    #[test]
    fn test_blank_and_error_cells_are_null() {
        assert_eq!(cell_to_text(&Data::Empty), None);
        assert_eq!(cell_to_text(&Data::String("   ".to_string())), None);
        assert_eq!(
            cell_to_text(&Data::Error(calamine::CellErrorType::Div0)),
            None
        );
    }

    #[test]
    fn test_text_and_bool_cells() {
        assert_eq!(
            cell_to_text(&Data::String(" Haus A ".to_string())),
            Some("Haus A".to_string())
        );
        assert_eq!(cell_to_text(&Data::Bool(true)), Some("true".to_string()));
        assert_eq!(cell_to_text(&Data::Int(7)), Some("7".to_string()));
    }

    #[test]
    fn test_missing_file_is_unsupported_format() {
        let err = read_workbook(Path::new("/nonexistent/file.xls")).unwrap_err();
        assert!(matches!(err, EngineError::UnsupportedFormat(_)));
    }
}
