//! Delimited-text row source
//!
//! Comma-separated values with optional double-quote field quoting; a
//! quote inside a quoted field is escaped by doubling. Fields are trimmed
//! of surrounding whitespace. Fully blank physical lines are skipped and
//! never become zero-length rows.

use std::path::Path;

use csv::{ReaderBuilder, Trim};

use super::RawRow;
use crate::error::{EngineError, EngineResult};

/// Read every record of a delimited-text file as a [`RawRow`]
pub fn read_delimited(path: &Path) -> EngineResult<Vec<RawRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|e| EngineError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| {
            EngineError::UnsupportedFormat(format!(
                "{}: malformed delimited text: {}",
                path.display(),
                e
            ))
        })?;
        let row = RawRow::from_texts(record.iter());
        if !row.is_blank() {
            rows.push(row);
        }
    }

    Ok(rows)
}

/// Re-emit a row with the given separator, quoting fields that contain
/// the separator, a quote, or a line break. Null fields serialize as
/// empty. Inverse of the parse for quote-free inputs.
pub fn serialize_row(row: &RawRow, separator: char) -> String {
    row.fields()
        .iter()
        .map(|field| {
            let value = field.as_deref().unwrap_or("");
            if value.contains(separator) || value.contains('"') || value.contains('\n') {
                format!("\"{}\"", value.replace('"', "\"\""))
            } else {
                value.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(&separator.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_simple_file() {
        let file = write_csv("zeit,kwh\n2005-01-01 00:00:00,10\n2005-01-01 00:15:00,20\n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get(0), Some("zeit"));
        assert_eq!(rows[2].get(1), Some("20"));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let file = write_csv("a , b\n 1 ,2 \n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(rows[0].get(1), Some("b"));
        assert_eq!(rows[1].get(0), Some("1"));
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let file = write_csv("a,b\n\n1,2\n\n\n3,4\n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[test]
    fn test_quoted_fields_with_doubled_quotes() {
        let file = write_csv("name,note\nalpha,\"says \"\"hi\"\", twice\"\n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(rows[1].get(1), Some("says \"hi\", twice"));
    }

    #[test]
    fn test_short_rows_survive_parsing() {
        let file = write_csv("a,b,c\n1,2\n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn test_round_trip_without_quote_characters() {
        let file = write_csv("zeit,kwh,ort\n2005-01-01 00:00:00, 21.5 ,Haus A\n");
        let rows = read_delimited(file.path()).unwrap();
        assert_eq!(
            serialize_row(&rows[1], ','),
            "2005-01-01 00:00:00,21.5,Haus A"
        );
    }

    #[test]
    fn test_serialize_quotes_embedded_separator() {
        let row = RawRow::from_texts(["a,b", "plain"]);
        assert_eq!(serialize_row(&row, ','), "\"a,b\",plain");
    }

    #[test]
    fn test_serialize_null_field_as_empty() {
        let row = RawRow::from_texts(["a", "", "c"]);
        assert_eq!(serialize_row(&row, ','), "a,,c");
    }
}
