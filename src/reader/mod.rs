//! Row sources
//!
//! Parses a delimited-text file or a legacy binary workbook into an
//! ordered sequence of [`RawRow`]s. The first row of every source is the
//! header row. Format is chosen by file extension — an unknown extension
//! is an error, never a guess.

use std::path::Path;

use crate::error::{EngineError, EngineResult};

pub mod delimited;
pub mod workbook;

/// One parsed record: an ordered sequence of nullable text fields.
/// Blank and whitespace-only cells are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    fields: Vec<Option<String>>,
}

impl RawRow {
    pub fn new(fields: Vec<Option<String>>) -> Self {
        Self { fields }
    }

    /// Build a row from plain strings, mapping blanks to null fields
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = texts
            .into_iter()
            .map(|t| {
                let trimmed = t.as_ref().trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect();
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index`, or `None` past the end or for a null cell
    pub fn get(&self, index: usize) -> Option<&str> {
        self.fields.get(index).and_then(|f| f.as_deref())
    }

    pub fn fields(&self) -> &[Option<String>] {
        &self.fields
    }

    /// True when every field is null
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.is_none())
    }
}

/// Supported source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma-separated text with optional double-quote field quoting
    Delimited,
    /// Legacy binary workbook, first sheet only
    Workbook,
}

impl SourceFormat {
    /// Detect the format from a file extension. Anything unrecognized is
    /// an `UnsupportedFormat` error — there is no sniffing fallback.
    pub fn from_path(path: &Path) -> EngineResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "csv" => Ok(SourceFormat::Delimited),
            "xls" => Ok(SourceFormat::Workbook),
            "xlsx" => Err(EngineError::UnsupportedFormat(format!(
                "{}: XLSX workbooks are not supported, convert to XLS or CSV",
                path.display()
            ))),
            _ => Err(EngineError::UnsupportedFormat(format!(
                "{}: unrecognized extension",
                path.display()
            ))),
        }
    }
}

/// Read all rows from a tabular file, dispatching on its extension.
///
/// The returned sequence is finite and already materialized; the first
/// row (when any exist) is the header row.
pub fn read_rows(path: &Path) -> EngineResult<Vec<RawRow>> {
    match SourceFormat::from_path(path)? {
        SourceFormat::Delimited => delimited::read_delimited(path),
        SourceFormat::Workbook => workbook::read_workbook(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            SourceFormat::from_path(Path::new("data.csv")).unwrap(),
            SourceFormat::Delimited
        );
        assert_eq!(
            SourceFormat::from_path(Path::new("DATA.XLS")).unwrap(),
            SourceFormat::Workbook
        );
    }

    #[test]
    fn test_unknown_extension_is_an_error() {
        for name in ["data.txt", "data.xlsx", "data"] {
            let err = SourceFormat::from_path(&PathBuf::from(name)).unwrap_err();
            assert!(matches!(err, EngineError::UnsupportedFormat(_)), "{}", name);
        }
    }

    #[test]
    fn test_raw_row_blank_mapping() {
        let row = RawRow::from_texts(["a", "  ", "", "b "]);
        assert_eq!(row.len(), 4);
        assert_eq!(row.get(0), Some("a"));
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), None);
        assert_eq!(row.get(3), Some("b"));
        assert!(!row.is_blank());
        assert!(RawRow::from_texts(["", " "]).is_blank());
    }
}
