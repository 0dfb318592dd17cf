//! Column type inference
//!
//! Assigns one SQL type per column from the header name and the sampled
//! string values. Inference is best-effort: it widens monotonically and
//! falls back to TEXT rather than failing, so a surprising cell can never
//! abort an import.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Header tokens that suggest a timestamp column. Checked before the time
/// hints since "zeit" is a substring of "zeitstempel". The German entries
/// come from the energy-model exports this importer was built around.
const TIMESTAMP_HINTS: &[&str] = &["timestamp", "datetime", "zeitstempel", "datum", "date"];

/// Header tokens that suggest a time-of-day column
const TIME_HINTS: &[&str] = &["time", "uhrzeit", "zeit"];

/// Timestamp patterns in priority order; the first one that consumes the
/// entire value wins.
const TIMESTAMP_PATTERNS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

/// Date-only patterns, accepted for timestamp columns at midnight
const DATE_PATTERNS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Time-of-day patterns in priority order
const TIME_PATTERNS: &[&str] = &["%H:%M:%S", "%H:%M"];

/// SQL column type assigned by inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SqlType {
    Integer,
    Double,
    Time,
    Timestamp,
    Text,
}

impl SqlType {
    /// DDL type name for the store
    pub fn sql_name(&self) -> &'static str {
        match self {
            SqlType::Integer => "BIGINT",
            SqlType::Double => "DOUBLE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Text => "VARCHAR",
        }
    }

    /// Combine two observed types into the narrowest type that can hold
    /// both. Widening is monotone: the result is never narrower than
    /// either input, so re-observing samples can only generalize.
    pub fn widen(self, other: SqlType) -> SqlType {
        use SqlType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Integer, Double) | (Double, Integer) => Double,
            (Time, Timestamp) | (Timestamp, Time) => Timestamp,
            _ => Text,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Infer the SQL type for one column.
///
/// `samples` holds every non-blank value observed in the column; blank
/// cells were already dropped by the reader and carry no type evidence.
/// Header hints are tried first, then the numeric ladder, then TEXT.
pub fn infer_column_type(header: &str, samples: &[&str]) -> SqlType {
    let lowered = header.to_lowercase();

    if has_hint(&lowered, TIMESTAMP_HINTS) && samples.iter().all(|s| parse_timestamp(s).is_some())
    {
        return SqlType::Timestamp;
    }

    if has_hint(&lowered, TIME_HINTS) {
        let all_temporal = samples
            .iter()
            .all(|s| parse_time(s).is_some() || parse_timestamp(s).is_some());
        if all_temporal {
            // A date component in any sample promotes the whole column
            let any_dated = samples.iter().any(|s| parse_time(s).is_none());
            return if any_dated { SqlType::Timestamp } else { SqlType::Time };
        }
    }

    if samples.is_empty() {
        return SqlType::Text;
    }

    samples
        .iter()
        .map(|s| value_type(s))
        .fold(SqlType::Integer, SqlType::widen)
}

/// Type of one literal value on the numeric ladder
fn value_type(value: &str) -> SqlType {
    if value.parse::<i64>().is_ok() {
        SqlType::Integer
    } else if value.parse::<f64>().is_ok() {
        SqlType::Double
    } else {
        SqlType::Text
    }
}

fn has_hint(header: &str, hints: &[&str]) -> bool {
    hints.iter().any(|h| header.contains(h))
}

/// Parse a value as a timestamp, trying each pattern in priority order.
/// The pattern must consume the entire value; date-only values resolve to
/// midnight.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    for pattern in TIMESTAMP_PATTERNS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, pattern) {
            return Some(ts);
        }
    }
    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(value, pattern) {
            return Some(date.and_hms_opt(0, 0, 0).expect("midnight is valid"));
        }
    }
    None
}

/// Parse a value as a time of day, trying each pattern in priority order
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    for pattern in TIME_PATTERNS {
        if let Ok(t) = NaiveTime::parse_from_str(value, pattern) {
            return Some(t);
        }
    }
    None
}
