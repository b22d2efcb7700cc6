use std::fmt;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};

const DATETIME_FORMAT: &[FormatItem<'_>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_FORMAT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

/// One cell of an extracted table.
///
/// A column may legally mix `Null` with one non-null variant; mixing several
/// non-null variants is an anomaly that type inference reports as
/// [`ColumnType::Mixed`].
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Timestamp(PrimitiveDateTime),
}

impl CellValue {
    /// Interpret a raw text field from an external export.
    ///
    /// Empty fields are null. Numeric and timestamp shapes are promoted;
    /// everything else stays text.
    pub fn parse_text(raw: &str) -> CellValue {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Null;
        }
        // Zero-padded digit runs are identifiers (codes, zip-likes), not
        // numbers; promoting them would drop the padding.
        if !is_zero_padded(trimmed) {
            if let Ok(value) = trimmed.parse::<i64>() {
                return CellValue::Int(value);
            }
            if looks_numeric(trimmed) {
                if let Ok(value) = trimmed.parse::<f64>() {
                    return CellValue::Float(value);
                }
            }
        }
        if let Some(value) = parse_timestamp(trimmed) {
            return CellValue::Timestamp(value);
        }
        CellValue::Text(trimmed.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// The column type this single cell implies.
    pub fn column_type(&self) -> ColumnType {
        match self {
            CellValue::Null => ColumnType::Null,
            CellValue::Int(_) => ColumnType::Int,
            CellValue::Float(_) => ColumnType::Float,
            CellValue::Bool(_) => ColumnType::Bool,
            CellValue::Text(_) => ColumnType::Text,
            CellValue::Timestamp(_) => ColumnType::Timestamp,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Int(value) => write!(f, "{value}"),
            CellValue::Float(value) => write!(f, "{value}"),
            CellValue::Bool(value) => write!(f, "{value}"),
            CellValue::Text(value) => write!(f, "{value}"),
            CellValue::Timestamp(value) => {
                let rendered = value.format(DATETIME_FORMAT).map_err(|_| fmt::Error)?;
                write!(f, "{rendered}")
            }
        }
    }
}

/// Parse the timestamp shapes external exports emit.
pub(crate) fn parse_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    if let Ok(value) = PrimitiveDateTime::parse(raw, DATETIME_FORMAT) {
        return Some(value);
    }
    if let Ok(value) = Date::parse(raw, DATE_FORMAT) {
        return Some(value.midnight());
    }
    None
}

fn looks_numeric(raw: &str) -> bool {
    raw.bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
}

fn is_zero_padded(raw: &str) -> bool {
    raw.len() > 1 && raw.starts_with('0') && raw.bytes().all(|b| b.is_ascii_digit())
}

/// Per-column inferred type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// No non-null value seen.
    Null,
    Int,
    Float,
    Bool,
    Text,
    Timestamp,
    /// More than one non-null type in the column. Reported, never repaired.
    Mixed,
}

impl ColumnType {
    /// Combine the type seen so far with the type of one more cell.
    pub fn merge(self, other: ColumnType) -> ColumnType {
        match (self, other) {
            (ColumnType::Null, other) => other,
            (this, ColumnType::Null) => this,
            (this, other) if this == other => this,
            (ColumnType::Int, ColumnType::Float) | (ColumnType::Float, ColumnType::Int) => {
                ColumnType::Float
            }
            _ => ColumnType::Mixed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_shapes() {
        assert_eq!(CellValue::parse_text(""), CellValue::Null);
        assert_eq!(CellValue::parse_text("  "), CellValue::Null);
        assert_eq!(CellValue::parse_text("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse_text("-7"), CellValue::Int(-7));
        assert_eq!(CellValue::parse_text("3.5"), CellValue::Float(3.5));
        assert_eq!(
            CellValue::parse_text("hello world"),
            CellValue::Text("hello world".to_string())
        );
    }

    #[test]
    fn test_parse_text_timestamp() {
        let cell = CellValue::parse_text("2008-03-01 12:30:00");
        match cell {
            CellValue::Timestamp(value) => {
                assert_eq!(value.year(), 2008);
                assert_eq!(value.hour(), 12);
            }
            other => panic!("expected timestamp, got {other:?}"),
        }

        let date_only = CellValue::parse_text("2011-12-31");
        match date_only {
            CellValue::Timestamp(value) => {
                assert_eq!(value.year(), 2011);
                assert_eq!(value.hour(), 0);
            }
            other => panic!("expected timestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_text_does_not_promote_words_to_float() {
        assert_eq!(
            CellValue::parse_text("nan"),
            CellValue::Text("nan".to_string())
        );
        assert_eq!(
            CellValue::parse_text("inf"),
            CellValue::Text("inf".to_string())
        );
    }

    #[test]
    fn test_parse_text_keeps_zero_padded_codes_as_text() {
        assert_eq!(
            CellValue::parse_text("00123"),
            CellValue::Text("00123".to_string())
        );
        assert_eq!(CellValue::parse_text("0"), CellValue::Int(0));
        assert_eq!(CellValue::parse_text("0.5"), CellValue::Float(0.5));
    }

    #[test]
    fn test_merge_null_and_one_type() {
        assert_eq!(
            ColumnType::Null.merge(ColumnType::Int),
            ColumnType::Int
        );
        assert_eq!(
            ColumnType::Int.merge(ColumnType::Null),
            ColumnType::Int
        );
        assert_eq!(ColumnType::Int.merge(ColumnType::Int), ColumnType::Int);
    }

    #[test]
    fn test_merge_numeric_promotion() {
        assert_eq!(
            ColumnType::Int.merge(ColumnType::Float),
            ColumnType::Float
        );
        assert_eq!(
            ColumnType::Float.merge(ColumnType::Int),
            ColumnType::Float
        );
    }

    #[test]
    fn test_merge_conflicting_types() {
        assert_eq!(
            ColumnType::Int.merge(ColumnType::Text),
            ColumnType::Mixed
        );
        assert_eq!(
            ColumnType::Mixed.merge(ColumnType::Int),
            ColumnType::Mixed
        );
    }

    #[test]
    fn test_display_renders_null_as_empty() {
        assert_eq!(CellValue::Null.to_string(), "");
        assert_eq!(CellValue::Int(5).to_string(), "5");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }
}
