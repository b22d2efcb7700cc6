use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use log::warn;
use serde::Serialize;

use crate::access::AccessReader;
use crate::error::{Error, Result};
use crate::table::{CellValue, Table};

/// Year column of the legacy data set this tool was built for.
pub const DEFAULT_YEAR_COLUMN: &str = "N_ANIO";

const YEAR_MIN: i32 = 1000;
const YEAR_MAX: i32 = 9999;

/// Partitions tables of one legacy file by a year-bearing column.
pub struct YearPartitioner<'a> {
    reader: &'a AccessReader,
    year_column: String,
}

impl<'a> YearPartitioner<'a> {
    pub fn new(reader: &'a AccessReader) -> Self {
        Self::with_year_column(reader, DEFAULT_YEAR_COLUMN)
    }

    pub fn with_year_column(reader: &'a AccessReader, column: impl Into<String>) -> Self {
        Self {
            reader,
            year_column: column.into(),
        }
    }

    pub fn year_column(&self) -> &str {
        &self.year_column
    }

    /// Year summary for every table in the file.
    ///
    /// A table that cannot be summarized (extraction failure, missing year
    /// column) gets an error annotation in its entry; sibling tables are
    /// unaffected.
    pub fn summarize(&self, path: impl AsRef<Path>) -> Result<YearSummary> {
        let path = path.as_ref();
        let names = self.reader.list_tables(path)?;
        let size = fs::metadata(path)?.len();

        let mut tables = BTreeMap::new();
        for name in names {
            let entry = match self.summarize_table(path, &name) {
                Ok(summary) => summary,
                Err(err) => {
                    warn!("could not summarize table '{name}': {err}");
                    TableYearSummary::failed(err.to_string())
                }
            };
            tables.insert(name, entry);
        }

        Ok(YearSummary {
            file_path: path.display().to_string(),
            file_size_mb: size as f64 / 1024.0 / 1024.0,
            tables,
        })
    }

    /// Distinct years, row/column counts and skipped-row count for one
    /// table. Reads the full table once through the strategy chain.
    pub fn summarize_table(&self, path: impl AsRef<Path>, table: &str) -> Result<TableYearSummary> {
        let full = self.reader.read(path.as_ref(), Some(table))?;
        let idx = self.year_index(table, &full)?;

        let mut years = BTreeSet::new();
        let mut skipped = 0usize;
        for row in full.rows() {
            match cell_year(&row[idx]) {
                Some(year) => {
                    years.insert(year);
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                "table '{table}': {skipped} rows had no parseable year in '{}'",
                self.year_column
            );
        }

        let available_years: Vec<i32> = years.into_iter().collect();
        Ok(TableYearSummary {
            row_count: full.row_count(),
            column_count: full.column_count(),
            year_range: year_range(&available_years),
            available_years,
            skipped_rows: skipped,
            error: None,
        })
    }

    /// Re-extract the table and keep only rows matching `year` exactly.
    ///
    /// Zero matches yield an empty table, not an error; the caller decides
    /// whether that is actionable.
    pub fn read_year(&self, path: impl AsRef<Path>, table: &str, year: i32) -> Result<Table> {
        let full = self.reader.read(path.as_ref(), Some(table))?;
        let idx = self.year_index(table, &full)?;
        Ok(full.filter_rows(|row| cell_year(&row[idx]) == Some(year)))
    }

    fn year_index(&self, table: &str, full: &Table) -> Result<usize> {
        full.column_index(&self.year_column)
            .ok_or_else(|| Error::MissingColumn {
                table: table.to_string(),
                column: self.year_column.clone(),
            })
    }
}

/// Year summary of one legacy file.
#[derive(Debug, Clone, Serialize)]
pub struct YearSummary {
    pub file_path: String,
    pub file_size_mb: f64,
    pub tables: BTreeMap<String, TableYearSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableYearSummary {
    pub row_count: usize,
    pub column_count: usize,
    pub available_years: Vec<i32>,
    pub year_range: String,
    /// Rows whose year cell was null or unparseable; excluded from every
    /// partition.
    pub skipped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableYearSummary {
    pub(crate) fn failed(error: String) -> Self {
        Self {
            row_count: 0,
            column_count: 0,
            available_years: Vec::new(),
            year_range: String::new(),
            skipped_rows: 0,
            error: Some(error),
        }
    }
}

/// Extract a 4-digit year from a cell, or nothing.
///
/// Integer comparison only: floats must be integral, text must parse.
/// Anything else is a source-data defect and is excluded.
fn cell_year(cell: &CellValue) -> Option<i32> {
    let year = match cell {
        CellValue::Int(value) => i32::try_from(*value).ok()?,
        CellValue::Float(value) if value.fract() == 0.0 => *value as i32,
        CellValue::Text(value) => value.trim().parse::<i32>().ok()?,
        _ => return None,
    };
    (YEAR_MIN..=YEAR_MAX).contains(&year).then_some(year)
}

fn year_range(years: &[i32]) -> String {
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first == last => first.to_string(),
        (Some(first), Some(last)) => format!("{first}-{last}"),
        _ => String::new(),
    }
}
