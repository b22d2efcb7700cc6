//! Writer collaborators.
//!
//! Thin sinks for one extracted table each. The orchestrator only sees the
//! [`TableWriter`] contract; formats are interchangeable.

mod csv;
mod json;
mod sql;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Result;
use crate::table::Table;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;
pub use self::sql::SqlWriter;

/// Write one table to one destination artifact.
pub trait TableWriter: Send + Sync {
    /// `table_name` is the identifier embedded inside the artifact (SQL
    /// table name, report label); `dest` is where the artifact lands.
    fn write(&self, table: &Table, dest: &Path, table_name: &str) -> Result<WriteReport>;
}

#[derive(Debug, Clone, Serialize)]
pub struct WriteReport {
    pub rows_written: usize,
    pub columns_written: usize,
    pub artifact_size: u64,
    pub destination: String,
}

/// Output artifact kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sql,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Sql => "sql",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn writer(self) -> Box<dyn TableWriter> {
        match self {
            OutputFormat::Sql => Box::new(SqlWriter::new()),
            OutputFormat::Csv => Box::new(CsvWriter::new()),
            OutputFormat::Json => Box::new(JsonWriter::new()),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.to_lowercase().as_str() {
            "sql" => Ok(OutputFormat::Sql),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unsupported output format '{other}' (expected sql, csv or json)"
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
