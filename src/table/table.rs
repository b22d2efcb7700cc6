use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::table::{CellValue, ColumnType};

/// An extracted table: ordered unique column names and positionally aligned
/// rows.
///
/// Every extraction call builds a fresh `Table`; results are never mutated
/// in place after being returned to a caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with the given column names.
    ///
    /// # Errors
    ///
    /// `Error::InvalidTable` when a column name repeats.
    pub fn new(columns: Vec<String>) -> Result<Self> {
        let mut seen = HashSet::new();
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(Error::InvalidTable(format!("duplicate column '{name}'")));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    /// Append one row. The row must match the column count exactly.
    pub fn push_row(&mut self, row: Vec<CellValue>) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::InvalidTable(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Build a new table holding only the rows the predicate keeps.
    ///
    /// The receiver is untouched; partitioned reads hand out independent
    /// instances.
    pub fn filter_rows<F>(&self, mut keep: F) -> Table
    where
        F: FnMut(&[CellValue]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| keep(row.as_slice()))
            .cloned()
            .collect();
        Table {
            columns: self.columns.clone(),
            rows,
        }
    }

    /// Infer one type per column across all rows.
    ///
    /// Columns mixing several non-null types come back as
    /// [`ColumnType::Mixed`]; callers decide how to report the anomaly.
    pub fn infer_column_types(&self) -> Vec<ColumnType> {
        let mut types = vec![ColumnType::Null; self.columns.len()];
        for row in &self.rows {
            for (idx, cell) in row.iter().enumerate() {
                types[idx] = types[idx].merge(cell.column_type());
            }
        }
        types
    }

    /// Names of columns whose inferred type is [`ColumnType::Mixed`].
    pub fn type_anomalies(&self) -> Vec<&str> {
        self.infer_column_types()
            .iter()
            .zip(self.columns.iter())
            .filter(|(ty, _)| **ty == ColumnType::Mixed)
            .map(|(_, name)| name.as_str())
            .collect()
    }
}
