use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::Table;
use crate::writer::{TableWriter, WriteReport};

/// CSV artifact with a header row; nulls render as empty fields.
pub struct CsvWriter;

impl CsvWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableWriter for CsvWriter {
    fn write(&self, table: &Table, dest: &Path, _table_name: &str) -> Result<WriteReport> {
        let fail = |err: csv::Error| Error::WriteFailed(format!("writing {}: {err}", dest.display()));

        let mut writer = csv::Writer::from_path(dest).map_err(fail)?;
        writer.write_record(table.columns()).map_err(fail)?;
        for row in table.rows() {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(fail)?;
        }
        writer
            .flush()
            .map_err(|err| Error::WriteFailed(format!("flushing {}: {err}", dest.display())))?;

        let size = fs::metadata(dest)
            .map_err(|err| Error::WriteFailed(format!("sizing {}: {err}", dest.display())))?
            .len();
        Ok(WriteReport {
            rows_written: table.row_count(),
            columns_written: table.column_count(),
            artifact_size: size,
            destination: dest.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::CellValue;

    #[test]
    fn test_csv_artifact_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.csv");

        let mut table = Table::new(vec!["ID".to_string(), "NAME".to_string()]).unwrap();
        table
            .push_row(vec![CellValue::Int(1), CellValue::Text("a,b".to_string())])
            .unwrap();
        table.push_row(vec![CellValue::Int(2), CellValue::Null]).unwrap();

        let report = CsvWriter::new().write(&table, &dest, "t").unwrap();
        assert_eq!(report.rows_written, 2);
        assert!(report.artifact_size > 0);

        let content = std::fs::read_to_string(&dest).unwrap();
        assert!(content.starts_with("ID,NAME\n"));
        assert!(content.contains("1,\"a,b\"\n"));
        assert!(content.contains("2,\n"));
    }
}
