use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use serde_json::Value;

use crate::error::{Error, Result};
use crate::table::{CellValue, Table};
use crate::writer::{TableWriter, WriteReport};

/// JSON artifact: an array of one object per row.
pub struct JsonWriter;

impl JsonWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableWriter for JsonWriter {
    fn write(&self, table: &Table, dest: &Path, _table_name: &str) -> Result<WriteReport> {
        let rows: Vec<serde_json::Map<String, Value>> = table
            .rows()
            .iter()
            .map(|row| {
                table
                    .columns()
                    .iter()
                    .zip(row.iter())
                    .map(|(name, cell)| (name.clone(), cell_json(cell)))
                    .collect()
            })
            .collect();

        let file = File::create(dest)
            .map_err(|err| Error::WriteFailed(format!("creating {}: {err}", dest.display())))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &rows)
            .map_err(|err| Error::WriteFailed(format!("writing {}: {err}", dest.display())))?;

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

fn cell_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Int(value) => Value::from(*value),
        CellValue::Float(value) => Value::from(*value),
        CellValue::Bool(value) => Value::from(*value),
        CellValue::Text(value) => Value::from(value.as_str()),
        CellValue::Timestamp(_) => Value::from(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_artifact_content() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.json");

        let mut table = Table::new(vec!["ID".to_string(), "NAME".to_string()]).unwrap();
        table
            .push_row(vec![CellValue::Int(1), CellValue::Text("a".to_string())])
            .unwrap();
        table.push_row(vec![CellValue::Int(2), CellValue::Null]).unwrap();

        JsonWriter::new().write(&table, &dest, "t").unwrap();

        let parsed: Vec<serde_json::Map<String, Value>> =
            serde_json::from_str(&std::fs::read_to_string(&dest).unwrap()).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0]["ID"], Value::from(1));
        assert_eq!(parsed[1]["NAME"], Value::Null);
    }
}
