use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result};
use crate::table::{CellValue, ColumnType, Table};
use crate::writer::{TableWriter, WriteReport};

const DEFAULT_INSERT_BATCH: usize = 1000;

/// Emits a standalone SQL script: a `CREATE TABLE IF NOT EXISTS` with types
/// mapped from the inferred column types, then batched multi-row inserts.
pub struct SqlWriter {
    insert_batch: usize,
}

impl SqlWriter {
    pub fn new() -> Self {
        Self {
            insert_batch: DEFAULT_INSERT_BATCH,
        }
    }

    pub fn with_insert_batch(rows: usize) -> Self {
        Self {
            insert_batch: rows.max(1),
        }
    }

    fn write_script(&self, table: &Table, table_name: &str, out: &mut impl Write) -> io::Result<()> {
        writeln!(out, "-- SQL script generated by mdbshift")?;
        writeln!(out, "-- Table: {table_name}")?;
        writeln!(out, "-- Rows: {}", table.row_count())?;
        writeln!(out, "-- Columns: {}", table.column_count())?;
        writeln!(out)?;

        let types = table.infer_column_types();
        writeln!(out, "CREATE TABLE IF NOT EXISTS `{table_name}` (")?;
        let last = table.column_count().saturating_sub(1);
        for (idx, (name, ty)) in table.columns().iter().zip(types.iter()).enumerate() {
            let comma = if idx == last { "" } else { "," };
            writeln!(out, "    `{name}` {}{comma}", sql_type(*ty))?;
        }
        writeln!(out, ");")?;

        if table.is_empty() {
            return Ok(());
        }
        writeln!(out)?;

        let column_list = table
            .columns()
            .iter()
            .map(|name| format!("`{name}`"))
            .collect::<Vec<_>>()
            .join(", ");
        for chunk in table.rows().chunks(self.insert_batch) {
            writeln!(out, "INSERT INTO `{table_name}` ({column_list}) VALUES")?;
            let last = chunk.len() - 1;
            for (idx, row) in chunk.iter().enumerate() {
                let values = row.iter().map(sql_literal).collect::<Vec<_>>().join(", ");
                let terminator = if idx == last { ";" } else { "," };
                writeln!(out, "({values}){terminator}")?;
            }
        }
        Ok(())
    }
}

impl Default for SqlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableWriter for SqlWriter {
    fn write(&self, table: &Table, dest: &Path, table_name: &str) -> Result<WriteReport> {
        let file = File::create(dest)
            .map_err(|err| Error::WriteFailed(format!("creating {}: {err}", dest.display())))?;
        let mut out = BufWriter::new(file);
        self.write_script(table, table_name, &mut out)
            .and_then(|()| out.flush())
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

fn sql_type(ty: ColumnType) -> &'static str {
    match ty {
        ColumnType::Int => "BIGINT",
        ColumnType::Float => "DOUBLE",
        ColumnType::Bool => "BOOLEAN",
        ColumnType::Timestamp => "DATETIME",
        ColumnType::Null | ColumnType::Text | ColumnType::Mixed => "TEXT",
    }
}

fn sql_literal(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => "NULL".to_string(),
        CellValue::Int(value) => value.to_string(),
        CellValue::Float(value) => value.to_string(),
        CellValue::Bool(value) => if *value { "TRUE" } else { "FALSE" }.to_string(),
        CellValue::Text(value) => format!("'{}'", value.replace('\'', "''")),
        CellValue::Timestamp(_) => format!("'{cell}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        let mut table =
            Table::new(vec!["ID".to_string(), "NAME".to_string(), "N_ANIO".to_string()]).unwrap();
        table
            .push_row(vec![
                CellValue::Int(1),
                CellValue::Text("O'Brien".to_string()),
                CellValue::Int(2008),
            ])
            .unwrap();
        table
            .push_row(vec![CellValue::Int(2), CellValue::Null, CellValue::Int(2009)])
            .unwrap();
        table
    }

    fn render(writer: &SqlWriter, table: &Table) -> String {
        let mut buf = Vec::new();
        writer.write_script(table, "sales-2008", &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_script_shape() {
        let script = render(&SqlWriter::new(), &sample());
        assert!(script.contains("CREATE TABLE IF NOT EXISTS `sales-2008` ("));
        assert!(script.contains("`ID` BIGINT,"));
        assert!(script.contains("`NAME` TEXT,"));
        assert!(script.contains("`N_ANIO` BIGINT"));
        assert!(script.contains("INSERT INTO `sales-2008` (`ID`, `NAME`, `N_ANIO`) VALUES"));
    }

    #[test]
    fn test_literal_escaping_and_null() {
        let script = render(&SqlWriter::new(), &sample());
        assert!(script.contains("'O''Brien'"));
        assert!(script.contains("(2, NULL, 2009);"));
    }

    #[test]
    fn test_insert_batching() {
        let script = render(&SqlWriter::with_insert_batch(1), &sample());
        assert_eq!(script.matches("INSERT INTO").count(), 2);
    }

    #[test]
    fn test_empty_table_emits_schema_only() {
        let table = Table::new(vec!["ID".to_string()]).unwrap();
        let script = render(&SqlWriter::new(), &table);
        assert!(script.contains("CREATE TABLE IF NOT EXISTS"));
        assert!(!script.contains("INSERT INTO"));
    }
}
