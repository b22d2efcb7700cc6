#![allow(dead_code)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mdbshift::error::{Error, Result};
use mdbshift::table::{CellValue, Table};
use mdbshift::ExtractionStrategy;

/// In-memory strategy serving fixed tables; stands in for the external
/// extraction tools so chain behavior is testable on any machine.
pub struct StaticStrategy {
    name: &'static str,
    available: bool,
    tables: Vec<(String, Table)>,
}

impl StaticStrategy {
    pub fn new(name: &'static str, tables: Vec<(&str, Table)>) -> Self {
        Self {
            name,
            available: true,
            tables: tables
                .into_iter()
                .map(|(n, t)| (n.to_string(), t))
                .collect(),
        }
    }

    pub fn unavailable(name: &'static str) -> Self {
        Self {
            name,
            available: false,
            tables: Vec::new(),
        }
    }

    fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|(n, _)| n.clone()).collect()
    }
}

impl ExtractionStrategy for StaticStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self) -> std::result::Result<(), String> {
        if self.available {
            Ok(())
        } else {
            Err("not installed in this environment".to_string())
        }
    }

    fn list_tables(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.table_names())
    }

    fn read_table(&self, _path: &Path, table: &str) -> Result<Table> {
        self.tables
            .iter()
            .find(|(n, _)| n == table)
            .map(|(_, t)| t.clone())
            .ok_or_else(|| Error::TableNotFound {
                table: table.to_string(),
                available: self.table_names(),
            })
    }
}

/// Strategy that is present but fails every read.
pub struct BrokenStrategy {
    name: &'static str,
    tables: Vec<String>,
}

impl BrokenStrategy {
    pub fn new(name: &'static str, tables: &[&str]) -> Self {
        Self {
            name,
            tables: tables.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl ExtractionStrategy for BrokenStrategy {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    fn list_tables(&self, _path: &Path) -> Result<Vec<String>> {
        Ok(self.tables.clone())
    }

    fn read_table(&self, _path: &Path, _table: &str) -> Result<Table> {
        Err(Error::Io(io::Error::new(
            io::ErrorKind::Other,
            "export tool crashed",
        )))
    }
}

/// SALES fixture: three rows tagged 2008, 2009, 2008.
pub fn sales_table() -> Table {
    let mut table = Table::new(vec![
        "ID".to_string(),
        "NAME".to_string(),
        "N_ANIO".to_string(),
    ])
    .unwrap();
    table
        .push_row(vec![
            CellValue::Int(1),
            CellValue::Text("first".to_string()),
            CellValue::Int(2008),
        ])
        .unwrap();
    table
        .push_row(vec![
            CellValue::Int(2),
            CellValue::Text("second".to_string()),
            CellValue::Int(2009),
        ])
        .unwrap();
    table
        .push_row(vec![
            CellValue::Int(3),
            CellValue::Text("third".to_string()),
            CellValue::Int(2008),
        ])
        .unwrap();
    table
}

/// Empty table sharing the SALES schema.
pub fn empty_sales_table() -> Table {
    Table::new(vec![
        "ID".to_string(),
        "NAME".to_string(),
        "N_ANIO".to_string(),
    ])
    .unwrap()
}

/// The chain validates the source path before any strategy runs, so tests
/// need a real, non-empty placeholder file.
pub fn placeholder_file(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"placeholder legacy database").unwrap();
    path
}
