//! Generic ODBC bridge through unixODBC's `isql`.
//!
//! Last resort in the chain: it needs both unixODBC and a registered
//! Access-capable driver, and its delimited output is the least structured
//! of the three strategies.

use std::path::Path;
use std::process::Command;
use std::time::Duration;

use csv::ReaderBuilder;

use crate::access::chain::ExtractionStrategy;
use crate::access::exec::{run_with_timeout, tool_error};
use crate::error::Result;
use crate::table::{CellValue, Table};

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OdbcBridgeStrategy;

impl OdbcBridgeStrategy {
    pub fn new() -> Self {
        Self
    }

    fn connection_string(path: &Path) -> std::result::Result<String, String> {
        let driver = access_driver()?;
        Ok(format!("DRIVER={{{}}};DBQ={};", driver, path.display()))
    }
}

impl Default for OdbcBridgeStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for OdbcBridgeStrategy {
    fn name(&self) -> &'static str {
        "odbc-isql"
    }

    fn check(&self) -> std::result::Result<(), String> {
        let mut cmd = Command::new("isql");
        cmd.arg("--version");
        match run_with_timeout(&mut cmd, None, CHECK_TIMEOUT) {
            Ok(output) if output.success() => {}
            Ok(output) => return Err(format!("isql is not usable: {}", output.stderr_text())),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err("unixODBC (isql) is not installed".to_string());
            }
            Err(err) => return Err(format!("isql did not respond: {err}")),
        }
        access_driver().map(|_| ())
    }

    fn list_tables(&self, path: &Path) -> Result<Vec<String>> {
        let conn = Self::connection_string(path).map_err(tool_error)?;
        let mut cmd = Command::new("isql");
        cmd.arg("-b").arg("-d|").arg("-k").arg(&conn);
        // isql's `help` command prints the SQLTables result set:
        // qualifier|owner|name|type|remarks.
        let output = run_with_timeout(&mut cmd, Some(b"help\n"), LIST_TIMEOUT)?;
        if !output.success() {
            return Err(tool_error(format!(
                "isql table listing failed: {}",
                output.stderr_text()
            )));
        }
        let text = String::from_utf8_lossy(&output.stdout);
        let mut tables = Vec::new();
        for line in text.lines() {
            let fields: Vec<&str> = line.split('|').map(str::trim).collect();
            if fields.len() >= 4 && fields[3] == "TABLE" && !fields[2].is_empty() {
                tables.push(fields[2].to_string());
            }
        }
        Ok(tables)
    }

    fn read_table(&self, path: &Path, table: &str) -> Result<Table> {
        let conn = Self::connection_string(path).map_err(tool_error)?;
        let sql = format!("SELECT * FROM \"{table}\";\n");
        let mut cmd = Command::new("isql");
        cmd.arg("-b")
            .arg("-q")
            .arg("-c")
            .arg("-x0x09")
            .arg("-k")
            .arg(&conn);
        let output = run_with_timeout(&mut cmd, Some(sql.as_bytes()), EXPORT_TIMEOUT)?;
        if !output.success() {
            return Err(tool_error(format!(
                "isql query failed for table '{}': {}",
                table,
                output.stderr_text()
            )));
        }
        parse_isql_output(&output.stdout)
    }
}

fn access_driver() -> std::result::Result<String, String> {
    let mut cmd = Command::new("odbcinst");
    cmd.arg("-q").arg("-d");
    let output = match run_with_timeout(&mut cmd, None, CHECK_TIMEOUT) {
        Ok(output) if output.success() => output,
        Ok(output) => {
            return Err(format!(
                "odbcinst could not list drivers: {}",
                output.stderr_text()
            ));
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err("unixODBC (odbcinst) is not installed".to_string());
        }
        Err(err) => return Err(format!("odbcinst did not respond: {err}")),
    };
    let text = String::from_utf8_lossy(&output.stdout);
    for line in text.lines() {
        let line = line.trim();
        if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            let lowered = name.to_lowercase();
            if lowered.contains("mdb") || lowered.contains("access") {
                return Ok(name.to_string());
            }
        }
    }
    Err("no Access ODBC driver registered (odbcinst -q -d)".to_string())
}

fn parse_isql_output(stdout: &[u8]) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(stdout);
    let headers = reader
        .headers()
        .map_err(|err| tool_error(format!("isql output has no header row: {err}")))?
        .clone();
    let mut table = Table::new(headers.iter().map(|h| h.trim().to_string()).collect())?;
    let width = table.column_count();
    for record in reader.records() {
        let record = record.map_err(|err| tool_error(format!("malformed isql record: {err}")))?;
        // isql interleaves diagnostics (e.g. SQLRowCount) with data rows;
        // only rows matching the header width are data.
        if record.len() != width {
            continue;
        }
        table.push_row(record.iter().map(CellValue::parse_text).collect())?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_isql_output_skips_diagnostic_rows() {
        let raw = b"ID\tNAME\tN_ANIO\n1\tfirst\t2008\nSQLRowCount returns 1\n";
        let table = parse_isql_output(raw).unwrap();
        assert_eq!(table.columns(), &["ID", "NAME", "N_ANIO"]);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.rows()[0][2], CellValue::Int(2008));
    }

    #[test]
    fn test_parse_isql_output_header_only_is_empty_table() {
        let raw = b"ID\tNAME\n";
        let table = parse_isql_output(raw).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_count(), 2);
    }
}
