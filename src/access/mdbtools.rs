//! mdbtools-backed strategies.
//!
//! `mdb-tables`/`mdb-export` ship with every mdbtools install; `mdb-json`
//! only with newer releases, which gives the two strategies genuinely
//! different availability.

use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

use csv::ReaderBuilder;
use serde_json::Value;

use crate::access::chain::ExtractionStrategy;
use crate::access::exec::{run_with_timeout, tool_error};
use crate::error::{Error, Result};
use crate::table::{parse_timestamp, CellValue, Table};

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const EXPORT_TIMEOUT: Duration = Duration::from_secs(60);

/// ISO layout so exported timestamps parse without locale guessing.
const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// CSV export through `mdb-export`. The most portable strategy; tried first.
pub struct MdbExportStrategy;

impl MdbExportStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MdbExportStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for MdbExportStrategy {
    fn name(&self) -> &'static str {
        "mdb-export"
    }

    fn check(&self) -> std::result::Result<(), String> {
        check_tool("mdb-tables")?;
        check_tool("mdb-export")
    }

    fn list_tables(&self, path: &Path) -> Result<Vec<String>> {
        mdb_list_tables(path)
    }

    fn read_table(&self, path: &Path, table: &str) -> Result<Table> {
        let available = mdb_list_tables(path)?;
        if !available.iter().any(|t| t == table) {
            return Err(Error::TableNotFound {
                table: table.to_string(),
                available,
            });
        }

        let mut cmd = Command::new("mdb-export");
        cmd.arg("-D").arg(EXPORT_DATE_FORMAT).arg(path).arg(table);
        let output = run_with_timeout(&mut cmd, None, EXPORT_TIMEOUT)?;
        if !output.success() {
            return Err(tool_error(format!(
                "mdb-export failed for table '{}': {}",
                table,
                output.stderr_text()
            )));
        }

        // Scoped intermediate export: a uniquely named temp file, removed
        // when the guard drops on every exit path.
        let mut export = tempfile::Builder::new()
            .prefix("mdbshift-")
            .suffix(".csv")
            .tempfile()?;
        export.write_all(&output.stdout)?;
        export.flush()?;
        parse_csv_export(export.path())
    }
}

/// JSON export through `mdb-json`, one object per row. Falls between the
/// CSV exporter and the ODBC bridge in the chain.
pub struct MdbJsonStrategy;

impl MdbJsonStrategy {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MdbJsonStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionStrategy for MdbJsonStrategy {
    fn name(&self) -> &'static str {
        "mdb-json"
    }

    fn check(&self) -> std::result::Result<(), String> {
        check_tool("mdb-tables")?;
        check_tool("mdb-json")
            .map_err(|_| "mdb-json is not available (mdbtools 0.9 or newer required)".to_string())
    }

    fn list_tables(&self, path: &Path) -> Result<Vec<String>> {
        mdb_list_tables(path)
    }

    fn read_table(&self, path: &Path, table: &str) -> Result<Table> {
        let available = mdb_list_tables(path)?;
        if !available.iter().any(|t| t == table) {
            return Err(Error::TableNotFound {
                table: table.to_string(),
                available,
            });
        }

        let mut cmd = Command::new("mdb-json");
        cmd.arg(path).arg(table);
        let output = run_with_timeout(&mut cmd, None, EXPORT_TIMEOUT)?;
        if !output.success() {
            return Err(tool_error(format!(
                "mdb-json failed for table '{}': {}",
                table,
                output.stderr_text()
            )));
        }

        let text = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let Some(first) = lines.first() else {
            // No rows and no schema line; an empty table with no columns.
            return Table::new(Vec::new());
        };

        // serde_json's map does not keep insertion order, so column order
        // comes from a scan of the first row's raw text.
        let columns = leading_key_order(first);
        let mut result = Table::new(columns)?;
        for line in &lines {
            let value: Value = serde_json::from_str(line)
                .map_err(|err| tool_error(format!("mdb-json emitted invalid JSON: {err}")))?;
            let Some(object) = value.as_object() else {
                return Err(tool_error(
                    "mdb-json emitted a non-object row".to_string(),
                ));
            };
            let row = result
                .columns()
                .iter()
                .map(|name| json_cell(object.get(name)))
                .collect();
            result.push_row(row)?;
        }
        Ok(result)
    }
}

fn check_tool(tool: &str) -> std::result::Result<(), String> {
    let mut cmd = Command::new(tool);
    cmd.arg("--version");
    match run_with_timeout(&mut cmd, None, CHECK_TIMEOUT) {
        Ok(output) if output.success() => Ok(()),
        Ok(output) => Err(format!("{tool} is not usable: {}", output.stderr_text())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("{tool} is not installed"))
        }
        Err(err) => Err(format!("{tool} did not respond: {err}")),
    }
}

fn mdb_list_tables(path: &Path) -> Result<Vec<String>> {
    let mut cmd = Command::new("mdb-tables");
    cmd.arg("-1").arg(path);
    let output = run_with_timeout(&mut cmd, None, LIST_TIMEOUT)?;
    if !output.success() {
        return Err(tool_error(format!(
            "mdb-tables failed: {}",
            output.stderr_text()
        )));
    }
    let text = String::from_utf8_lossy(&output.stdout);
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_csv_export(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .from_path(path)
        .map_err(|err| tool_error(format!("reading exported csv: {err}")))?;
    let headers = reader
        .headers()
        .map_err(|err| tool_error(format!("exported csv has no header row: {err}")))?
        .clone();
    let mut table = Table::new(headers.iter().map(str::to_string).collect())?;
    for record in reader.records() {
        let record = record.map_err(|err| tool_error(format!("malformed csv record: {err}")))?;
        table.push_row(record.iter().map(CellValue::parse_text).collect())?;
    }
    Ok(table)
}

/// Top-level key order of one JSON object line.
fn leading_key_order(line: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    let mut current = String::new();
    let mut expecting_key = false;

    for ch in line.chars() {
        if in_string {
            if escaped {
                escaped = false;
                current.push(ch);
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            } else {
                current.push(ch);
            }
            continue;
        }
        match ch {
            '{' => {
                depth += 1;
                expecting_key = depth == 1;
            }
            '}' => depth = depth.saturating_sub(1),
            '"' => {
                in_string = true;
                current.clear();
            }
            ':' if depth == 1 && expecting_key => {
                keys.push(current.clone());
                expecting_key = false;
            }
            ',' if depth == 1 => expecting_key = true,
            _ => {}
        }
    }
    keys
}

fn json_cell(value: Option<&Value>) -> CellValue {
    match value {
        None | Some(Value::Null) => CellValue::Null,
        Some(Value::Bool(b)) => CellValue::Bool(*b),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        // JSON already carries the source's typing, so strings stay text
        // unless they are timestamp-shaped.
        Some(Value::String(s)) => match parse_timestamp(s) {
            Some(ts) => CellValue::Timestamp(ts),
            None => CellValue::Text(s.clone()),
        },
        Some(other) => CellValue::Text(other.to_string()),
    }
}
