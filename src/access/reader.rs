use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use log::warn;
use serde::Serialize;

use crate::access::chain::{validate_source, ExtractionStrategy, StrategyChain};
use crate::access::probe::{probe_strategies, StrategySupport};
use crate::error::Result;
use crate::table::Table;

/// The public face of legacy extraction.
///
/// Holds no connection state: every operation re-runs the strategy chain
/// against the file. Only the environment probe is cached, once per reader.
pub struct AccessReader {
    chain: StrategyChain,
    support: OnceLock<StrategySupport>,
}

impl AccessReader {
    pub fn new() -> Self {
        Self::from_chain(StrategyChain::with_default_strategies())
    }

    /// Build a reader over an explicit strategy list. Tests inject
    /// in-memory strategies here; production callers rarely need it.
    pub fn with_strategies(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self::from_chain(StrategyChain::new(strategies))
    }

    fn from_chain(chain: StrategyChain) -> Self {
        Self {
            chain,
            support: OnceLock::new(),
        }
    }

    /// Read one table; with `None` the file must hold exactly one table.
    pub fn read(&self, path: impl AsRef<Path>, table: Option<&str>) -> Result<Table> {
        self.chain.read(path.as_ref(), table)
    }

    /// Table names in the file; empty means no strategy could enumerate.
    pub fn list_tables(&self, path: impl AsRef<Path>) -> Result<Vec<String>> {
        self.chain.list_tables(path.as_ref())
    }

    /// Which strategies this environment supports. Probed once per reader.
    pub fn support(&self) -> &StrategySupport {
        self.support
            .get_or_init(|| probe_strategies(self.chain.strategies()))
    }

    /// Per-table shape overview of a file. Tables that fail to read are
    /// skipped with a warning rather than failing the whole call.
    pub fn file_info(&self, path: impl AsRef<Path>) -> Result<FileInfo> {
        let path = path.as_ref();
        validate_source(path)?;
        let size = fs::metadata(path)?.len();
        let mut info = FileInfo {
            file_path: path.display().to_string(),
            file_size_mb: size as f64 / 1024.0 / 1024.0,
            tables: Vec::new(),
            available_strategies: self.support().available_strategies.clone(),
        };
        for name in self.list_tables(path)? {
            match self.read(path, Some(&name)) {
                Ok(table) => info.tables.push(TableInfo {
                    name,
                    rows: table.row_count(),
                    columns: table.column_count(),
                    column_names: table.columns().to_vec(),
                }),
                Err(err) => warn!("skipping table '{name}': {err}"),
            }
        }
        Ok(info)
    }

    /// Read every table the file exposes, skipping (with a warning) the
    /// ones that fail.
    pub fn read_all_tables(&self, path: impl AsRef<Path>) -> Result<Vec<(String, Table)>> {
        let path = path.as_ref();
        let mut tables = Vec::new();
        for name in self.list_tables(path)? {
            match self.read(path, Some(&name)) {
                Ok(table) => tables.push((name, table)),
                Err(err) => warn!("skipping table '{name}': {err}"),
            }
        }
        Ok(tables)
    }
}

impl Default for AccessReader {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FileInfo {
    pub file_path: String,
    pub file_size_mb: f64,
    pub tables: Vec<TableInfo>,
    pub available_strategies: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableInfo {
    pub name: String,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}
