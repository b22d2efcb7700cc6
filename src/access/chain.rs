use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::access::mdbtools::{MdbExportStrategy, MdbJsonStrategy};
use crate::access::odbc::OdbcBridgeStrategy;
use crate::error::{Error, Result, StrategyFailure};
use crate::table::Table;

/// Shown to the operator when every strategy is exhausted.
pub const REMEDIATION_HINT: &str =
    "install mdbtools (mdb-tables/mdb-export) or convert the database to CSV manually";

/// One technique for decoding the legacy format.
///
/// Every strategy can both enumerate table names and export one named
/// table's full row set, independently of the others.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Cheap, read-only environment capability check. `Err` carries the
    /// reason the strategy cannot run right now.
    fn check(&self) -> std::result::Result<(), String>;

    fn list_tables(&self, path: &Path) -> Result<Vec<String>>;

    fn read_table(&self, path: &Path, table: &str) -> Result<Table>;
}

/// Ordered list of strategies, most portable first.
pub struct StrategyChain {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl StrategyChain {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self { strategies }
    }

    pub fn with_default_strategies() -> Self {
        Self::new(vec![
            Box::new(MdbExportStrategy::new()),
            Box::new(MdbJsonStrategy::new()),
            Box::new(OdbcBridgeStrategy::new()),
        ])
    }

    pub fn strategies(&self) -> &[Box<dyn ExtractionStrategy>] {
        &self.strategies
    }

    /// Read one table, trying strategies in order.
    ///
    /// With no table name the file must contain exactly one table; more than
    /// one fails with `AmbiguousTable` regardless of which strategy would
    /// serve the read. An empty result from one strategy triggers fallback
    /// to the next; only when every strategy agrees the table is empty is an
    /// empty table returned.
    pub fn read(&self, path: &Path, table: Option<&str>) -> Result<Table> {
        validate_source(path)?;
        let table = match table {
            Some(name) => name.to_string(),
            None => self.resolve_single_table(path)?,
        };

        let mut attempts = Vec::new();
        let mut first_empty: Option<Table> = None;
        for strategy in &self.strategies {
            if let Err(reason) = strategy.check() {
                info!("strategy {} unavailable: {reason}", strategy.name());
                attempts.push(StrategyFailure {
                    strategy: strategy.name(),
                    reason: format!("unavailable: {reason}"),
                });
                continue;
            }
            info!("trying strategy {} for table '{table}'", strategy.name());
            match strategy.read_table(path, &table) {
                Ok(result) if !result.is_empty() => {
                    info!(
                        "strategy {} read table '{table}': {} rows, {} columns",
                        strategy.name(),
                        result.row_count(),
                        result.column_count()
                    );
                    return Ok(result);
                }
                Ok(result) => {
                    warn!(
                        "strategy {} returned an empty result for '{table}', trying next",
                        strategy.name()
                    );
                    attempts.push(StrategyFailure {
                        strategy: strategy.name(),
                        reason: "returned an empty result".to_string(),
                    });
                    if first_empty.is_none() {
                        first_empty = Some(result);
                    }
                }
                Err(err @ (Error::TableNotFound { .. } | Error::AmbiguousTable { .. })) => {
                    return Err(err);
                }
                Err(err) => {
                    warn!("strategy {} failed: {err}", strategy.name());
                    attempts.push(StrategyFailure {
                        strategy: strategy.name(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        if let Some(empty) = first_empty {
            info!("every strategy agreed table '{table}' is empty");
            return Ok(empty);
        }
        Err(Error::ExtractionFailed {
            attempts,
            hint: REMEDIATION_HINT,
        })
    }

    /// Enumerate table names.
    ///
    /// Exhaustion yields an empty list, not an error; callers must treat an
    /// empty list as "cannot proceed" unless they know the file is valid.
    /// Order is whatever the winning tool reports.
    pub fn list_tables(&self, path: &Path) -> Result<Vec<String>> {
        validate_source(path)?;
        for strategy in &self.strategies {
            if let Err(reason) = strategy.check() {
                info!("strategy {} unavailable: {reason}", strategy.name());
                continue;
            }
            match strategy.list_tables(path) {
                Ok(tables) if !tables.is_empty() => {
                    info!(
                        "strategy {} listed {} tables",
                        strategy.name(),
                        tables.len()
                    );
                    return Ok(tables);
                }
                Ok(_) => warn!("strategy {} listed no tables", strategy.name()),
                Err(err) => warn!(
                    "strategy {} could not list tables: {err}",
                    strategy.name()
                ),
            }
        }
        Ok(Vec::new())
    }

    fn resolve_single_table(&self, path: &Path) -> Result<String> {
        let tables = self.list_tables(path)?;
        match tables.len() {
            0 => Err(Error::ExtractionFailed {
                attempts: vec![StrategyFailure {
                    strategy: "discovery",
                    reason: "no tables discovered".to_string(),
                }],
                hint: REMEDIATION_HINT,
            }),
            1 => {
                info!("no table specified, using the only table '{}'", tables[0]);
                Ok(tables[0].clone())
            }
            _ => Err(Error::AmbiguousTable { tables }),
        }
    }
}

/// Source file preconditions, checked before any strategy runs.
pub(crate) fn validate_source(path: &Path) -> Result<()> {
    let meta = fs::metadata(path).map_err(|_| Error::NotFound(path.to_path_buf()))?;
    if !meta.is_file() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    if meta.len() == 0 {
        return Err(Error::EmptyFile(path.to_path_buf()));
    }
    Ok(())
}
