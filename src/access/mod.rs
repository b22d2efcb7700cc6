//! Legacy Access-family database extraction.
//!
//! No single decoder for `.mdb`/`.accdb` files works on every platform, so
//! reads go through an ordered chain of independent strategies: the
//! mdbtools CSV exporter first, its JSON exporter next, a generic ODBC
//! bridge last. The chain advances past environment failures and only
//! gives up when every strategy has been exhausted.

mod chain;
mod exec;
mod mdbtools;
mod odbc;
mod probe;
mod reader;

pub use chain::{ExtractionStrategy, StrategyChain, REMEDIATION_HINT};
pub use mdbtools::{MdbExportStrategy, MdbJsonStrategy};
pub use odbc::OdbcBridgeStrategy;
pub use probe::StrategySupport;
pub use reader::{AccessReader, FileInfo, TableInfo};
