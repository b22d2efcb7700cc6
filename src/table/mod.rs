//! Tabular value model.
//!
//! The shared in-memory representation of one extracted table: ordered
//! column names plus positionally aligned rows of typed cells. Tables are
//! built once by an extraction call and never mutated afterwards.

mod table;
mod value;

pub use table::Table;
pub use value::{CellValue, ColumnType};

pub(crate) use value::parse_timestamp;
