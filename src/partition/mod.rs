//! Temporal partitioning.
//!
//! Discovers the distinct years present in a designated year-bearing
//! column and re-extracts the rows belonging to one year. Every call
//! re-reads the full table through the strategy chain; nothing is cached
//! between `summarize` and `read_year`.

mod year;

pub use year::{TableYearSummary, YearPartitioner, YearSummary, DEFAULT_YEAR_COLUMN};
