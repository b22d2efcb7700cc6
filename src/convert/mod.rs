//! Batch conversion.
//!
//! Drives the {table × year} cross-product of one legacy file into
//! individually named output artifacts, collecting a consolidated report
//! even when some pairs fail.

mod batch;
mod naming;
mod report;

pub use batch::{BatchConverter, BatchOptions};
pub use naming::{artifact_stem, timestamp_suffix, NamingConfig};
pub use report::{job_key, BatchReport, ConversionEntry, JobStatus};
