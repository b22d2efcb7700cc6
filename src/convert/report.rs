use std::collections::BTreeMap;

use serde::Serialize;

use crate::writer::WriteReport;

/// Stable key for one (table, year) job.
pub fn job_key(table: &str, year: i32) -> String {
    format!("{table}_{year}")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Success,
    Error,
}

/// Outcome of one (table, year) job.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionEntry {
    pub status: JobStatus,
    pub table: String,
    pub year: i32,
    pub rows_converted: usize,
    pub columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConversionEntry {
    pub(crate) fn success(table: String, year: i32, write: WriteReport) -> Self {
        Self {
            status: JobStatus::Success,
            table,
            year,
            rows_converted: write.rows_written,
            columns: write.columns_written,
            artifact: Some(write.destination),
            artifact_size: Some(write.artifact_size),
            error: None,
        }
    }

    pub(crate) fn failed(table: String, year: i32, error: String) -> Self {
        Self {
            status: JobStatus::Error,
            table,
            year,
            rows_converted: 0,
            columns: 0,
            artifact: None,
            artifact_size: None,
            error: Some(error),
        }
    }
}

/// Consolidated result of one batch run.
///
/// Holds one entry per (table, year) pair enumerated when the job list was
/// built; a failing job never drops its entry. Totals cover successful
/// jobs only.
#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub output_directory: String,
    pub total_tables: usize,
    pub conversions: BTreeMap<String, ConversionEntry>,
    pub total_rows_converted: u64,
    pub total_files_created: usize,
    pub total_size_mb: f64,
}

impl BatchReport {
    pub fn successes(&self) -> usize {
        self.conversions
            .values()
            .filter(|entry| entry.status == JobStatus::Success)
            .count()
    }

    pub fn failures(&self) -> usize {
        self.conversions.len() - self.successes()
    }
}
