use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use log::{info, warn};

use crate::access::AccessReader;
use crate::convert::naming::{artifact_stem, NamingConfig};
use crate::convert::report::{job_key, BatchReport, ConversionEntry, JobStatus};
use crate::error::Result;
use crate::partition::{YearPartitioner, DEFAULT_YEAR_COLUMN};
use crate::writer::{OutputFormat, TableWriter};

const DEFAULT_WORKER_CAP: usize = 4;

pub struct BatchOptions {
    pub format: OutputFormat,
    pub output_dir: PathBuf,
    pub naming: NamingConfig,
    pub year_column: String,
    pub parallel: bool,
    pub workers: Option<usize>,
}

impl BatchOptions {
    pub fn new(format: OutputFormat, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            format,
            output_dir: output_dir.into(),
            naming: NamingConfig::default(),
            year_column: DEFAULT_YEAR_COLUMN.to_string(),
            parallel: false,
            workers: None,
        }
    }
}

/// Converts every (table, year) pair of one legacy file into its own
/// artifact.
///
/// Jobs are independent: a failing job becomes its `error` entry in the
/// report and never aborts siblings. The legacy file is read-only and each
/// job performs its own full read + filter, so jobs share no cursor.
pub struct BatchConverter<'a> {
    reader: &'a AccessReader,
    options: BatchOptions,
    writer: Box<dyn TableWriter>,
    extension: &'static str,
}

impl<'a> BatchConverter<'a> {
    pub fn new(reader: &'a AccessReader, options: BatchOptions) -> Self {
        let writer = options.format.writer();
        let extension = options.format.extension();
        Self {
            reader,
            options,
            writer,
            extension,
        }
    }

    /// Swap the writer collaborator; tests inject failing sinks here.
    pub fn with_writer(
        reader: &'a AccessReader,
        options: BatchOptions,
        writer: Box<dyn TableWriter>,
        extension: &'static str,
    ) -> Self {
        Self {
            reader,
            options,
            writer,
            extension,
        }
    }

    pub fn run(&self, path: impl AsRef<Path>) -> Result<BatchReport> {
        let cancel = AtomicBool::new(false);
        self.run_cancellable(path.as_ref(), &cancel)
    }

    /// Like [`run`](Self::run), checking `cancel` between jobs. Jobs already
    /// dispatched finish; the rest are recorded as cancelled error entries,
    /// so the report still holds one entry per enumerated pair.
    pub fn run_cancellable(&self, path: &Path, cancel: &AtomicBool) -> Result<BatchReport> {
        fs::create_dir_all(&self.options.output_dir)?;
        let partitioner =
            YearPartitioner::with_year_column(self.reader, self.options.year_column.clone());
        let summary = partitioner.summarize(path)?;

        let mut jobs: Vec<(String, i32)> = Vec::new();
        for (name, table_summary) in &summary.tables {
            if let Some(error) = &table_summary.error {
                warn!("table '{name}' contributes no jobs: {error}");
                continue;
            }
            for year in &table_summary.available_years {
                jobs.push((name.clone(), *year));
            }
        }
        info!(
            "converting {} (table, year) pairs across {} tables",
            jobs.len(),
            summary.tables.len()
        );

        let entries = if self.options.parallel && jobs.len() > 1 {
            self.run_parallel(path, &partitioner, jobs, cancel)
        } else {
            jobs.into_iter()
                .map(|(table, year)| {
                    if cancel.load(Ordering::Relaxed) {
                        ConversionEntry::failed(table, year, "cancelled".to_string())
                    } else {
                        self.process_job(path, &partitioner, table, year)
                    }
                })
                .collect()
        };

        let mut conversions = BTreeMap::new();
        let mut total_rows = 0u64;
        let mut total_files = 0usize;
        let mut total_bytes = 0u64;
        for entry in entries {
            if entry.status == JobStatus::Success {
                total_rows += entry.rows_converted as u64;
                total_files += 1;
                total_bytes += entry.artifact_size.unwrap_or(0);
            }
            conversions.insert(job_key(&entry.table, entry.year), entry);
        }

        Ok(BatchReport {
            output_directory: self.options.output_dir.display().to_string(),
            total_tables: summary.tables.len(),
            conversions,
            total_rows_converted: total_rows,
            total_files_created: total_files,
            total_size_mb: total_bytes as f64 / 1024.0 / 1024.0,
        })
    }

    fn run_parallel(
        &self,
        path: &Path,
        partitioner: &YearPartitioner<'_>,
        jobs: Vec<(String, i32)>,
        cancel: &AtomicBool,
    ) -> Vec<ConversionEntry> {
        let worker_count = self
            .options
            .workers
            .unwrap_or_else(default_worker_count)
            .clamp(1, jobs.len());
        info!("running {} jobs across {worker_count} workers", jobs.len());

        // Fixed shards instead of a shared queue: the job list is known up
        // front and results are keyed, so completion order is irrelevant.
        let job_count = jobs.len();
        let mut shards: Vec<Vec<(String, i32)>> = vec![Vec::new(); worker_count];
        for (idx, job) in jobs.into_iter().enumerate() {
            shards[idx % worker_count].push(job);
        }

        let (tx, rx) = mpsc::sync_channel(job_count);
        thread::scope(|scope| {
            for shard in shards {
                let tx = tx.clone();
                scope.spawn(move || {
                    for (table, year) in shard {
                        let entry = if cancel.load(Ordering::Relaxed) {
                            ConversionEntry::failed(table, year, "cancelled".to_string())
                        } else {
                            self.process_job(path, partitioner, table, year)
                        };
                        if tx.send(entry).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);
            rx.iter().collect()
        })
    }

    fn process_job(
        &self,
        path: &Path,
        partitioner: &YearPartitioner<'_>,
        table: String,
        year: i32,
    ) -> ConversionEntry {
        info!("converting table '{table}' year {year}");
        let partition = match partitioner.read_year(path, &table, year) {
            Ok(partition) => partition,
            Err(err) => return ConversionEntry::failed(table, year, err.to_string()),
        };
        if partition.is_empty() {
            // An empty partition is flagged rather than written out as a
            // useless empty artifact.
            return ConversionEntry::failed(table, year, "no data".to_string());
        }

        let stem = artifact_stem(&table, year, &self.options.naming);
        let dest = self
            .options
            .output_dir
            .join(format!("{stem}.{}", self.extension));
        match self.writer.write(&partition, &dest, &stem) {
            Ok(write) => ConversionEntry::success(table, year, write),
            Err(err) => ConversionEntry::failed(table, year, err.to_string()),
        }
    }
}

fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(DEFAULT_WORKER_CAP)
}
