use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

use mdbshift::convert::{timestamp_suffix, NamingConfig};
use mdbshift::partition::DEFAULT_YEAR_COLUMN;
use mdbshift::writer::OutputFormat;
use mdbshift::{AccessReader, BatchConverter, BatchOptions, YearPartitioner};

#[derive(Parser)]
#[command(name = "mdbshift", version, about = "Convert legacy Access databases into SQL, CSV or JSON, partitioned by year")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Report which extraction strategies this environment supports
    Probe,
    /// List the tables inside a legacy database file
    Tables {
        file: PathBuf,
    },
    /// Show the years available per table
    Summary {
        file: PathBuf,
        /// Column holding the partition year
        #[arg(long = "year-column", default_value = DEFAULT_YEAR_COLUMN)]
        year_column: String,
        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Convert every (table, year) pair into its own artifact
    Convert {
        file: PathBuf,
        /// Output format (sql, csv, json)
        #[arg(long, default_value = "sql")]
        format: OutputFormat,
        /// Directory artifacts are written into
        #[arg(long = "output-dir", default_value = "output")]
        output_dir: PathBuf,
        /// Column holding the partition year
        #[arg(long = "year-column", default_value = DEFAULT_YEAR_COLUMN)]
        year_column: String,
        /// Artifact name prefix; {year} is substituted
        #[arg(long)]
        prefix: Option<String>,
        /// Artifact name suffix; {year} is substituted
        #[arg(long)]
        suffix: Option<String>,
        /// Lower-case table names in artifact names
        #[arg(long)]
        lowercase: bool,
        /// Replace whitespace in artifact names with underscores
        #[arg(long = "replace-whitespace")]
        replace_whitespace: bool,
        /// Strip characters outside [A-Za-z0-9_-] from artifact names
        #[arg(long)]
        sanitize: bool,
        /// Append a run timestamp to artifact names
        #[arg(long)]
        timestamp: bool,
        /// Convert (table, year) pairs concurrently
        #[arg(long)]
        parallel: bool,
        /// Worker count for --parallel (default: min(4, cores))
        #[arg(long)]
        workers: Option<usize>,
        /// Emit the final report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let reader = AccessReader::new();

    match cli.command {
        Commands::Probe => cmd_probe(&reader),
        Commands::Tables { file } => cmd_tables(&reader, &file),
        Commands::Summary {
            file,
            year_column,
            json,
        } => cmd_summary(&reader, &file, &year_column, json),
        Commands::Convert {
            file,
            format,
            output_dir,
            year_column,
            prefix,
            suffix,
            lowercase,
            replace_whitespace,
            sanitize,
            timestamp,
            parallel,
            workers,
            json,
        } => {
            let naming = NamingConfig {
                prefix,
                suffix,
                lowercase,
                replace_whitespace,
                sanitize,
                timestamp: timestamp.then(timestamp_suffix),
            };
            let mut options = BatchOptions::new(format, output_dir);
            options.naming = naming;
            options.year_column = year_column;
            options.parallel = parallel;
            options.workers = workers;
            cmd_convert(&reader, &file, options, json)
        }
    }
}

fn cmd_probe(reader: &AccessReader) -> Result<()> {
    let support = reader.support();
    if support.supported {
        println!(
            "supported strategies: {}",
            support.available_strategies.join(", ")
        );
    } else {
        println!("no extraction strategy available");
        println!("{}", support.remediation);
    }
    Ok(())
}

fn cmd_tables(reader: &AccessReader, file: &PathBuf) -> Result<()> {
    let tables = reader.list_tables(file)?;
    if tables.is_empty() {
        let support = reader.support();
        return Err(anyhow!(
            "no tables could be enumerated. {}",
            if support.supported {
                "the file may be corrupt or not an Access database"
            } else {
                support.remediation.as_str()
            }
        ));
    }
    for table in tables {
        println!("{table}");
    }
    Ok(())
}

fn cmd_summary(reader: &AccessReader, file: &PathBuf, year_column: &str, json: bool) -> Result<()> {
    let partitioner = YearPartitioner::with_year_column(reader, year_column);
    let summary = partitioner.summarize(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{} ({:.2} MB)", summary.file_path, summary.file_size_mb);
    for (name, table) in &summary.tables {
        match &table.error {
            Some(error) => println!("  {name}: error: {error}"),
            None => {
                println!(
                    "  {name}: {} rows, {} columns, years {}",
                    table.row_count,
                    table.column_count,
                    if table.year_range.is_empty() {
                        "none"
                    } else {
                        table.year_range.as_str()
                    }
                );
                if table.skipped_rows > 0 {
                    println!(
                        "    ({} rows without a parseable year in '{year_column}')",
                        table.skipped_rows
                    );
                }
            }
        }
    }
    Ok(())
}

fn cmd_convert(
    reader: &AccessReader,
    file: &PathBuf,
    options: BatchOptions,
    json: bool,
) -> Result<()> {
    let converter = BatchConverter::new(reader, options);
    let report = converter.run(file)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (key, entry) in &report.conversions {
        match &entry.error {
            Some(error) => println!("  {key}: error: {error}"),
            None => println!(
                "  {key}: {} rows -> {}",
                entry.rows_converted,
                entry.artifact.as_deref().unwrap_or("-")
            ),
        }
    }
    println!(
        "converted {} rows into {} artifacts ({:.2} MB), {} failed",
        report.total_rows_converted,
        report.total_files_created,
        report.total_size_mb,
        report.failures()
    );
    Ok(())
}
