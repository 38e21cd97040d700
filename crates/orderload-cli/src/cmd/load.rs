//! Load subcommand - ingest order files listed in a file

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Args;
use orderload_core::{
    CsvTimingSink, DuckDbProvider, IngestOptions, ProgressContext, RunSummary, fmt_num,
};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct LoadArgs {
    /// File listing one order file path per line
    pub files_list: PathBuf,

    /// Rows per bulk insert [default: 100]
    #[arg(long, allow_negative_numbers = true)]
    pub batch_size: Option<i64>,

    /// Files processed in parallel [default: 1]
    #[arg(long, allow_negative_numbers = true)]
    pub num_workers: Option<i64>,

    /// Timing CSV output [default: timings.csv]
    #[arg(long)]
    pub timings: Option<PathBuf>,

    /// DuckDB database file, or :memory:
    #[arg(long)]
    pub db: Option<String>,
}

pub fn run(args: LoadArgs, config: &Config, progress: &ProgressContext) -> Result<RunSummary> {
    // Validate before touching the database or any input file
    let options = IngestOptions::new(
        args.batch_size.unwrap_or(config.ingest.batch_size),
        args.num_workers.unwrap_or(config.ingest.workers),
    )?;

    let mut db = config.database.duckdb_options();
    if let Some(path) = args.db {
        db.path = path;
    }
    let provider = DuckDbProvider::connect(&db)
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("Failed to open database {}", db.path))?;

    let timings = args.timings.unwrap_or_else(|| config.output.timings.clone());
    let mut sink = CsvTimingSink::create(&timings)
        .with_context(|| format!("Failed to create timing file {}", timings.display()))?;

    let run_config = orderload_core::Config {
        files_list: args.files_list,
        options,
        table: db.table.clone(),
        on_conflict: config.database.on_conflict,
    };
    let summary = orderload_core::run(&run_config, &provider, &mut sink, progress)?;

    print_summary(&summary, &timings);
    Ok(summary)
}

fn print_summary(summary: &RunSummary, timings: &std::path::Path) {
    let mut table = super::settings_table(["Load", ""]);
    table.add_row(vec![
        "Files".to_string(),
        format!(
            "{}/{} completed ({} failed)",
            summary.completed_files, summary.total_files, summary.failed_files
        ),
    ]);
    table.add_row(vec!["Rows".to_string(), fmt_num(summary.total_rows)]);
    table.add_row(vec!["Batches".to_string(), fmt_num(summary.total_batches)]);
    table.add_row(vec![
        "Time".to_string(),
        format!("{:.1}s", summary.elapsed.as_secs_f64()),
    ]);
    if let Some(rate) = summary.throughput() {
        table.add_row(vec!["Throughput".to_string(), format!("{rate:.0} rows/sec")]);
    }
    table.add_row(vec!["Timings".to_string(), timings.display().to_string()]);
    println!("\n{table}");
}
