//! Report subcommand - export the completed-without-shipping view

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// DuckDB database file [default: from config]
    #[arg(long)]
    pub db: Option<PathBuf>,

    /// Output CSV [default: results.csv]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// View to export
    #[arg(long, default_value = orderload_report::DEFAULT_VIEW)]
    pub view: String,
}

pub fn run(args: ReportArgs, config: &Config) -> Result<()> {
    let report = orderload_report::ReportConfig {
        db_path: args
            .db
            .unwrap_or_else(|| PathBuf::from(&config.database.path)),
        output: args.output.unwrap_or_else(|| config.output.report.clone()),
        view: args.view,
    };

    let summary = orderload_report::run(&report)?;

    println!();
    println!("=== Report Summary ===");
    println!("View: {}", report.view);
    println!("Rows: {}", orderload_core::fmt_num(summary.rows as usize));
    println!("Output: {}", report.output.display());
    Ok(())
}
