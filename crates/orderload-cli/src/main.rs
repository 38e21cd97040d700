//! orderload - batch loader for order CSV files
//!
//! Loads order files into DuckDB in parallel and exports the
//! completed-without-shipping report.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "orderload")]
#[command(about = "Concurrent batch loader for order files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: $ORDERLOAD_CONFIG, ./orderload.toml or ~/.config/orderload/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load every order file named in a list file
    Load(cmd::load::LoadArgs),
    /// Export the completed-without-shipping report to CSV
    Report(cmd::report::ReportArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let progress = orderload_core::ProgressContext::new();

    // TTY: warn unless --debug, the bars show activity
    // non-TTY: info unless --debug, logs are the only progress indicator
    let is_tty = progress.is_tty();
    let multi = if is_tty { Some(progress.multi()) } else { None };
    let quiet = is_tty && !cli.debug;
    orderload_core::init_logging(quiet, cli.debug, multi);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Command::Load(args) => {
            let summary = cmd::load::run(args, &config, &progress)?;
            if summary.has_failures() {
                log::error!(
                    "{} of {} files failed",
                    summary.failed_files,
                    summary.total_files
                );
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Report(args) => {
            cmd::report::run(args, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config => {
            cmd::show_config(&config);
            Ok(ExitCode::SUCCESS)
        }
    }
}
