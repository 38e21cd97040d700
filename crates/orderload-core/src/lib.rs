//! Orderload Core - concurrent batch ingestion of order files
//!
//! Streams comma-delimited order files into a relational store: each file is
//! read line by line, grouped into fixed-size batches, and written with one
//! parameterized multi-row INSERT per batch inside a single per-file
//! transaction. Files are spread over a fixed pool of workers and a timing
//! row is recorded for every file as it completes.
//!
//! # Example
//!
//! ```ignore
//! use orderload_core::{Config, CsvTimingSink, DuckDbOptions, DuckDbProvider, ProgressContext, run};
//!
//! let provider = DuckDbProvider::connect(&DuckDbOptions::default())?;
//! let mut sink = CsvTimingSink::create("timings.csv".as_ref())?;
//! let summary = run(&Config::new("files.txt"), &provider, &mut sink, &ProgressContext::new())?;
//! println!("{} rows loaded", summary.total_rows);
//! ```

pub mod accumulator;
pub mod config;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod manifest;
pub mod order;
pub mod progress;
pub mod runner;
pub mod scheduler;
pub mod statement;
pub mod store;
pub mod timing;
pub mod writer;

// Re-exports
pub use accumulator::{BatchAccumulator, LineStats, process_lines};
pub use config::{Config, IngestOptions};
pub use error::{ConfigError, IngestError, StoreError};
pub use ingest::{FileIngestor, FileOutcome, FileStats, Stage};
pub use logging::{IndicatifLogger, init_logging};
pub use manifest::read_file_list;
pub use order::Order;
pub use progress::{ProgressContext, fmt_num};
pub use runner::{RunSummary, run};
pub use scheduler::Scheduler;
pub use statement::{ConflictPolicy, InsertStatement};
pub use store::{ConnectionProvider, DuckDbConnection, DuckDbOptions, DuckDbProvider, StoreConnection};
pub use timing::{CsvTimingSink, TimingSink};
pub use writer::BulkWriter;
