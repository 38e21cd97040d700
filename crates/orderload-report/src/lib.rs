//! orderload-report: export the completed-without-shipping report
//!
//! Reads a reporting view from the orders database and writes it to CSV with
//! a fixed header. Query failures are errors; an empty view still produces a
//! header-only file.

mod config;
mod sql;

pub use config::{DEFAULT_VIEW, ReportConfig};
pub use sql::REPORT_COLUMNS;

use std::fs::File;

use anyhow::{Context, Result, bail};
use duckdb::{Connection, params};

/// Summary of one export
#[derive(Debug, PartialEq, Eq)]
pub struct ReportSummary {
    pub rows: u64,
}

/// Run the report export.
pub fn run(config: &ReportConfig) -> Result<ReportSummary> {
    if !config.db_path.exists() {
        bail!("Database not found: {}", config.db_path.display());
    }
    let conn = Connection::open(&config.db_path)
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    export(&conn, config)
}

/// Export `config.view` from an open connection into `config.output`.
pub fn export(conn: &Connection, config: &ReportConfig) -> Result<ReportSummary> {
    let found: i64 = conn
        .query_row(sql::relation_exists(), params![config.view], |row| row.get(0))
        .context("Failed to look up report view")?;
    if found == 0 {
        bail!("Report view not found: {}", config.view);
    }

    log::info!("Exporting {} to {}", config.view, config.output.display());

    // Run the query before touching the output so a failing view leaves no file
    let mut stmt = conn
        .prepare(&sql::select_report(&config.view))
        .with_context(|| format!("Failed to prepare query on {}", config.view))?;
    let mut rows = stmt
        .query([])
        .with_context(|| format!("Failed to query {}", config.view))?;

    let file = File::create(&config.output)
        .with_context(|| format!("Failed to create {}", config.output.display()))?;
    let mut out = csv::Writer::from_writer(file);

    let written = write_rows(&mut rows, &mut out);
    drop(out);
    let count = match written {
        Ok(count) => count,
        Err(e) => {
            if let Err(rm) = std::fs::remove_file(&config.output) {
                log::warn!("Failed to remove partial {}: {rm}", config.output.display());
            }
            return Err(e);
        }
    };

    log::info!("Done. {} rows written", count);
    Ok(ReportSummary { rows: count })
}

/// Header plus every row, all columns as text (NULL as empty)
fn write_rows(rows: &mut duckdb::Rows<'_>, out: &mut csv::Writer<File>) -> Result<u64> {
    out.write_record(REPORT_COLUMNS)?;

    let mut count = 0u64;
    let mut record: Vec<String> = Vec::with_capacity(REPORT_COLUMNS.len());
    while let Some(row) = rows.next().context("Failed to fetch report row")? {
        record.clear();
        for i in 0..REPORT_COLUMNS.len() {
            let value: Option<String> = row
                .get(i)
                .with_context(|| format!("Report row {} has no column {}", count + 1, i + 1))?;
            record.push(value.unwrap_or_default());
        }
        out.write_record(&record)?;
        count += 1;
    }
    out.flush().context("Failed to write report")?;
    Ok(count)
}
