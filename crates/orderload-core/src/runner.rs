//! Pipeline runner: file list → scheduler → ingestor → timing sink

use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::config::Config;
use crate::ingest::{FileIngestor, FileOutcome};
use crate::manifest::read_file_list;
use crate::progress::{ProgressContext, fmt_num};
use crate::scheduler::Scheduler;
use crate::store::ConnectionProvider;
use crate::timing::TimingSink;
use crate::writer::BulkWriter;

/// Run totals
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub total_files: usize,
    pub completed_files: usize,
    pub failed_files: usize,
    pub total_rows: usize,
    pub total_batches: usize,
    pub elapsed: Duration,
}

impl RunSummary {
    fn add(&mut self, outcome: &FileOutcome) {
        match &outcome.result {
            Ok(stats) => {
                self.completed_files += 1;
                self.total_rows += stats.rows_written;
                self.total_batches += stats.batches_written;
            }
            Err(_) => self.failed_files += 1,
        }
    }

    /// Rows per second over the whole run
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        (self.total_rows > 0 && secs > 0.0).then(|| self.total_rows as f64 / secs)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_files > 0
    }

    pub fn log(&self) {
        log::info!("=== Order Load Summary ===");
        log::info!(
            "Files: {}/{} completed ({} failed)",
            self.completed_files,
            self.total_files,
            self.failed_files
        );
        log::info!(
            "Rows: {} in {} batches",
            fmt_num(self.total_rows),
            fmt_num(self.total_batches)
        );
        log::info!("Time: {:.1}s", self.elapsed.as_secs_f64());
        if let Some(rate) = self.throughput() {
            log::info!("Throughput: {rate:.0} rows/sec");
        }
    }
}

/// Load every file named in the list file.
///
/// File-level failures are recorded in the timing sink and counted in the
/// summary; only an unreadable list file, a pool that cannot be built or a
/// failing timing sink abort the run.
pub fn run<P, S>(
    config: &Config,
    provider: &P,
    sink: &mut S,
    progress: &ProgressContext,
) -> Result<RunSummary>
where
    P: ConnectionProvider,
    S: TimingSink + ?Sized,
{
    let start = Instant::now();

    let files = read_file_list(&config.files_list).with_context(|| {
        format!("Failed to read file list {}", config.files_list.display())
    })?;

    let batch_size = config.options.batch_size();
    let workers = config.options.workers();
    log::info!(
        "Loading {} files into {} with {} workers (batch size {})",
        files.len(),
        config.table,
        workers,
        batch_size
    );

    let writer = BulkWriter::new(config.table.as_str(), config.on_conflict);
    let ingestor = FileIngestor::new(provider, &writer, batch_size);
    let scheduler = Scheduler::new(workers).context("Failed to create worker pool")?;

    let overall = progress.overall_bar(files.len());
    let mut summary = RunSummary {
        total_files: files.len(),
        ..Default::default()
    };

    scheduler
        .run(
            files,
            |path| {
                log::debug!("{}: started", path.display());
                let pb = progress.file_bar(&path.to_string_lossy());
                let outcome = ingestor.run(path, &pb);
                pb.finish_and_clear();
                outcome
            },
            |outcome| {
                outcome.log();
                summary.add(&outcome);
                overall.inc(1);
                if summary.failed_files > 0 {
                    overall.set_message(format!("{} failed", summary.failed_files));
                }
                sink.record(&outcome)
            },
        )
        .context("Failed to write timing record")?;

    overall.finish_and_clear();
    summary.elapsed = start.elapsed();
    summary.log();
    Ok(summary)
}
