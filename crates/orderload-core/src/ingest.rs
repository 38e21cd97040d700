//! File ingestor: one order file, one connection, one transaction.
//!
//! A file moves through three stages:
//!
//! 1. **opening connection** - a fresh connection (and transaction) is taken
//!    from the provider before the file itself is opened
//! 2. **streaming batches** - lines are parsed and accumulated, every full
//!    batch is written immediately, the trailing short batch after EOF
//! 3. **committing** - all writes of the file become visible at once
//!
//! Any error ends the file. The connection is dropped uncommitted, so the
//! backend discards everything this file wrote; other files are unaffected.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::accumulator::{BatchAccumulator, process_lines};
use crate::error::IngestError;
use crate::order::Order;
use crate::store::{ConnectionProvider, StoreConnection};
use crate::writer::BulkWriter;

/// Read buffer per input file (64KB)
const READ_BUF_SIZE: usize = 64 * 1024;

/// Where a file was when it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    OpeningConnection,
    StreamingBatches,
    Committing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpeningConnection => "opening connection",
            Self::StreamingBatches => "streaming batches",
            Self::Committing => "committing",
        })
    }
}

impl Stage {
    /// Stage in which an error of this kind is raised
    pub fn of(err: &IngestError) -> Self {
        match err {
            IngestError::Connection(_) => Self::OpeningConnection,
            IngestError::Commit(_) => Self::Committing,
            IngestError::Io(_) | IngestError::MalformedRecord { .. } | IngestError::Write(_) => {
                Self::StreamingBatches
            }
        }
    }
}

/// Counters for one committed file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub lines_read: usize,
    pub rows_written: usize,
    pub batches_written: usize,
    /// First identifier any batch returned, in write order; batches that
    /// returned no ids (all rows skipped as conflicts) are passed over
    pub first_id: Option<i64>,
}

/// Result of one file, success or failure, with its wall-clock time.
///
/// Elapsed time runs from before the connection is opened to after the
/// commit (or the failure).
#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub elapsed: Duration,
    pub result: Result<FileStats, IngestError>,
}

impl FileOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// `ok`, or the failure kind
    pub fn status(&self) -> &'static str {
        match &self.result {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        }
    }

    /// Whole seconds, truncated
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    pub fn rows_written(&self) -> usize {
        self.result.as_ref().map_or(0, |s| s.rows_written)
    }

    /// Log the outcome: debug on success, error with stage on failure.
    pub fn log(&self) {
        let name = self.path.display();
        match &self.result {
            Ok(stats) => log::debug!(
                "{name}: {} rows in {} batches ({:.2}s)",
                stats.rows_written,
                stats.batches_written,
                self.elapsed.as_secs_f64()
            ),
            Err(e) => log::error!("{name}: failed while {}: {e}", Stage::of(e)),
        }
    }
}

/// Ingests whole files through a shared provider and writer.
///
/// Holds only shared references, so one ingestor serves every worker.
pub struct FileIngestor<'a, P> {
    provider: &'a P,
    writer: &'a BulkWriter,
    batch_size: NonZeroUsize,
}

impl<'a, P: ConnectionProvider> FileIngestor<'a, P> {
    pub fn new(provider: &'a P, writer: &'a BulkWriter, batch_size: NonZeroUsize) -> Self {
        Self {
            provider,
            writer,
            batch_size,
        }
    }

    /// Ingest `path` and time it. Never fails: errors land in the outcome.
    pub fn run(&self, path: &Path, pb: &ProgressBar) -> FileOutcome {
        let start = Instant::now();
        let result = self.ingest(path, pb);
        FileOutcome {
            path: path.to_path_buf(),
            elapsed: start.elapsed(),
            result,
        }
    }

    /// Ingest one file as a single transaction.
    pub fn ingest(&self, path: &Path, pb: &ProgressBar) -> Result<FileStats, IngestError> {
        log::debug!("{}: {}", path.display(), Stage::OpeningConnection);
        let mut conn = self.provider.open().map_err(IngestError::Connection)?;

        log::debug!("{}: {}", path.display(), Stage::StreamingBatches);
        pb.set_message("streaming...");
        let file = File::open(path)?;
        let mut reader = BufReader::with_capacity(READ_BUF_SIZE, file);
        let mut acc = BatchAccumulator::new(self.batch_size);
        let mut first_id = None;

        let lines = process_lines(
            &mut reader,
            &mut acc,
            Order::parse_line,
            |batch| {
                let id = self.writer.write(&mut conn, &batch)?;
                if first_id.is_none() {
                    first_id = id;
                }
                Ok(())
            },
            pb,
        )?;

        log::debug!("{}: {}", path.display(), Stage::Committing);
        pb.set_message("committing...");
        conn.commit().map_err(IngestError::Commit)?;

        Ok(FileStats {
            lines_read: lines.lines_read,
            rows_written: lines.rows_written,
            batches_written: lines.batches_written,
            first_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::statement::{ConflictPolicy, InsertStatement};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Each insert, on any connection, returns the next scripted id list.
    #[derive(Default)]
    struct ScriptedProvider {
        ids: Arc<Mutex<VecDeque<Vec<i64>>>>,
    }

    struct ScriptedConn {
        ids: Arc<Mutex<VecDeque<Vec<i64>>>>,
    }

    impl ConnectionProvider for ScriptedProvider {
        type Conn = ScriptedConn;

        fn open(&self) -> Result<ScriptedConn, StoreError> {
            Ok(ScriptedConn {
                ids: Arc::clone(&self.ids),
            })
        }
    }

    impl StoreConnection for ScriptedConn {
        fn insert_returning(&mut self, _: &InsertStatement<'_>) -> Result<Vec<i64>, StoreError> {
            Ok(self.ids.lock().unwrap().pop_front().unwrap_or_default())
        }

        fn commit(self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn orders_file(dir: &Path, ids: &[u32]) -> PathBuf {
        let body: String = ids
            .iter()
            .map(|id| format!("{id},1,1,1,1,1.0,0,0,1.0,0,0,1,USD,2020-02-02 02:02:02\n"))
            .collect();
        let path = dir.join("orders.csv");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn first_id_skips_batches_without_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = orders_file(dir.path(), &[1, 2, 3]);
        let provider = ScriptedProvider::default();
        provider
            .ids
            .lock()
            .unwrap()
            .extend([vec![], vec![42], vec![43]]);
        let writer = BulkWriter::new("orders", ConflictPolicy::Ignore);
        let ingestor = FileIngestor::new(&provider, &writer, NonZeroUsize::MIN);

        let stats = ingestor.ingest(&path, &ProgressBar::hidden()).unwrap();
        assert_eq!(stats.batches_written, 3);
        assert_eq!(stats.first_id, Some(42));
    }

    #[test]
    fn first_id_none_when_no_batch_returns_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = orders_file(dir.path(), &[1, 2]);
        let provider = ScriptedProvider::default();
        let writer = BulkWriter::new("orders", ConflictPolicy::Ignore);
        let ingestor = FileIngestor::new(&provider, &writer, NonZeroUsize::MIN);

        let stats = ingestor.ingest(&path, &ProgressBar::hidden()).unwrap();
        assert_eq!(stats.batches_written, 2);
        assert_eq!(stats.first_id, None);
    }

    #[test]
    fn stage_of_each_error() {
        let e = |s: &str| -> StoreError { s.to_string().into() };
        assert_eq!(
            Stage::of(&IngestError::Connection(e("x"))),
            Stage::OpeningConnection
        );
        assert_eq!(Stage::of(&IngestError::Write(e("x"))), Stage::StreamingBatches);
        assert_eq!(
            Stage::of(&IngestError::MalformedRecord { line: 1, fields: 2 }),
            Stage::StreamingBatches
        );
        assert_eq!(Stage::of(&IngestError::Commit(e("x"))), Stage::Committing);
    }

    #[test]
    fn outcome_status_labels() {
        let ok = FileOutcome {
            path: "a.csv".into(),
            elapsed: Duration::from_millis(2_900),
            result: Ok(FileStats {
                rows_written: 4,
                ..Default::default()
            }),
        };
        assert_eq!(ok.status(), "ok");
        assert_eq!(ok.elapsed_secs(), 2);
        assert_eq!(ok.rows_written(), 4);

        let failed = FileOutcome {
            path: "b.csv".into(),
            elapsed: Duration::from_millis(10),
            result: Err(IngestError::MalformedRecord { line: 3, fields: 13 }),
        };
        assert!(!failed.is_ok());
        assert_eq!(failed.status(), "malformed_record");
        assert_eq!(failed.rows_written(), 0);
    }

    #[test]
    fn stage_display() {
        assert_eq!(Stage::Committing.to_string(), "committing");
    }
}
