//! Per-file timing records

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::ingest::FileOutcome;

/// Header row of the timing file
pub const TIMING_HEADER: [&str; 3] = ["filename", "processing time (sec)", "status"];

/// Receives one record per finished file.
///
/// Only ever called from the scheduler's consumer thread.
pub trait TimingSink {
    fn record(&mut self, outcome: &FileOutcome) -> io::Result<()>;
}

/// CSV timing file: header, then `filename,seconds,status` per file.
///
/// Each row is flushed as soon as it is written so the file can be tailed
/// during a long run.
pub struct CsvTimingSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl CsvTimingSink<File> {
    /// Create (or truncate) the timing file at `path`
    pub fn create(path: &Path) -> io::Result<Self> {
        Self::new(File::create(path)?)
    }
}

impl<W: Write> CsvTimingSink<W> {
    /// Wrap `inner` and write the header row.
    pub fn new(inner: W) -> io::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(TIMING_HEADER)?;
        writer.flush()?;
        Ok(Self { writer, rows: 0 })
    }

    /// Rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn into_inner(self) -> io::Result<W> {
        self.writer.into_inner().map_err(|e| e.into_error())
    }
}

impl<W: Write> TimingSink for CsvTimingSink<W> {
    fn record(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        let name = outcome.path.to_string_lossy();
        let secs = outcome.elapsed_secs().to_string();
        self.writer
            .write_record([name.as_ref(), secs.as_str(), outcome.status()])?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }
}

/// Collects outcomes in memory
impl TimingSink for Vec<(String, u64, &'static str)> {
    fn record(&mut self, outcome: &FileOutcome) -> io::Result<()> {
        self.push((
            outcome.path.to_string_lossy().into_owned(),
            outcome.elapsed_secs(),
            outcome.status(),
        ));
        Ok(())
    }
}
