//! Run configuration for the ingestion pipeline

use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::error::ConfigError;
use crate::statement::ConflictPolicy;

/// Rows per bulk insert when not configured
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Worker count when not configured
pub const DEFAULT_WORKERS: usize = 1;

/// Batch size and worker count, both validated positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestOptions {
    batch_size: NonZeroUsize,
    workers: NonZeroUsize,
}

impl IngestOptions {
    /// Validate raw option values.
    ///
    /// Values are signed so that negative input from the command line or a
    /// config file is reported rather than wrapped.
    pub fn new(batch_size: i64, workers: i64) -> Result<Self, ConfigError> {
        Ok(Self {
            batch_size: positive("batch-size", batch_size)?,
            workers: positive("num-workers", workers)?,
        })
    }

    pub fn batch_size(&self) -> NonZeroUsize {
        self.batch_size
    }

    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            workers: NonZeroUsize::new(DEFAULT_WORKERS).unwrap_or(NonZeroUsize::MIN),
        }
    }
}

fn positive(option: &'static str, value: i64) -> Result<NonZeroUsize, ConfigError> {
    usize::try_from(value)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or(ConfigError::NonPositive { option, value })
}

/// Everything one `load` run needs besides the storage provider and the
/// timing sink.
#[derive(Debug, Clone)]
pub struct Config {
    /// List file: one order file path per line
    pub files_list: PathBuf,
    pub options: IngestOptions,
    /// Target table
    pub table: String,
    pub on_conflict: ConflictPolicy,
}

impl Config {
    pub fn new(files_list: impl Into<PathBuf>) -> Self {
        Self {
            files_list: files_list.into(),
            options: IngestOptions::default(),
            table: "orders".to_string(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}
