//! Worker scheduler: runs one job per input file across N workers.
//!
//! Workers claim files from a shared cursor, so each file goes to exactly one
//! worker and a worker finishes a file before claiming the next. Results flow
//! back over a channel to the calling thread, which is the only consumer; that
//! keeps sinks like the timing file single-writer without a lock.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;

/// Input files waiting for a worker.
///
/// The list is fixed when the run starts; workers claim entries through a
/// shared cursor, so no file is handed out twice and none is skipped. Claims
/// past the end keep returning `None`, which is how an idle worker learns the
/// run is drained.
pub struct WorkQueue<S> {
    items: Vec<S>,
    cursor: AtomicUsize,
}

impl<S> WorkQueue<S> {
    /// Queue `items` in the order they will be claimed.
    pub fn new(items: Vec<S>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next file, or `None` once every file has been claimed.
    ///
    /// Relaxed ordering suffices: the cursor only has to be unique per claim,
    /// the items themselves are never written after construction.
    pub fn next(&self) -> Option<&S> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Number of files the run started with
    pub fn total(&self) -> usize {
        self.items.len()
    }
}

/// Fixed-size worker pool.
///
/// With one worker no pool is built: files run sequentially on the calling
/// thread in input order.
pub struct Scheduler {
    workers: NonZeroUsize,
    pool: Option<rayon::ThreadPool>,
}

impl Scheduler {
    pub fn new(workers: NonZeroUsize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = if workers.get() > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(workers.get())
                    .thread_name(|i| format!("ingest-{i}"))
                    .build()?,
            )
        } else {
            None
        };
        Ok(Self { workers, pool })
    }

    pub fn workers(&self) -> usize {
        self.workers.get()
    }

    /// Run `job` for every file and hand each result to `on_result`.
    ///
    /// `on_result` runs on the calling thread, once per file, in completion
    /// order (input order with a single worker). Returns after every file has
    /// been processed. If `on_result` fails, workers stop claiming new files,
    /// in-flight jobs finish and their results are discarded, and the error
    /// is returned.
    pub fn run<T, E>(
        &self,
        files: Vec<PathBuf>,
        job: impl Fn(&Path) -> T + Sync,
        mut on_result: impl FnMut(T) -> Result<(), E>,
    ) -> Result<(), E>
    where
        T: Send,
    {
        let Some(pool) = &self.pool else {
            for path in &files {
                on_result(job(path))?;
            }
            return Ok(());
        };

        let queue = WorkQueue::new(files);
        let (tx, rx) = mpsc::channel::<T>();
        let job = &job;
        let queue = &queue;
        let mut outcome = Ok(());

        pool.in_place_scope(|s| {
            for _ in 0..self.workers.get() {
                let tx = tx.clone();
                s.spawn(move |_| {
                    while let Some(path) = queue.next() {
                        if tx.send(job(path)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            for result in &rx {
                if let Err(e) = on_result(result) {
                    outcome = Err(e);
                    break;
                }
            }
            drop(rx);
        });

        outcome
    }
}
