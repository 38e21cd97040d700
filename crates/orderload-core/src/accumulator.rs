//! Batch accumulator and generic line processor for order files

use std::io::BufRead;
use std::num::NonZeroUsize;

use indicatif::ProgressBar;

use crate::progress::fmt_num;

/// Buffers rows until `batch_size` is reached, then hands the batch out.
///
/// A batch is never larger than `batch_size`. After each emission the
/// accumulator starts over with a fresh buffer.
#[derive(Debug)]
pub struct BatchAccumulator<T> {
    batch_size: usize,
    buf: Vec<T>,
}

impl<T> BatchAccumulator<T> {
    pub fn new(batch_size: NonZeroUsize) -> Self {
        let batch_size = batch_size.get();
        Self {
            batch_size,
            buf: Vec::with_capacity(batch_size),
        }
    }

    /// Append a row; returns the full batch when this row completes it.
    pub fn push(&mut self, row: T) -> Option<Vec<T>> {
        self.buf.push(row);
        if self.buf.len() >= self.batch_size {
            Some(self.take())
        } else {
            None
        }
    }

    /// Emit whatever is buffered, even a short batch.
    ///
    /// Returns `None` when nothing is buffered so callers never issue an
    /// empty write.
    pub fn flush(&mut self) -> Option<Vec<T>> {
        if self.buf.is_empty() {
            None
        } else {
            Some(self.take())
        }
    }

    /// Number of rows currently buffered
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn take(&mut self) -> Vec<T> {
        std::mem::replace(&mut self.buf, Vec::with_capacity(self.batch_size))
    }
}

/// Statistics from processing the lines of one file
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineStats {
    pub lines_read: usize,
    pub rows_written: usize,
    pub batches_written: usize,
}

/// Initial capacity for the per-line read buffer
const LINE_BUF_CAPACITY: usize = 512;

/// Progress update interval (every N lines to avoid overhead)
const UPDATE_INTERVAL: usize = 10_000;

/// Read lines, parse each, push to the accumulator, write every emitted batch.
///
/// Batches are written strictly in file order, and each `write_batch` call
/// returns before the next line is read. The first parse or write error stops
/// processing and is returned as-is; a trailing short batch is written only
/// after the whole input was read cleanly.
pub fn process_lines<R, T, E>(
    reader: &mut R,
    acc: &mut BatchAccumulator<T>,
    mut parse: impl FnMut(&str, usize) -> Result<T, E>,
    mut write_batch: impl FnMut(Vec<T>) -> Result<(), E>,
    pb: &ProgressBar,
) -> Result<LineStats, E>
where
    R: BufRead,
    E: From<std::io::Error>,
{
    let mut buf = String::with_capacity(LINE_BUF_CAPACITY);
    let mut stats = LineStats::default();

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        stats.lines_read += 1;

        if stats.lines_read % UPDATE_INTERVAL == 0 {
            pb.set_message(format!("{} rows", fmt_num(stats.rows_written)));
        }

        let row = parse(&buf, stats.lines_read)?;
        if let Some(batch) = acc.push(row) {
            let n = batch.len();
            write_batch(batch)?;
            stats.rows_written += n;
            stats.batches_written += 1;
        }
    }

    if let Some(batch) = acc.flush() {
        let n = batch.len();
        write_batch(batch)?;
        stats.rows_written += n;
        stats.batches_written += 1;
    }
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn acc<T>(batch_size: usize) -> BatchAccumulator<T> {
        BatchAccumulator::new(NonZeroUsize::new(batch_size).unwrap())
    }

    #[test]
    fn push_emits_at_batch_size() {
        let mut acc = acc(3);
        assert_eq!(acc.push(1), None);
        assert_eq!(acc.push(2), None);
        assert_eq!(acc.push(3), Some(vec![1, 2, 3]));
        assert!(acc.is_empty());
        assert_eq!(acc.push(4), None);
        assert_eq!(acc.len(), 1);
    }

    #[test]
    fn flush_emits_short_batch() {
        let mut acc = acc(10);
        acc.push("a");
        acc.push("b");
        assert_eq!(acc.flush(), Some(vec!["a", "b"]));
        assert_eq!(acc.flush(), None);
    }

    #[test]
    fn batch_size_one_emits_every_row() {
        let mut acc = acc(1);
        assert_eq!(acc.push(7), Some(vec![7]));
        assert_eq!(acc.push(8), Some(vec![8]));
        assert_eq!(acc.flush(), None);
    }

    fn run(input: &str, batch_size: usize) -> (Vec<Vec<String>>, LineStats) {
        let mut reader = Cursor::new(input.to_string());
        let mut acc = acc(batch_size);
        let mut batches = Vec::new();
        let stats = process_lines(
            &mut reader,
            &mut acc,
            |line, _| Ok::<_, std::io::Error>(line.trim_end().to_string()),
            |b| {
                batches.push(b);
                Ok(())
            },
            &ProgressBar::hidden(),
        )
        .unwrap();
        (batches, stats)
    }

    #[test]
    fn five_lines_batch_two() {
        let (batches, stats) = run("a\nb\nc\nd\ne\n", 2);
        let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.rows_written, 5);
        assert_eq!(stats.batches_written, 3);
    }

    #[test]
    fn write_count_is_ceil_m_over_b() {
        for m in 0..20usize {
            for b in 1..7usize {
                let input: String = (0..m).map(|i| format!("{i}\n")).collect();
                let (batches, _) = run(&input, b);
                assert_eq!(batches.len(), m.div_ceil(b), "m={m} b={b}");
                if m > 0 {
                    let expected_last = if m % b == 0 { b } else { m % b };
                    assert_eq!(batches.last().unwrap().len(), expected_last);
                }
            }
        }
    }

    #[test]
    fn concatenated_batches_preserve_order() {
        let input: String = (0..23).map(|i| format!("row{i}\n")).collect();
        let (batches, _) = run(&input, 4);
        let flat: Vec<String> = batches.into_iter().flatten().collect();
        let expected: Vec<String> = (0..23).map(|i| format!("row{i}")).collect();
        assert_eq!(flat, expected);
    }

    #[test]
    fn empty_input_no_writes() {
        let (batches, stats) = run("", 5);
        assert!(batches.is_empty());
        assert_eq!(stats, LineStats::default());
    }

    #[test]
    fn last_line_without_newline() {
        let (batches, stats) = run("a\nb", 10);
        assert_eq!(batches, vec![vec!["a".to_string(), "b".to_string()]]);
        assert_eq!(stats.lines_read, 2);
    }

    #[test]
    fn parse_error_stops_before_trailing_flush() {
        let mut reader = Cursor::new("ok\nok\nbad\nok\n".to_string());
        let mut acc = acc(2);
        let mut writes = 0usize;
        let result = process_lines(
            &mut reader,
            &mut acc,
            |line, line_no| {
                if line.starts_with("bad") {
                    Err(std::io::Error::other(format!("line {line_no}")))
                } else {
                    Ok(())
                }
            },
            |_| {
                writes += 1;
                Ok(())
            },
            &ProgressBar::hidden(),
        );
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "line 3");
        assert_eq!(writes, 1);
    }

    #[test]
    fn write_error_propagates() {
        let mut reader = Cursor::new("a\nb\nc\n".to_string());
        let mut acc = acc(1);
        let mut attempts = 0usize;
        let result = process_lines(
            &mut reader,
            &mut acc,
            |_, _| Ok::<_, std::io::Error>(()),
            |_| {
                attempts += 1;
                Err(std::io::Error::other("rejected"))
            },
            &ProgressBar::hidden(),
        );
        assert!(result.is_err());
        assert_eq!(attempts, 1);
    }
}
