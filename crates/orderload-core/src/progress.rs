//! Progress display for interactive and batch runs.
//!
//! On a terminal every in-flight file gets a spinner under one overall bar.
//! Off a terminal all bars are hidden and progress is reported through the log.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Width reserved for the file name column
const NAME_WIDTH: usize = 24;

fn file_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.green} {prefix:<24.dim} {elapsed:>4} {wide_msg:.dim}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn overall_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<26.cyan.bold} {bar:30.green/dim} {pos}/{len} files {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("--")
}

/// Owns the `MultiProgress` every bar of a run is attached to.
pub struct ProgressContext {
    multi: MultiProgress,
    is_tty: bool,
}

impl ProgressContext {
    /// Detects whether stderr is a terminal.
    pub fn new() -> Self {
        Self::with_tty(std::io::stderr().is_terminal())
    }

    /// Context whose bars are never drawn (tests, piped output)
    pub fn hidden() -> Self {
        Self::with_tty(false)
    }

    fn with_tty(is_tty: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            is_tty,
        }
    }

    /// Bar counting finished files out of `total`.
    pub fn overall_bar(&self, total: usize) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new(total as u64));
        pb.set_style(overall_style());
        pb.set_prefix("orders");
        pb
    }

    /// Spinner for one file while it is being ingested.
    ///
    /// Callers clear it once the file is done.
    pub fn file_bar(&self, name: &str) -> ProgressBar {
        if !self.is_tty {
            return ProgressBar::hidden();
        }
        let pb = self.multi.add(ProgressBar::new_spinner());
        pb.set_style(file_style());
        pb.set_prefix(truncate_name(name).to_string());
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    }

    /// Print above the bars; plain stderr when not on a terminal.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.is_tty {
            let _ = self.multi.println(msg);
        } else {
            eprintln!("{}", msg.as_ref());
        }
    }

    pub fn is_tty(&self) -> bool {
        self.is_tty
    }

    /// Handle for the log bridge in [`crate::logging`]
    pub fn multi(&self) -> &MultiProgress {
        &self.multi
    }
}

impl Default for ProgressContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep the tail of long names; the distinguishing part is usually the end.
fn truncate_name(name: &str) -> &str {
    let count = name.chars().count();
    if count <= NAME_WIDTH {
        return name;
    }
    let skip = count - NAME_WIDTH;
    match name.char_indices().nth(skip) {
        Some((idx, _)) => &name[idx..],
        None => name,
    }
}

/// Format number with thousand separators.
pub fn fmt_num(n: usize) -> String {
    let digits = n.to_string();
    let lead = digits.len() % 3;
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - lead) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
