//! File list reader

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Read the list of order files, one path per line.
///
/// Surrounding whitespace is trimmed and blank lines are skipped. Paths are
/// returned in file order and are not checked for existence; a missing
/// input file fails only its own ingest.
pub fn read_file_list(path: &Path) -> io::Result<Vec<PathBuf>> {
    parse_file_list(BufReader::new(File::open(path)?))
}

pub fn parse_file_list(reader: impl BufRead) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let entry = line.trim();
        if !entry.is_empty() {
            files.push(PathBuf::from(entry));
        }
    }
    log::debug!("{} files in list", files.len());
    Ok(files)
}
