//! Error types for the ingestion pipeline

/// Error reported by a storage backend.
///
/// Backends are pluggable, so the concrete error is boxed.
pub type StoreError = Box<dyn std::error::Error + Send + Sync>;

/// Invalid run-level option, detected before any file is processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Option must be a positive integer
    NonPositive { option: &'static str, value: i64 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonPositive { option, value } => {
                write!(f, "{option} must be a positive integer, got {value}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Error from ingesting a single order file.
///
/// Every variant is scoped to one file: the scheduler records it as a failed
/// outcome and keeps processing the remaining files.
#[derive(Debug)]
pub enum IngestError {
    /// Opening or reading the input file failed
    Io(std::io::Error),
    /// Line did not split into exactly 14 fields
    MalformedRecord { line: usize, fields: usize },
    /// No connection could be acquired for the file
    Connection(StoreError),
    /// Backend rejected a bulk insert
    Write(StoreError),
    /// Backend rejected the final commit
    Commit(StoreError),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO: {e}"),
            Self::MalformedRecord { line, fields } => write!(
                f,
                "malformed record at line {line}: expected {} fields, got {fields}",
                crate::order::FIELD_COUNT
            ),
            Self::Connection(e) => write!(f, "connection failed: {e}"),
            Self::Write(e) => write!(f, "bulk insert failed: {e}"),
            Self::Commit(e) => write!(f, "commit failed: {e}"),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::MalformedRecord { .. } => None,
            Self::Connection(e) | Self::Write(e) | Self::Commit(e) => Some(&**e),
        }
    }
}

impl From<std::io::Error> for IngestError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl IngestError {
    /// Short machine-readable label, used as the status column of timing rows
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io_error",
            Self::MalformedRecord { .. } => "malformed_record",
            Self::Connection(_) => "connection_failure",
            Self::Write(_) => "write_failure",
            Self::Commit(_) => "commit_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io::ErrorKind;

    fn store_err(msg: &str) -> StoreError {
        msg.to_string().into()
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::NonPositive {
            option: "batch-size",
            value: -3,
        };
        assert_eq!(
            err.to_string(),
            "batch-size must be a positive integer, got -3"
        );
    }

    #[test]
    fn malformed_record_display() {
        let err = IngestError::MalformedRecord { line: 12, fields: 9 };
        let msg = err.to_string();
        assert!(msg.contains("line 12"));
        assert!(msg.contains("expected 14"));
        assert!(msg.contains("got 9"));
    }

    #[test]
    fn kinds_are_distinct() {
        let kinds = [
            IngestError::Io(std::io::Error::new(ErrorKind::NotFound, "x")).kind(),
            IngestError::MalformedRecord { line: 1, fields: 1 }.kind(),
            IngestError::Connection(store_err("x")).kind(),
            IngestError::Write(store_err("x")).kind(),
            IngestError::Commit(store_err("x")).kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in &kinds[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn io_from_conversion() {
        let err: IngestError = std::io::Error::new(ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), "io_error");
        assert!(err.to_string().starts_with("IO:"));
    }

    #[test]
    fn write_error_keeps_source() {
        let err = IngestError::Write(store_err("constraint violated"));
        assert!(err.to_string().contains("constraint violated"));
        assert!(err.source().is_some());
    }
}
