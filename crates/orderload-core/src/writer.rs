//! Bulk writer: one INSERT per batch on a caller-owned connection

use crate::error::IngestError;
use crate::order::Order;
use crate::statement::{ConflictPolicy, InsertStatement};
use crate::store::StoreConnection;

/// Writes order batches into one table.
///
/// Stateless between calls; the connection (and its transaction) belongs to
/// the caller, which decides when to commit.
#[derive(Debug, Clone)]
pub struct BulkWriter {
    table: String,
    on_conflict: ConflictPolicy,
}

impl BulkWriter {
    pub fn new(table: impl Into<String>, on_conflict: ConflictPolicy) -> Self {
        Self {
            table: table.into(),
            on_conflict,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Insert `batch` and return the first identifier the backend reported.
    ///
    /// `None` means the backend returned no ids (for instance every row was
    /// skipped as a conflict). An empty batch issues no statement.
    pub fn write<C: StoreConnection>(
        &self,
        conn: &mut C,
        batch: &[Order],
    ) -> Result<Option<i64>, IngestError> {
        if batch.is_empty() {
            return Ok(None);
        }
        let stmt = InsertStatement::new(&self.table, batch, self.on_conflict);
        let ids = conn.insert_returning(&stmt).map_err(IngestError::Write)?;
        Ok(ids.first().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;

    /// Records every statement; optionally fails or returns canned ids.
    #[derive(Default)]
    struct Recording {
        statements: Vec<(String, usize)>,
        ids: Vec<i64>,
        fail: bool,
    }

    impl StoreConnection for Recording {
        fn insert_returning(&mut self, stmt: &InsertStatement<'_>) -> Result<Vec<i64>, StoreError> {
            if self.fail {
                return Err("constraint violated".into());
            }
            self.statements
                .push((stmt.sql().to_string(), stmt.rows().len()));
            Ok(self.ids.clone())
        }

        fn commit(self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn batch(n: usize) -> Vec<Order> {
        (0..n)
            .map(|i| {
                Order::parse_line(
                    &format!("{i},1,1,1,1,1.0,0,0,1.0,0,0,1,USD,2020-02-02 02:02:02"),
                    i + 1,
                )
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn returns_first_id() {
        let writer = BulkWriter::new("orders", ConflictPolicy::Fail);
        let mut conn = Recording {
            ids: vec![17, 18, 19],
            ..Default::default()
        };
        assert_eq!(writer.write(&mut conn, &batch(3)).unwrap(), Some(17));
        assert_eq!(conn.statements.len(), 1);
        assert_eq!(conn.statements[0].1, 3);
    }

    #[test]
    fn no_ids_is_none() {
        let writer = BulkWriter::new("orders", ConflictPolicy::Ignore);
        let mut conn = Recording::default();
        assert_eq!(writer.write(&mut conn, &batch(2)).unwrap(), None);
        assert!(conn.statements[0].0.contains("ON CONFLICT DO NOTHING"));
    }

    #[test]
    fn empty_batch_issues_nothing() {
        let writer = BulkWriter::new("orders", ConflictPolicy::Fail);
        let mut conn = Recording::default();
        assert_eq!(writer.write(&mut conn, &[]).unwrap(), None);
        assert!(conn.statements.is_empty());
    }

    #[test]
    fn backend_error_is_write_failure() {
        let writer = BulkWriter::new("orders", ConflictPolicy::Fail);
        let mut conn = Recording {
            fail: true,
            ..Default::default()
        };
        let err = writer.write(&mut conn, &batch(1)).unwrap_err();
        assert_eq!(err.kind(), "write_failure");
        assert!(err.to_string().contains("constraint violated"));
    }

    #[test]
    fn targets_configured_table() {
        let writer = BulkWriter::new("orders_archive", ConflictPolicy::Fail);
        let mut conn = Recording::default();
        writer.write(&mut conn, &batch(1)).unwrap();
        assert!(conn.statements[0].0.starts_with("INSERT INTO orders_archive "));
        assert_eq!(writer.table(), "orders_archive");
    }
}
