//! Multi-row INSERT construction for order batches.
//!
//! One statement covers a whole batch: a `(?, ?, ...)` group per row, every
//! field bound as a parameter in positional order, and `RETURNING OrderId` so
//! the backend reports the generated identifiers. Every field is bound as its
//! raw text token and the backend casts it to the column type, so no record
//! content ever becomes part of the SQL text.

use std::fmt::Write;

use crate::order::{COLUMNS, FIELD_COUNT, Order};

/// What the backend should do when a row collides with an existing key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Reject the batch (the default)
    #[default]
    Fail,
    /// Skip colliding rows; they return no identifier
    Ignore,
}

impl ConflictPolicy {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "fail" => Some(Self::Fail),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fail => "fail",
            Self::Ignore => "ignore",
        }
    }
}

/// A prepared-style bulk insert for one batch.
///
/// Borrows the batch; parameters are produced without copying any field.
#[derive(Debug)]
pub struct InsertStatement<'a> {
    sql: String,
    rows: &'a [Order],
}

impl<'a> InsertStatement<'a> {
    /// Build the statement for `rows` against `table`.
    ///
    /// `rows` must be non-empty: an INSERT without a VALUES group is invalid.
    pub fn new(table: &str, rows: &'a [Order], on_conflict: ConflictPolicy) -> Self {
        debug_assert!(!rows.is_empty(), "bulk insert of an empty batch");

        let group = row_placeholders();
        let mut sql =
            String::with_capacity(96 + COLUMNS.len() * 24 + rows.len() * (group.len() + 2));
        let _ = write!(sql, "INSERT INTO {} ({}) VALUES ", table, COLUMNS.join(", "));
        for i in 0..rows.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&group);
        }
        if on_conflict == ConflictPolicy::Ignore {
            sql.push_str(" ON CONFLICT DO NOTHING");
        }
        sql.push_str(" RETURNING ");
        sql.push_str(COLUMNS[0]);

        Self { sql, rows }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn rows(&self) -> &'a [Order] {
        self.rows
    }

    /// Number of bound parameters (14 per row)
    pub fn param_count(&self) -> usize {
        self.rows.len() * FIELD_COUNT
    }

    /// Bound parameters, row by row, each row in positional field order.
    pub fn params(&self) -> impl Iterator<Item = &'a str> + 'a {
        let rows: &'a [Order] = self.rows;
        rows.iter().flat_map(|o| o.fields())
    }
}

/// `(?, ?, ..., ?)` for a single row
fn row_placeholders() -> String {
    let mut s = String::with_capacity(FIELD_COUNT * 3 + 2);
    s.push('(');
    for i in 0..FIELD_COUNT {
        if i > 0 {
            s.push_str(", ");
        }
        s.push('?');
    }
    s.push(')');
    s
}
