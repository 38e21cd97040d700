//! Connection provider traits and the DuckDB backend

use std::sync::Mutex;

use crate::error::StoreError;
use crate::statement::InsertStatement;

/// One open, transaction-scoped link to the storage backend.
///
/// Owned by exactly one file ingest. Writes become visible only through
/// [`commit`](StoreConnection::commit); dropping a connection that was not
/// committed must discard them.
pub trait StoreConnection {
    /// Execute a bulk insert and fetch the identifiers the backend returned.
    ///
    /// The backend decides the order of the returned ids and may return fewer
    /// ids than rows (e.g. when conflicting rows are skipped).
    fn insert_returning(&mut self, stmt: &InsertStatement<'_>) -> Result<Vec<i64>, StoreError>;

    /// Commit every write issued on this connection as one unit, then close.
    fn commit(self) -> Result<(), StoreError>;
}

/// Hands out fresh connections, one per file.
///
/// Shared by all workers, so it must be `Sync`; the connections it returns
/// are moved into a single worker and never shared.
pub trait ConnectionProvider: Sync {
    type Conn: StoreConnection;

    fn open(&self) -> Result<Self::Conn, StoreError>;
}

/// Table DDL for the orders table.
///
/// Only bootstraps an empty database; existing tables are left untouched.
pub fn create_table_sql(table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {table} (
    OrderId BIGINT PRIMARY KEY,
    CustomerId BIGINT,
    OrderStatusId INTEGER,
    PaymentStatusId INTEGER,
    ShippingStatusId INTEGER,
    OrderSubTotalInclTax DECIMAL(18,4),
    OrderSubtotalDiscountInclTax DECIMAL(18,4),
    OrderSubtotalDiscountExclTax DECIMAL(18,4),
    OrderTotal DECIMAL(18,4),
    RefundedAmount DECIMAL(18,4),
    OrderDiscount DECIMAL(18,4),
    CurrencyRate DECIMAL(18,6),
    CurrencyCode VARCHAR,
    OrderDateTime TIMESTAMP
)"
    )
}

/// Settings for opening a DuckDB database
#[derive(Debug, Clone)]
pub struct DuckDbOptions {
    /// Database file, or `:memory:`
    pub path: String,
    pub table: String,
    /// Create the orders table when missing
    pub create_table: bool,
    /// DuckDB memory limit (e.g. "4GB")
    pub memory_limit: Option<String>,
    /// DuckDB internal thread count
    pub threads: Option<usize>,
}

impl Default for DuckDbOptions {
    fn default() -> Self {
        Self {
            path: "orders.duckdb".to_string(),
            table: "orders".to_string(),
            create_table: true,
            memory_limit: None,
            threads: None,
        }
    }
}

/// DuckDB-backed provider.
///
/// Holds one root connection to the database; every [`open`](ConnectionProvider::open)
/// clones it into an independent connection with its own transaction, so all
/// workers write to the same database instance.
pub struct DuckDbProvider {
    root: Mutex<duckdb::Connection>,
}

impl std::fmt::Debug for DuckDbProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbProvider").finish_non_exhaustive()
    }
}

impl DuckDbProvider {
    /// Open (or create) the database and apply settings.
    pub fn connect(opts: &DuckDbOptions) -> Result<Self, StoreError> {
        let conn = if opts.path == ":memory:" {
            duckdb::Connection::open_in_memory()?
        } else {
            duckdb::Connection::open(&opts.path)?
        };

        let mut settings = String::new();
        if let Some(limit) = &opts.memory_limit {
            settings.push_str(&format!("SET memory_limit = '{limit}';"));
        }
        if let Some(threads) = opts.threads {
            settings.push_str(&format!("SET threads = {threads};"));
        }
        if !settings.is_empty() {
            conn.execute_batch(&settings)?;
        }

        if opts.create_table {
            conn.execute_batch(&create_table_sql(&opts.table))?;
        }
        log::debug!("Opened DuckDB database {}", opts.path);
        Ok(Self::from_connection(conn))
    }

    /// Wrap an already configured connection
    pub fn from_connection(conn: duckdb::Connection) -> Self {
        Self {
            root: Mutex::new(conn),
        }
    }

    /// Run `f` against the root connection (outside any ingest transaction)
    pub fn with_root<T>(
        &self,
        f: impl FnOnce(&duckdb::Connection) -> duckdb::Result<T>,
    ) -> Result<T, StoreError> {
        let root = self
            .root
            .lock()
            .map_err(|_| StoreError::from("root connection lock poisoned"))?;
        Ok(f(&*root)?)
    }
}

impl ConnectionProvider for DuckDbProvider {
    type Conn = DuckDbConnection;

    fn open(&self) -> Result<DuckDbConnection, StoreError> {
        let conn = self.with_root(|root| root.try_clone())?;
        conn.execute_batch("BEGIN TRANSACTION")?;
        Ok(DuckDbConnection {
            conn,
            in_transaction: true,
        })
    }
}

/// A DuckDB connection with an open transaction.
///
/// Dropped without [`commit`](StoreConnection::commit), it rolls back
/// explicitly instead of relying on DuckDB's close-time behavior.
pub struct DuckDbConnection {
    conn: duckdb::Connection,
    in_transaction: bool,
}

impl std::fmt::Debug for DuckDbConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDbConnection")
            .field("in_transaction", &self.in_transaction)
            .finish_non_exhaustive()
    }
}

impl StoreConnection for DuckDbConnection {
    fn insert_returning(&mut self, stmt: &InsertStatement<'_>) -> Result<Vec<i64>, StoreError> {
        let mut prepared = self.conn.prepare(stmt.sql())?;
        let ids = prepared
            .query_map(duckdb::params_from_iter(stmt.params()), |row| {
                row.get::<_, i64>(0)
            })?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn commit(mut self) -> Result<(), StoreError> {
        // Cleared first: a failed COMMIT leaves nothing for Drop to roll back
        self.in_transaction = false;
        self.conn.execute_batch("COMMIT")?;
        Ok(())
    }
}

impl Drop for DuckDbConnection {
    fn drop(&mut self) {
        if self.in_transaction {
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                log::warn!("Rollback of uncommitted transaction failed: {e}");
            }
        }
    }
}
