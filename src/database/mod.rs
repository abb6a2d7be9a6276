//! Warehouse access for Folio
//!
//! The chat core talks to the warehouse through [`DatabaseExecutor`]. A
//! connection is scoped to one query: [`ScopedConnection`] opens it and
//! closes it again when dropped, on success and failure alike.

use crate::error::Result;

pub mod sqlite;
pub mod types;

pub use sqlite::SqliteExecutor;
pub use types::QueryResult;

/// Executes SQL text against the warehouse
pub trait DatabaseExecutor: Send {
    /// Open a connection
    ///
    /// # Errors
    ///
    /// Returns a database error when the warehouse cannot be reached
    fn connect(&mut self) -> Result<()>;

    /// Run one query and return its full result
    ///
    /// # Errors
    ///
    /// Returns an error when there is no open connection or the database
    /// rejects the SQL
    fn execute(&mut self, sql: &str) -> Result<QueryResult>;

    /// Close the connection; a no-op when already closed
    fn close(&mut self);

    /// Whether a connection is currently open
    fn is_connected(&self) -> bool;
}

/// RAII guard holding an open connection for the duration of one query
///
/// # Examples
///
/// ```
/// use folio::database::{DatabaseExecutor, ScopedConnection, SqliteExecutor};
///
/// # fn main() -> folio::error::Result<()> {
/// let mut executor = SqliteExecutor::in_memory();
/// {
///     let mut conn = ScopedConnection::open(&mut executor)?;
///     let result = conn.execute("SELECT 1 AS one")?;
///     assert_eq!(result.row_count(), 1);
/// }
/// assert!(!executor.is_connected());
/// # Ok(())
/// # }
/// ```
pub struct ScopedConnection<'a> {
    executor: &'a mut dyn DatabaseExecutor,
}

impl<'a> ScopedConnection<'a> {
    /// Connect the executor and return the guard
    ///
    /// # Errors
    ///
    /// Returns the executor's connect error
    pub fn open(executor: &'a mut dyn DatabaseExecutor) -> Result<Self> {
        executor.connect()?;
        Ok(Self { executor })
    }

    /// Run one query on the held connection
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult> {
        self.executor.execute(sql)
    }
}

impl Drop for ScopedConnection<'_> {
    fn drop(&mut self) {
        self.executor.close();
        tracing::debug!("Closed warehouse connection");
    }
}
