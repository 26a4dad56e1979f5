//! Driver-side contract for MySQL-compatible connections.
//!
//! The crate ships no concrete driver binding. Implement [`Connection`]
//! over the client library of your choice; the integration tests run
//! against an in-memory fake.

use chrono::NaiveDateTime;

use crate::Value;

/// Value shapes a driver can hand back for a single cell.
#[derive(Clone, Debug, PartialEq)]
pub enum RawValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    DateTime(NaiveDateTime),
}

/// Errors surfaced by a driver implementation.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// A forward-only row reader is still open on the connection.
    ///
    /// This is the one retryable probe outcome; everything else is fatal.
    #[error("a reader is already open on this connection")]
    ReaderOpen,
    /// The connection has not been opened, or was closed.
    #[error("connection is not open")]
    NotOpen,
    /// Any other driver-side failure.
    #[error("{0}")]
    Other(String),
}

/// Outcome of executing one statement.
pub enum ExecOutcome {
    /// Row-bearing statements yield a forward-only cursor.
    Rows(Box<dyn RowCursor>),
    /// Everything else yields a rows-affected count.
    Affected(u64),
}

/// One physical MySQL-compatible connection.
///
/// `execute` receives the rendered SQL text together with the ordered
/// positional values its `@N` placeholders refer to. The connection is
/// exclusively owned by one client; all open/close mutation routes
/// through that owner.
pub trait Connection: Send {
    fn open(&mut self) -> Result<(), DriverError>;

    fn close(&mut self) -> Result<(), DriverError>;

    /// Lightweight liveness probe.
    ///
    /// Must report [`DriverError::ReaderOpen`] while a cursor from a
    /// previous `execute` is still open on this connection.
    fn ping(&mut self) -> Result<(), DriverError>;

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecOutcome, DriverError>;
}

/// Forward-only cursor over result rows.
pub trait RowCursor: Send {
    /// Column names in result order.
    fn column_names(&self) -> &[String];

    /// Fetches the next row, or `None` once the cursor is exhausted.
    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>, DriverError>;
}
