//! Background execution of typed query descriptors over one connection.
//!
//! Each submission spawns a worker that runs
//! {gate admission -> build -> execute -> decode} and delivers the
//! outcome exactly once: to the caller-supplied continuation and over
//! the handle's channel. Errors never cross the async boundary — they
//! are logged with the command text and folded into a FAILURE-status
//! result.

use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use crate::alias::NameAliasTable;
use crate::builder::{build_select, build_upsert};
use crate::decode;
use crate::driver::{Connection, ExecOutcome};
use crate::error::GateDbError;
use crate::gate::ConnectionGate;
use crate::intent::{SelectIntent, Statement, UpsertIntent};
use crate::options::ClientOptions;
use crate::types::QueryOutput;
use crate::value::TypeTag;
use crate::Result;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Shared<C> {
    conn: Mutex<C>,
    gate: ConnectionGate,
}

/// Client owning exactly one MySQL-compatible connection.
///
/// Submissions run on background workers and race for the gate, so
/// completion order across concurrent submissions is not defined.
/// There is no cancellation or timeout: once submitted, an operation
/// always runs to completion.
pub struct GateDbClient<C: Connection> {
    shared: Arc<Shared<C>>,
    aliases: Arc<NameAliasTable>,
}

impl<C: Connection> Clone for GateDbClient<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            aliases: Arc::clone(&self.aliases),
        }
    }
}

impl<C: Connection + 'static> GateDbClient<C> {
    /// Creates a client over an unopened connection.
    pub fn new(conn: C, aliases: NameAliasTable) -> Self {
        Self::with_options(conn, aliases, ClientOptions::default())
    }

    /// Creates a client with explicit gate options.
    pub fn with_options(conn: C, aliases: NameAliasTable, options: ClientOptions) -> Self {
        let poll_interval = Duration::from_millis(options.reader_poll_interval_ms);
        Self {
            shared: Arc::new(Shared {
                conn: Mutex::new(conn),
                gate: ConnectionGate::new(poll_interval),
            }),
            aliases: Arc::new(aliases),
        }
    }

    /// Opens the connection, blocking the caller.
    pub fn open_sync(&self) -> Result<()> {
        lock(&self.shared.conn).open().map_err(GateDbError::from)
    }

    /// Opens the connection on a background worker.
    pub fn open_async(&self) -> JobHandle<Result<()>> {
        let shared = Arc::clone(&self.shared);
        JobHandle::spawn(move || lock(&shared.conn).open().map_err(GateDbError::from))
    }

    /// Closes the connection after in-flight work has drained.
    pub fn close_sync(&self) -> Result<()> {
        let _permit = self.shared.gate.acquire();
        lock(&self.shared.conn).close().map_err(GateDbError::from)
    }

    /// Closes the connection on a background worker.
    pub fn close_async(&self) -> JobHandle<Result<()>> {
        let shared = Arc::clone(&self.shared);
        JobHandle::spawn(move || {
            let _permit = shared.gate.acquire();
            lock(&shared.conn).close().map_err(GateDbError::from)
        })
    }

    /// Submits a select; the caller is never blocked.
    ///
    /// The continuation is invoked exactly once, with either the decoded
    /// result or a FAILURE-status result — never twice, never zero
    /// times. The same outcome is also delivered through the handle.
    pub fn submit_select<F>(&self, intent: SelectIntent, continuation: F) -> JobHandle<QueryOutput>
    where
        F: FnOnce(QueryOutput) + Send + 'static,
    {
        let statement = build_select(&intent, &self.aliases);
        let plan: Vec<(String, TypeTag)> = intent
            .columns
            .iter()
            .map(|(key, tag)| {
                (
                    self.aliases.resolve_column(&intent.table, key).to_owned(),
                    *tag,
                )
            })
            .collect();
        let select_all = intent.select_all;
        let shared = Arc::clone(&self.shared);

        JobHandle::spawn_with_continuation(continuation, move || {
            run_statement(&shared, &statement, &plan, select_all)
        })
    }

    /// Submits an upsert; the caller is never blocked.
    ///
    /// Same exactly-once continuation contract as
    /// [`GateDbClient::submit_select`].
    pub fn submit_upsert<F>(&self, intent: UpsertIntent, continuation: F) -> JobHandle<QueryOutput>
    where
        F: FnOnce(QueryOutput) + Send + 'static,
    {
        let statement = build_upsert(&intent, &self.aliases);
        let shared = Arc::clone(&self.shared);

        JobHandle::spawn_with_continuation(continuation, move || {
            run_statement(&shared, &statement, &[], false)
        })
    }

    /// Blocking wait for a submission's outcome.
    ///
    /// Teardown paths use this to drain in-flight work before disposing
    /// of the connection.
    pub fn get_response<T: Send + 'static>(&self, handle: JobHandle<T>) -> Result<T> {
        handle.wait()
    }
}

/// Runs one statement end to end under the gate.
///
/// The permit is held until the cursor is drained, so a second
/// reader-bearing operation can never overlap with this one.
fn run_statement<C: Connection>(
    shared: &Shared<C>,
    statement: &Statement,
    plan: &[(String, TypeTag)],
    select_all: bool,
) -> QueryOutput {
    let command = &statement.sql;

    let admitted = shared.gate.admit(|| lock(&shared.conn).ping());
    let _permit = match admitted {
        Ok(permit) => permit,
        Err(err) => {
            let error = GateDbError::Connection(err);
            tracing::error!(command = %command, error = %error, "connection probe failed");
            return failure_output(statement);
        }
    };

    let outcome = lock(&shared.conn).execute(&statement.sql, &statement.params);
    match outcome {
        Ok(ExecOutcome::Rows(mut cursor)) if statement.want_rows => QueryOutput::Select(
            decode::decode_select(command, plan, select_all, cursor.as_mut()),
        ),
        Ok(ExecOutcome::Affected(count)) if !statement.want_rows => {
            QueryOutput::NonQuery(decode::decode_non_query(command, count))
        }
        Ok(_) => {
            let error = GateDbError::ProtocolMismatch(format!(
                "unexpected result shape for `{command}`"
            ));
            tracing::error!(error = %error, "completion path mismatch");
            failure_output(statement)
        }
        Err(err) => {
            let error = GateDbError::Execution {
                command: command.clone(),
                detail: err.to_string(),
            };
            tracing::error!(error = %error, "statement execution failed");
            failure_output(statement)
        }
    }
}

fn failure_output(statement: &Statement) -> QueryOutput {
    if statement.want_rows {
        QueryOutput::Select(decode::select_failure(&statement.sql))
    } else {
        QueryOutput::NonQuery(decode::non_query_failure(&statement.sql))
    }
}

/// Handle to one submitted operation.
///
/// Dropping the handle detaches the worker, which still runs to
/// completion and still invokes its continuation.
pub struct JobHandle<T> {
    rx: mpsc::Receiver<T>,
    worker: Option<thread::JoinHandle<()>>,
}

impl<T: Send + 'static> JobHandle<T> {
    fn spawn<F>(job: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let _ = tx.send(job());
        });
        Self {
            rx,
            worker: Some(worker),
        }
    }

    fn spawn_with_continuation<F, G>(continuation: G, job: F) -> Self
    where
        T: Clone,
        F: FnOnce() -> T + Send + 'static,
        G: FnOnce(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let output = job();
            let _ = tx.send(output.clone());
            continuation(output);
        });
        Self {
            rx,
            worker: Some(worker),
        }
    }

    /// Blocks until the worker delivers the outcome.
    pub fn wait(mut self) -> Result<T> {
        let output = self.rx.recv().map_err(|_| {
            GateDbError::ProtocolMismatch("worker terminated without delivering a result".to_owned())
        });
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        output
    }
}
