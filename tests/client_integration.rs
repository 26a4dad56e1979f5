use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use gatedb_mysql::driver::{Connection, DriverError, ExecOutcome, RawValue, RowCursor};
use gatedb_mysql::{
    ClientOptions, ComparisonOperator, ExecStatus, GateDbClient, NameAliasTable, SelectIntent,
    TypeTag, UpdateOperation, UpsertIntent, Value,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[derive(Clone)]
enum FakeResponse {
    Rows {
        names: Vec<String>,
        rows: Vec<Vec<RawValue>>,
    },
    Affected(u64),
    Fail(String),
}

#[derive(Default)]
struct FakeState {
    opened: bool,
    probes: usize,
    /// Number of upcoming probes that still report an open reader.
    reader_open_probes: usize,
    responses: VecDeque<FakeResponse>,
    executed: Vec<(String, Vec<Value>)>,
    execute_delay: Duration,
}

#[derive(Clone)]
struct FakeConnection {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnection {
    fn new(responses: Vec<FakeResponse>) -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                responses: responses.into(),
                ..Default::default()
            })),
        }
    }

    fn state(&self) -> Arc<Mutex<FakeState>> {
        Arc::clone(&self.state)
    }
}

struct FakeCursor {
    names: Vec<String>,
    rows: VecDeque<Vec<RawValue>>,
}

impl RowCursor for FakeCursor {
    fn column_names(&self) -> &[String] {
        &self.names
    }

    fn next_row(&mut self) -> Result<Option<Vec<RawValue>>, DriverError> {
        Ok(self.rows.pop_front())
    }
}

impl Connection for FakeConnection {
    fn open(&mut self) -> Result<(), DriverError> {
        self.state.lock().expect("state lock").opened = true;
        Ok(())
    }

    fn close(&mut self) -> Result<(), DriverError> {
        self.state.lock().expect("state lock").opened = false;
        Ok(())
    }

    fn ping(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.lock().expect("state lock");
        state.probes += 1;
        if !state.opened {
            return Err(DriverError::NotOpen);
        }
        if state.reader_open_probes > 0 {
            state.reader_open_probes -= 1;
            return Err(DriverError::ReaderOpen);
        }
        Ok(())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<ExecOutcome, DriverError> {
        let (response, delay) = {
            let mut state = self.state.lock().expect("state lock");
            state.executed.push((sql.to_owned(), params.to_vec()));
            (state.responses.pop_front(), state.execute_delay)
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        match response {
            Some(FakeResponse::Rows { names, rows }) => Ok(ExecOutcome::Rows(Box::new(FakeCursor {
                names,
                rows: rows.into(),
            }))),
            Some(FakeResponse::Affected(count)) => Ok(ExecOutcome::Affected(count)),
            Some(FakeResponse::Fail(message)) => Err(DriverError::Other(message)),
            None => Err(DriverError::Other("no scripted response".to_owned())),
        }
    }
}

fn opened_client(conn: FakeConnection) -> GateDbClient<FakeConnection> {
    let client = GateDbClient::with_options(
        conn,
        NameAliasTable::new(),
        ClientOptions {
            reader_poll_interval_ms: 1,
        },
    );
    client.open_sync().expect("must open");
    client
}

fn username_rows() -> FakeResponse {
    FakeResponse::Rows {
        names: vec![
            "PlayerName".to_owned(),
            "CharacterName".to_owned(),
            "NickName".to_owned(),
        ],
        rows: vec![vec![
            RawValue::Text("alpha".to_owned()),
            RawValue::Text("beta".to_owned()),
            RawValue::Text("gamma".to_owned()),
        ]],
    }
}

#[test]
fn select_end_to_end() {
    init_tracing();
    let conn = FakeConnection::new(vec![username_rows()]);
    let state = conn.state();
    let client = opened_client(conn);

    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&invoked);
    let intent = SelectIntent::new("usernames")
        .column("PlayerName", TypeTag::Text)
        .column("CharacterName", TypeTag::Text)
        .column("NickName", TypeTag::Text)
        .filter("Steam64", ComparisonOperator::Equal, 123_u64)
        .limit(1);

    let output = client
        .submit_select(intent, move |output| {
            assert_eq!(output.status(), ExecStatus::Success);
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .wait()
        .expect("must deliver");

    let select = output.as_select().expect("select result");
    assert_eq!(select.status, ExecStatus::Success);
    assert_eq!(select.column("PlayerName").expect("column").value(0), Value::Text("alpha".to_owned()));
    assert_eq!(select.column("NickName").expect("column").value(0), Value::Text("gamma".to_owned()));
    assert_eq!(invoked.load(Ordering::SeqCst), 1);

    let state = state.lock().expect("state lock");
    assert_eq!(
        state.executed[0].0,
        "SELECT `PlayerName`, `CharacterName`, `NickName` FROM `usernames` \
         WHERE `Steam64` = @0 LIMIT 1;"
    );
    assert_eq!(state.executed[0].1, vec![Value::UInt64(123)]);
}

#[test]
fn upsert_end_to_end() {
    init_tracing();
    let conn = FakeConnection::new(vec![FakeResponse::Affected(2)]);
    let state = conn.state();
    let client = opened_client(conn);

    let intent = UpsertIntent::new("ip_addresses")
        .value("Steam64", 123_u64)
        .value("Packed", 456_u64)
        .update("Packed", UpdateOperation::Add)
        .update_value(10_u64);

    let output = client.submit_upsert(intent, |_| {}).wait().expect("must deliver");
    let non_query = output.as_non_query().expect("non-query result");
    assert_eq!(non_query.status, ExecStatus::Success);
    assert_eq!(non_query.rows_affected, 2);

    let state = state.lock().expect("state lock");
    assert_eq!(
        state.executed[0].0,
        "INSERT INTO `ip_addresses` (`Steam64`, `Packed`) VALUES(@0, @1) \
         ON DUPLICATE KEY UPDATE `Packed` = Packed + @2;"
    );
    assert_eq!(
        state.executed[0].1,
        vec![Value::UInt64(123), Value::UInt64(456), Value::UInt64(10)]
    );
}

#[test]
fn gate_probes_until_reader_closes() {
    init_tracing();
    let conn = FakeConnection::new(vec![username_rows()]);
    let state = conn.state();
    state.lock().expect("state lock").reader_open_probes = 5;
    let client = opened_client(conn);

    let output = client
        .submit_select(SelectIntent::all("usernames"), |_| {})
        .wait()
        .expect("must deliver");

    assert_eq!(output.status(), ExecStatus::Success);
    // Five probes saw the open reader; the sixth admitted the operation.
    assert_eq!(state.lock().expect("state lock").probes, 6);
}

#[test]
fn execution_failure_folds_into_result() {
    init_tracing();
    let conn = FakeConnection::new(vec![FakeResponse::Fail("duplicate entry".to_owned())]);
    let client = opened_client(conn);

    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&invoked);
    let output = client
        .submit_upsert(
            UpsertIntent::new("t")
                .value("A", 1_i64)
                .update("A", UpdateOperation::SetFromValues),
            move |output| {
                assert_eq!(output.status(), ExecStatus::Failure);
                seen.fetch_add(1, Ordering::SeqCst);
            },
        )
        .wait()
        .expect("must deliver");

    assert_eq!(output.status(), ExecStatus::Failure);
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
}

#[test]
fn unexpected_result_shape_is_a_failure_with_continuation() {
    init_tracing();
    // A select that the driver answers with a rows-affected count.
    let conn = FakeConnection::new(vec![FakeResponse::Affected(1)]);
    let client = opened_client(conn);

    let invoked = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&invoked);
    let output = client
        .submit_select(SelectIntent::all("t"), move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        })
        .wait()
        .expect("must deliver");

    assert_eq!(output.status(), ExecStatus::Failure);
    assert!(output.as_select().is_some());
    assert_eq!(invoked.load(Ordering::SeqCst), 1);
}

#[test]
fn unsigned64_survives_the_full_stack() {
    init_tracing();
    let conn = FakeConnection::new(vec![FakeResponse::Rows {
        names: vec!["Steam64".to_owned()],
        rows: vec![vec![RawValue::UInt(18_446_744_073_709_551_615)]],
    }]);
    let client = opened_client(conn);

    let output = client
        .submit_select(
            SelectIntent::new("usernames").column("Steam64", TypeTag::Unsigned64),
            |_| {},
        )
        .wait()
        .expect("must deliver");

    let select = output.as_select().expect("select result");
    assert_eq!(
        select.column("Steam64").expect("column").value(0),
        Value::UInt64(u64::MAX)
    );
}

#[test]
fn concurrent_submissions_all_complete() {
    init_tracing();
    let conn = FakeConnection::new(vec![FakeResponse::Affected(1); 4]);
    let client = opened_client(conn);

    let invoked = Arc::new(AtomicUsize::new(0));
    let handles: Vec<_> = (0..4)
        .map(|index| {
            let seen = Arc::clone(&invoked);
            client.submit_upsert(
                UpsertIntent::new("t")
                    .value("A", index as i64)
                    .update("A", UpdateOperation::SetFromValues),
                move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                },
            )
        })
        .collect();

    for handle in handles {
        handle.wait().expect("must deliver");
    }
    assert_eq!(invoked.load(Ordering::SeqCst), 4);
}

#[test]
fn teardown_drains_in_flight_work() {
    init_tracing();
    let conn = FakeConnection::new(vec![FakeResponse::Affected(1)]);
    let state = conn.state();
    state.lock().expect("state lock").execute_delay = Duration::from_millis(20);
    let client = opened_client(conn);

    let handle = client.submit_upsert(
        UpsertIntent::new("t")
            .value("A", 1_i64)
            .update("A", UpdateOperation::SetFromValues),
        |_| {},
    );

    let output = client.get_response(handle).expect("must deliver");
    assert_eq!(output.status(), ExecStatus::Success);

    client.close_sync().expect("must close");
    assert!(!state.lock().expect("state lock").opened);
}
