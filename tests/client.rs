use std::sync::{Arc, Mutex};

use basedb::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder, StatementKind};
use basedb::traits::{Connector, TraceEvent, TraceSink};
use basedb::types::{Params, ResultSet, RowMode, SqlValue};
use basedb::{BaseDb, ConnectOptions, DbError};

fn connect(driver: &Arc<InMemoryTestDriver>, options: ConnectOptions) -> BaseDb {
    let connector: Arc<dyn Connector> = Arc::clone(driver) as Arc<dyn Connector>;
    BaseDb::with_connector(options, connector).unwrap()
}

fn options() -> ConnectOptions {
    ConnectOptions::new("root", "secret").database("test")
}

#[derive(Default)]
struct RecordingSink {
    statements: Mutex<Vec<(String, bool, Option<u64>)>>,
    probes: Mutex<Vec<bool>>,
}

impl TraceSink for RecordingSink {
    fn record(&self, event: &TraceEvent<'_>) {
        match event {
            TraceEvent::Probe { ok, .. } => self.probes.lock().unwrap().push(*ok),
            TraceEvent::Statement {
                statement,
                error,
                row_count,
                ..
            } => self.statements.lock().unwrap().push((
                statement.to_string(),
                error.is_none(),
                *row_count,
            )),
        }
    }
}

#[test]
fn test_select_single_row() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row(&["1", "John"])
                .build(),
        ),
    );
    let mut db = connect(&in_memory_test_driver, options());

    let result = db.execute("SELECT * FROM users WHERE id=1");

    in_memory_test_driver.assert_last_query("SELECT * FROM users WHERE id=1", &Params::Empty);
    in_memory_test_driver.assert_query_count(1);

    assert!(result.is_success());
    assert!(result.error().is_none());
    assert_eq!(result.row_count(), Some(1));
    let row = result.first().unwrap();
    assert_eq!(row.get("id"), Some(&SqlValue::from("1")));
    assert_eq!(row.get("name"), Some(&SqlValue::from("John")));
    assert_eq!(result.first(), result.last());
}

#[test]
fn test_null_marker_is_replaced() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(InMemoryTestResponseBuilder::new().affected_rows(1).build()),
    );
    let mut db = connect(&in_memory_test_driver, options());

    let result = db.execute("INSERT INTO t(x) VALUES (None)");

    in_memory_test_driver.assert_last_query("INSERT INTO t(x) VALUES (NULL)", &Params::Empty);
    assert_eq!(result.row_count(), Some(1));
    assert_eq!(result.rows().map(|rows| rows.len()), Some(0));
}

#[test]
fn test_every_null_marker_is_replaced() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());

    db.execute("UPDATE t SET a = None, b = None WHERE c IS None");

    in_memory_test_driver.assert_last_query(
        "UPDATE t SET a = NULL, b = NULL WHERE c IS NULL",
        &Params::Empty,
    );
}

#[test]
fn test_missing_table_is_captured() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new().with_error(DbError::Query(
        "ERROR 1146 (42S02): Table 'test.nonexistent_table' doesn't exist".to_string(),
    )));
    let mut db = connect(&in_memory_test_driver, options());

    let result = db.execute("SELECT * FROM nonexistent_table");

    assert!(!result.is_success());
    assert!(result.rows().is_none());
    assert!(result.row_count().is_none());
    assert!(result.first().is_none());
    let error = result.error().unwrap().to_string();
    assert!(error.contains("nonexistent_table"));
    assert!(error.contains("doesn't exist"));
}

#[test]
fn test_reconnects_when_probe_fails() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["7"])
                .build(),
        ),
    );
    let mut db = connect(&in_memory_test_driver, options());
    in_memory_test_driver.fail_pings(1);

    let result = db.execute("SELECT id FROM users");

    assert!(result.is_success());
    assert_eq!(result.row_count(), Some(1));
    assert_eq!(in_memory_test_driver.connect_count(), 2);
    assert_eq!(in_memory_test_driver.last_query().unwrap().connection, 2);
    assert_eq!(in_memory_test_driver.last_options(), Some(options()));
}

#[test]
fn test_reconnect_failure_is_captured() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());
    in_memory_test_driver.fail_pings(1);
    in_memory_test_driver.fail_connects(1);

    let result = db.execute("SELECT 1");

    assert!(matches!(result.error(), Some(DbError::Connection(_))));
    in_memory_test_driver.assert_query_count(0);
}

#[test]
fn test_initial_connect_failure_propagates() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    in_memory_test_driver.fail_connects(1);
    let connector: Arc<dyn Connector> = Arc::clone(&in_memory_test_driver) as Arc<dyn Connector>;

    let err = BaseDb::with_connector(options(), connector).err().unwrap();

    assert!(matches!(err, DbError::Connection(message) if message.contains("127.0.0.1:3306")));
}

#[test]
fn test_named_params_are_bound() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());

    db.execute_with(
        "SELECT * FROM users WHERE name = :name AND age > :age",
        Params::named([("name", SqlValue::from("Bob")), ("age", SqlValue::from(30))]),
    );

    in_memory_test_driver.assert_last_query(
        "SELECT * FROM users WHERE name = :name AND age > :age",
        &Params::Named(vec![
            ("name".to_string(), SqlValue::Text("Bob".to_string())),
            ("age".to_string(), SqlValue::Int32(30)),
        ]),
    );
}

#[test]
fn test_positional_params_are_bound() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());

    db.execute_with("DELETE FROM users WHERE id = ?", Params::positional([5i64]));

    in_memory_test_driver.assert_last_query(
        "DELETE FROM users WHERE id = ?",
        &Params::Positional(vec![SqlValue::Int64(5)]),
    );
}

#[test]
fn test_insert_reports_last_id() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(InMemoryTestResponseBuilder::new().affected_rows(1).build())
            .with_insert_id(42),
    );
    let mut db = connect(&in_memory_test_driver, options());

    let result = db.insert("INSERT INTO users(name) VALUES ('Jane')");

    assert!(result.is_success());
    assert_eq!(result.row_count(), Some(1));
    assert_eq!(result.insert_id(), Some(42));
    assert_eq!(result.result(), Some(&ResultSet::InsertId(42)));
    assert!(!db.is_connected());
}

#[test]
fn test_insert_failure_has_no_id() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_error(DbError::Query("Duplicate entry '1' for key 'PRIMARY'".to_string()))
            .with_insert_id(42),
    );
    let mut db = connect(&in_memory_test_driver, options());

    let result = db.insert_with(
        "INSERT INTO users(id) VALUES (?)",
        Params::positional([1]),
    );

    assert!(!result.is_success());
    assert!(result.insert_id().is_none());
}

#[test]
fn test_call_procedure() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["total"])
                .row(&["3"])
                .build(),
        ),
    );
    let mut db = connect(&in_memory_test_driver, options());
    in_memory_test_driver.fail_pings(1);

    let result = db.call_with("count_orders", Params::positional([9]));

    let recorded = in_memory_test_driver.last_query().unwrap();
    assert_eq!(recorded.kind, StatementKind::Procedure);
    assert_eq!(recorded.sql, "count_orders");
    assert_eq!(recorded.params, Params::Positional(vec![SqlValue::Int32(9)]));
    assert_eq!(recorded.connection, 2);
    assert_eq!(result.first().unwrap().get("total"), Some(&SqlValue::from("3")));
}

#[test]
fn test_create_database_statement() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());

    assert!(db.create_database("testdb").is_success());
    in_memory_test_driver.assert_last_query(
        "CREATE DATABASE testdb DEFAULT CHARACTER SET utf8",
        &Params::Empty,
    );

    db.create_database_with_charset("shop", "utf8mb4");
    in_memory_test_driver.assert_last_query(
        "CREATE DATABASE shop DEFAULT CHARACTER SET utf8mb4",
        &Params::Empty,
    );
}

#[test]
fn test_drop_database_statement() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());

    db.drop_database("testdb");

    in_memory_test_driver.assert_last_query("DROP DATABASE testdb", &Params::Empty);
}

#[test]
fn test_select_database_uses_current_connection() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());
    in_memory_test_driver.fail_pings(1);

    let result = db.select_database("analytics");

    assert!(result.is_success());
    assert_eq!(result.row_count(), Some(0));
    assert!(result.first().is_none());
    assert!(db.is_connected());
    assert_eq!(in_memory_test_driver.connect_count(), 1);
    let recorded = in_memory_test_driver.last_query().unwrap();
    assert_eq!(recorded.kind, StatementKind::SelectDb);
    assert_eq!(recorded.sql, "analytics");
}

#[test]
fn test_select_database_after_close_fails() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let mut db = connect(&in_memory_test_driver, options());
    db.close().unwrap();

    let result = db.select_database("analytics");

    assert_eq!(result.error(), Some(&DbError::ConnectionClosed));

    db.reconnect().unwrap();
    assert!(db.select_database("analytics").is_success());
}

#[test]
fn test_tuple_rows() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new().with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id", "name"])
                .row(&["1", "Ann"])
                .row(&["2", "Ben"])
                .build(),
        ),
    );
    let mut db = connect(&in_memory_test_driver, options().row_mode(RowMode::Tuple));

    let result = db.execute("SELECT id, name FROM users");

    let last = result.last().unwrap();
    assert!(last.get("name").is_none());
    assert_eq!(last.get_index(1), Some(&SqlValue::from("Ben")));
    assert_eq!(
        serde_json::Value::Object(result.to_map())["result"],
        serde_json::json!([["1", "Ann"], ["2", "Ben"]])
    );
}

#[test]
fn test_debug_traces_probe_and_statement() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_response(InMemoryTestResponseBuilder::new().affected_rows(2).build())
            .with_error(DbError::Query("boom".to_string())),
    );
    let sink = Arc::new(RecordingSink::default());
    let mut db = connect(&in_memory_test_driver, options().debug(true))
        .with_trace_sink(Arc::clone(&sink) as Arc<dyn TraceSink>);

    db.execute("UPDATE t SET x = None");
    db.execute("UPDATE t SET y = 1");

    // The second probe sees the connection closed by the first call.
    assert_eq!(*sink.probes.lock().unwrap(), vec![true, false]);
    assert_eq!(
        *sink.statements.lock().unwrap(),
        vec![
            ("UPDATE t SET x = NULL".to_string(), true, Some(2)),
            ("UPDATE t SET y = 1".to_string(), false, None),
        ]
    );
}

#[test]
fn test_no_traces_without_debug() {
    let in_memory_test_driver = Arc::new(InMemoryTestDriver::new());
    let sink = Arc::new(RecordingSink::default());
    let mut db = connect(&in_memory_test_driver, options())
        .with_trace_sink(Arc::clone(&sink) as Arc<dyn TraceSink>);

    db.execute("SELECT 1");
    db.select_database("test");

    assert!(sink.probes.lock().unwrap().is_empty());
    assert!(sink.statements.lock().unwrap().is_empty());
}
