use std::sync::Arc;

use chrono::Local;
use tracing::debug;

use crate::capture::run_captured;
use crate::config::ConnectOptions;
use crate::drivers::MysqlDriver;
use crate::error::{DbError, Result};
use crate::traits::{Connection, Connector, TraceEvent, TraceSink, TracingSink};
use crate::types::{DbResult, Params, ResultSet};

/// Token rewritten to `NULL` in every statement passed to `execute`/`insert`.
pub const NULL_MARKER: &str = "None";

/// Main entry point for basedb.
///
/// Owns at most one connection. Every statement-running call probes the
/// connection first, reopens it if the probe fails, and closes it again once
/// the rows have been fetched, so no call inherits half-read state from the
/// previous one. Operations take `&mut self`; use one client per thread.
pub struct BaseDb {
    options: ConnectOptions,
    connector: Arc<dyn Connector>,
    connection: Option<Box<dyn Connection>>,
    trace: Arc<dyn TraceSink>,
}

impl BaseDb {
    /// Connect to a MySQL server.
    ///
    /// # Example
    /// ```ignore
    /// let mut db = BaseDb::connect(ConnectOptions::new("root", "secret").database("shop"))?;
    /// let users = db.execute("SELECT * FROM users");
    /// ```
    pub fn connect(options: ConnectOptions) -> Result<Self> {
        Self::with_connector(options, Arc::new(MysqlDriver::new()))
    }

    /// Create a new client with a custom driver.
    /// Useful for testing or using alternative database drivers.
    pub fn with_connector(options: ConnectOptions, connector: Arc<dyn Connector>) -> Result<Self> {
        let connection = connector.connect(&options)?;
        debug!(host = %options.host, port = options.port, user = %options.user, "connected");
        Ok(Self {
            options,
            connector,
            connection: Some(connection),
            trace: Arc::new(TracingSink),
        })
    }

    /// Replace the sink that receives debug traces.
    /// Traces are only produced when `ConnectOptions::debug` is set.
    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace = sink;
        self
    }

    pub fn options(&self) -> &ConnectOptions {
        &self.options
    }

    /// Returns true while a connection handle is held.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Discard the current connection, if any, and open a fresh one.
    pub fn reconnect(&mut self) -> Result<()> {
        if let Some(old) = self.connection.take() {
            if let Err(e) = old.close() {
                debug!(error = %e, "discarding connection failed");
            }
        }
        self.connection = Some(self.connector.connect(&self.options)?);
        Ok(())
    }

    /// Release the current connection.
    /// Fails with `DbError::ConnectionClosed` when none is open.
    pub fn close(&mut self) -> Result<()> {
        match self.connection.take() {
            Some(connection) => connection.close(),
            None => Err(DbError::ConnectionClosed),
        }
    }

    /// Run a statement without parameters. See [`BaseDb::execute_with`].
    pub fn execute(&mut self, statement: &str) -> DbResult {
        self.execute_with(statement, Params::Empty)
    }

    /// Run a statement and fetch all of its rows.
    ///
    /// Every occurrence of [`NULL_MARKER`] in `statement` is replaced by `NULL`
    /// first, including occurrences inside string literals.
    pub fn execute_with(&mut self, statement: &str, params: Params) -> DbResult {
        let sql = statement.replace(NULL_MARKER, "NULL");
        let sink = self.trace_sink();
        let mode = self.options.row_mode;

        run_captured(sink.as_deref(), &sql, || {
            let raw = self.run(|conn| conn.execute(&sql, &params))?;
            Ok((raw.row_count(), ResultSet::Rows(raw.into_rows(mode))))
        })
    }

    /// Run an insert without parameters. See [`BaseDb::insert_with`].
    pub fn insert(&mut self, statement: &str) -> DbResult {
        self.insert_with(statement, Params::Empty)
    }

    /// Run an insert and report the auto-generated id of the new row.
    ///
    /// The id is read before the connection is released.
    pub fn insert_with(&mut self, statement: &str, params: Params) -> DbResult {
        let sql = statement.replace(NULL_MARKER, "NULL");
        let sink = self.trace_sink();

        run_captured(sink.as_deref(), &sql, || {
            let (raw, id) = self.run(|conn| {
                let raw = conn.execute(&sql, &params)?;
                Ok((raw, conn.last_insert_id()))
            })?;
            Ok((raw.row_count(), ResultSet::InsertId(id)))
        })
    }

    /// Call a stored procedure without parameters.
    pub fn call(&mut self, procedure: &str) -> DbResult {
        self.call_with(procedure, Params::Empty)
    }

    /// Call a stored procedure and fetch the rows of its first result set.
    pub fn call_with(&mut self, procedure: &str, params: Params) -> DbResult {
        let sink = self.trace_sink();
        let mode = self.options.row_mode;

        run_captured(sink.as_deref(), procedure, || {
            let raw = self.run(|conn| conn.call_procedure(procedure, &params))?;
            Ok((raw.row_count(), ResultSet::Rows(raw.into_rows(mode))))
        })
    }

    /// `CREATE DATABASE name DEFAULT CHARACTER SET utf8`.
    ///
    /// `name` is not escaped.
    pub fn create_database(&mut self, name: &str) -> DbResult {
        self.create_database_with_charset(name, "utf8")
    }

    /// `CREATE DATABASE name DEFAULT CHARACTER SET charset`.
    ///
    /// Neither argument is escaped.
    pub fn create_database_with_charset(&mut self, name: &str, charset: &str) -> DbResult {
        self.execute(&format!(
            "CREATE DATABASE {} DEFAULT CHARACTER SET {}",
            name, charset
        ))
    }

    /// `DROP DATABASE name`. `name` is not escaped.
    pub fn drop_database(&mut self, name: &str) -> DbResult {
        self.execute(&format!("DROP DATABASE {}", name))
    }

    /// Switch the active database on the current connection.
    ///
    /// The connection is not probed or reopened. Since statement calls close
    /// the connection when they finish, this only succeeds on a connection
    /// opened by construction or [`BaseDb::reconnect`].
    pub fn select_database(&mut self, name: &str) -> DbResult {
        let sink = self.trace_sink();

        run_captured(sink.as_deref(), name, || {
            let connection = self
                .connection
                .as_mut()
                .ok_or(DbError::ConnectionClosed)?;
            connection.select_db(name)?;
            Ok((0, ResultSet::Rows(Vec::new())))
        })
    }

    fn trace_sink(&self) -> Option<Arc<dyn TraceSink>> {
        self.options.debug.then(|| Arc::clone(&self.trace))
    }

    /// Probe the connection and reopen it when the probe fails.
    fn ensure_connected(&mut self) -> Result<()> {
        let probe = match self.connection.as_mut() {
            Some(connection) => connection.ping(),
            None => Err(DbError::ConnectionClosed),
        };

        if let Some(sink) = self.trace_sink() {
            sink.record(&TraceEvent::Probe {
                at: Local::now(),
                ok: probe.is_ok(),
            });
        }

        if let Err(e) = probe {
            debug!(error = %e, "connection probe failed, reconnecting");
            self.reconnect()?;
        }
        Ok(())
    }

    /// One open-run-close cycle: probe, run `f`, then release the connection.
    fn run<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut dyn Connection) -> Result<T>,
    {
        self.ensure_connected()?;
        let connection = self
            .connection
            .as_mut()
            .ok_or(DbError::ConnectionClosed)?;
        let outcome = f(connection.as_mut());
        let closed = self.close();
        let value = outcome?;
        closed?;
        Ok(value)
    }
}
