use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Value};
use tracing::debug;

use crate::config::{ConnectOptions, CONNECT_TIMEOUT};
use crate::error::{DbError, Result};
use crate::traits::{Connection, Connector};
use crate::types::{Params, RawQueryResult, SqlValue};

/// MySQL driver implementation using the blocking `mysql` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDriver;

impl MysqlDriver {
    pub fn new() -> Self {
        Self
    }
}

impl Connector for MysqlDriver {
    fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>> {
        let database = (!options.database.is_empty()).then(|| options.database.clone());
        let builder = OptsBuilder::new()
            .ip_or_hostname(Some(options.host.clone()))
            .tcp_port(options.port)
            .user(Some(options.user.clone()))
            .pass(Some(options.password.clone()))
            .db_name(database)
            .tcp_connect_timeout(Some(CONNECT_TIMEOUT))
            .init(vec![format!("SET NAMES {}", options.charset)]);

        debug!(host = %options.host, port = options.port, "opening mysql connection");
        let conn = Conn::new(builder).map_err(|e| DbError::Connection(e.to_string()))?;

        Ok(Box::new(MysqlConnection { conn }))
    }
}

/// One open MySQL session.
pub struct MysqlConnection {
    conn: Conn,
}

impl MysqlConnection {
    /// Run a statement and collect the rows of its first result set.
    fn fetch(&mut self, sql: &str, params: &Params) -> Result<RawQueryResult> {
        // Unread result sets are drained when `result` drops.
        let rows = if params.is_empty() {
            let mut result = self.conn.query_iter(sql).map_err(query_error)?;
            let rows = collect_set(result.iter())?;
            rows
        } else {
            let mut result = self
                .conn
                .exec_iter(sql, to_mysql_params(params))
                .map_err(query_error)?;
            let rows = collect_set(result.iter())?;
            rows
        };

        let columns = rows
            .first()
            .map(|row| {
                row.columns_ref()
                    .iter()
                    .map(|c| c.name_str().into_owned())
                    .collect()
            })
            .unwrap_or_default();

        let values = rows
            .iter()
            .map(|row| {
                (0..row.len())
                    .map(|i| row.as_ref(i).map(from_mysql_value).unwrap_or(SqlValue::Null))
                    .collect()
            })
            .collect();

        Ok(RawQueryResult {
            columns,
            rows: values,
            affected_rows: self.conn.affected_rows(),
        })
    }
}

impl Connection for MysqlConnection {
    fn ping(&mut self) -> Result<()> {
        self.conn
            .query_drop("SELECT 1")
            .map_err(|e| DbError::Connection(e.to_string()))
    }

    fn execute(&mut self, sql: &str, params: &Params) -> Result<RawQueryResult> {
        self.fetch(sql, params)
    }

    fn call_procedure(&mut self, name: &str, params: &Params) -> Result<RawQueryResult> {
        let sql = format!("CALL {}({})", name, params.placeholders());
        self.fetch(&sql, params)
    }

    fn select_db(&mut self, name: &str) -> Result<()> {
        self.conn
            .query_drop(format!("USE {}", name))
            .map_err(query_error)
    }

    fn last_insert_id(&self) -> u64 {
        self.conn.last_insert_id()
    }

    fn close(self: Box<Self>) -> Result<()> {
        // Dropping the session sends COM_QUIT.
        drop(self.conn);
        Ok(())
    }
}

fn query_error(e: mysql::Error) -> DbError {
    DbError::Query(e.to_string())
}

fn collect_set<I>(set: Option<I>) -> Result<Vec<mysql::Row>>
where
    I: Iterator<Item = mysql::Result<mysql::Row>>,
{
    match set {
        Some(rows) => rows.collect::<mysql::Result<Vec<_>>>().map_err(query_error),
        None => Ok(Vec::new()),
    }
}

fn to_mysql_params(params: &Params) -> mysql::Params {
    match params {
        Params::Empty => mysql::Params::Empty,
        Params::Positional(values) => {
            mysql::Params::Positional(values.iter().map(to_mysql_value).collect())
        }
        Params::Named(pairs) => mysql::Params::Named(
            pairs
                .iter()
                .map(|(name, value)| (name.clone().into(), to_mysql_value(value)))
                .collect(),
        ),
    }
}

fn to_mysql_value(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::NULL,
        SqlValue::Text(s) => Value::Bytes(s.as_bytes().to_vec()),
        SqlValue::Int32(i) => Value::Int(i64::from(*i)),
        SqlValue::Int64(i) => Value::Int(*i),
        SqlValue::UInt64(u) => Value::UInt(*u),
        SqlValue::Double(f) => Value::Double(*f),
        SqlValue::Bool(b) => Value::Int(i64::from(*b)),
        SqlValue::Bytes(b) => Value::Bytes(b.clone()),
    }
}

/// Convert a server value to a SqlValue.
/// Text-protocol results arrive as bytes; valid UTF-8 becomes text.
fn from_mysql_value(value: &Value) -> SqlValue {
    match value {
        Value::NULL => SqlValue::Null,
        Value::Bytes(bytes) => match String::from_utf8(bytes.clone()) {
            Ok(s) => SqlValue::Text(s),
            Err(e) => SqlValue::Bytes(e.into_bytes()),
        },
        Value::Int(i) => SqlValue::Int64(*i),
        Value::UInt(u) => SqlValue::UInt64(*u),
        Value::Float(f) => SqlValue::Double(f64::from(*f)),
        Value::Double(f) => SqlValue::Double(*f),
        Value::Date(year, month, day, hour, minute, second, micros) => {
            let mut text = format!(
                "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                year, month, day, hour, minute, second
            );
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            SqlValue::Text(text)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let hours = u32::from(*hours) + days * 24;
            let mut text = format!("{}{:02}:{:02}:{:02}", sign, hours, minutes, seconds);
            if *micros > 0 {
                text.push_str(&format!(".{:06}", micros));
            }
            SqlValue::Text(text)
        }
    }
}
