use std::time::Duration;

use serde::Deserialize;

use crate::error::{DbError, Result};
use crate::types::RowMode;

/// Timeout applied when opening a connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for a `BaseDb`.
///
/// Fixed for the lifetime of the client; every reconnect reuses them.
///
/// # Example
/// ```
/// use basedb::{ConnectOptions, RowMode};
///
/// let options = ConnectOptions::new("root", "secret")
///     .database("shop")
///     .port(3307)
///     .row_mode(RowMode::Tuple);
/// assert_eq!(options.host, "127.0.0.1");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectOptions {
    pub user: String,
    pub password: String,
    #[serde(default)]
    pub database: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_charset")]
    pub charset: String,
    #[serde(default)]
    pub row_mode: RowMode,
    #[serde(default)]
    pub debug: bool,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_charset() -> String {
    "utf8".to_string()
}

impl ConnectOptions {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            database: String::new(),
            host: default_host(),
            port: default_port(),
            charset: default_charset(),
            row_mode: RowMode::default(),
            debug: false,
        }
    }

    /// Parses options from a JSON document. Missing optional fields take
    /// their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| DbError::Config(e.to_string()))
    }

    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    pub fn row_mode(mut self, row_mode: RowMode) -> Self {
        self.row_mode = row_mode;
        self
    }

    /// Enables statement and probe tracing.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
