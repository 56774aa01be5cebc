use crate::config::ConnectOptions;
use crate::error::Result;
use crate::types::{Params, RawQueryResult};

/// Trait for database driver implementations.
/// A connector opens connections; it holds no connection state itself.
pub trait Connector: Send + Sync {
    /// Open a new connection using the given options.
    fn connect(&self, options: &ConnectOptions) -> Result<Box<dyn Connection>>;
}

/// A single open connection to the database server.
/// Drivers are responsible for:
/// - Probing liveness
/// - Converting SqlValue parameters to native types
/// - Executing statements and converting results to RawQueryResult
pub trait Connection: Send {
    /// Check that the server is still reachable. Fails if it is not.
    fn ping(&mut self) -> Result<()>;

    /// Execute a statement and fetch every row it returns.
    /// Empty params send the statement as raw text.
    fn execute(&mut self, sql: &str, params: &Params) -> Result<RawQueryResult>;

    /// Invoke a stored procedure and fetch the rows of its first result set.
    fn call_procedure(&mut self, name: &str, params: &Params) -> Result<RawQueryResult>;

    /// Switch the active database.
    fn select_db(&mut self, name: &str) -> Result<()>;

    /// Auto-generated id of the last inserted row on this connection.
    fn last_insert_id(&self) -> u64;

    /// Release the connection.
    fn close(self: Box<Self>) -> Result<()>;
}
