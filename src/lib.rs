//! basedb - A thin blocking MySQL client that turns every outcome into a value
//!
//! # Example
//! ```ignore
//! use basedb::{BaseDb, ConnectOptions, Params};
//!
//! // Connect to database
//! let mut db = BaseDb::connect(ConnectOptions::new("root", "secret").database("shop"))?;
//!
//! // Statements never panic or return Err; failures land in the result
//! let users = db.execute_with(
//!     "SELECT id, name FROM users WHERE name = :name",
//!     Params::named([("name", "John")]),
//! );
//! if let Some(row) = users.first() {
//!     println!("{:?}", row.get("id"));
//! }
//!
//! let created = db.insert("INSERT INTO users(name) VALUES ('Jane')");
//! println!("new id: {:?}", created.insert_id());
//! ```

pub mod capture;
pub mod config;
pub mod drivers;
pub mod error;
pub mod traits;
pub mod types;

mod client;

// Re-export main types for convenient access
pub use capture::run_captured;
pub use client::{BaseDb, NULL_MARKER};
pub use config::{ConnectOptions, CONNECT_TIMEOUT};
pub use error::{DbError, Result};
pub use traits::{Connection, Connector, TraceEvent, TraceSink, TracingSink};
pub use types::{DbResult, Params, RawQueryResult, ResultSet, Row, RowMode, SqlValue};
