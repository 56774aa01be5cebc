use thiserror::Error;

/// Error type for basedb operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DbError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for basedb operations
pub type Result<T> = std::result::Result<T, DbError>;
