use chrono::{DateTime, Local};
use tracing::info;

use crate::error::DbError;
use crate::types::ResultSet;

/// Diagnostic event emitted while the client runs in debug mode.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent<'a> {
    /// Liveness probe before a statement.
    Probe { at: DateTime<Local>, ok: bool },
    /// A captured operation has finished.
    Statement {
        statement: &'a str,
        error: Option<&'a DbError>,
        row_count: Option<u64>,
        result: Option<&'a ResultSet>,
    },
}

/// Receiver for debug trace events.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: &TraceEvent<'_>);
}

/// Default sink. Forwards every event to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: &TraceEvent<'_>) {
        match event {
            TraceEvent::Probe { at, ok } => {
                let ping = if *ok { "success" } else { "failure" };
                info!(time = %at.format("%a %b %e %H:%M:%S %Y"), ping, "database probe");
            }
            TraceEvent::Statement {
                statement,
                error,
                row_count,
                result,
            } => {
                info!(
                    statement = %statement,
                    error = ?error.map(|e| e.to_string()),
                    row_count = ?row_count,
                    result = ?result,
                    "database statement"
                );
            }
        }
    }
}
