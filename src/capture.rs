use tracing::warn;

use crate::error::Result;
use crate::traits::{TraceEvent, TraceSink};
use crate::types::{DbResult, ResultSet};

/// Runs `op` and folds its outcome into a `DbResult`.
///
/// This is where every failure of the execution layer becomes a value:
/// an `Err` from `op` lands in `DbResult::error` instead of propagating.
/// When `trace` is set the finished operation is reported to it, labelled
/// with `statement`.
pub fn run_captured<F>(trace: Option<&dyn TraceSink>, statement: &str, op: F) -> DbResult
where
    F: FnOnce() -> Result<(u64, ResultSet)>,
{
    let result = match op() {
        Ok((row_count, result)) => DbResult::success(row_count, result),
        Err(e) => {
            warn!(statement, error = %e, "database operation failed");
            DbResult::failure(e)
        }
    };

    if let Some(sink) = trace {
        sink.record(&TraceEvent::Statement {
            statement,
            error: result.error(),
            row_count: result.row_count(),
            result: result.result(),
        });
    }

    result
}
