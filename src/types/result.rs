use serde_json::{Map, Value};

use crate::error::{DbError, Result};
use crate::types::Row;

/// Payload of a successful operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultSet {
    /// Rows fetched by a statement or procedure call.
    Rows(Vec<Row>),
    /// Auto-generated id of the last inserted row.
    InsertId(u64),
}

impl ResultSet {
    fn to_json(&self) -> Value {
        match self {
            ResultSet::Rows(rows) => Value::Array(rows.iter().map(Row::to_json).collect()),
            ResultSet::InsertId(id) => Value::from(*id),
        }
    }
}

/// Outcome of one database operation.
///
/// Holds either a row count with its result set, or the error that
/// stopped the operation. Never both.
#[derive(Debug, Clone, PartialEq)]
pub struct DbResult {
    outcome: Result<(u64, ResultSet)>,
}

impl DbResult {
    pub fn success(row_count: u64, result: ResultSet) -> Self {
        Self {
            outcome: Ok((row_count, result)),
        }
    }

    pub fn failure(error: DbError) -> Self {
        Self {
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Rows affected or returned. `None` on failure.
    pub fn row_count(&self) -> Option<u64> {
        self.outcome.as_ref().ok().map(|(count, _)| *count)
    }

    pub fn result(&self) -> Option<&ResultSet> {
        self.outcome.as_ref().ok().map(|(_, result)| result)
    }

    /// Fetched rows, if this is a successful row-returning result.
    pub fn rows(&self) -> Option<&[Row]> {
        match self.result()? {
            ResultSet::Rows(rows) => Some(rows),
            ResultSet::InsertId(_) => None,
        }
    }

    /// Last inserted id, if this result came from `insert`.
    pub fn insert_id(&self) -> Option<u64> {
        match self.result()? {
            ResultSet::InsertId(id) => Some(*id),
            ResultSet::Rows(_) => None,
        }
    }

    pub fn error(&self) -> Option<&DbError> {
        self.outcome.as_ref().err()
    }

    /// Returns the row at `index`, counting from the end for negative values.
    ///
    /// `None` when the operation failed, when the result holds no rows, or when
    /// `index` falls outside `-row_count..row_count`.
    pub fn index_of(&self, index: isize) -> Option<&Row> {
        let (count, result) = self.outcome.as_ref().ok()?;
        let rows = match result {
            ResultSet::Rows(rows) => rows,
            ResultSet::InsertId(_) => return None,
        };
        let count = isize::try_from(*count).ok()?;
        if index >= count || index < -count {
            return None;
        }
        let position = if index < 0 { count + index } else { index };
        rows.get(usize::try_from(position).ok()?)
    }

    pub fn first(&self) -> Option<&Row> {
        self.index_of(0)
    }

    pub fn last(&self) -> Option<&Row> {
        self.index_of(-1)
    }

    /// Plain key-value form for transport or logging.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("success".to_string(), Value::Bool(self.is_success()));
        map.insert(
            "row_count".to_string(),
            self.row_count().map(Value::from).unwrap_or(Value::Null),
        );
        map.insert(
            "result".to_string(),
            self.result().map(ResultSet::to_json).unwrap_or(Value::Null),
        );
        map.insert(
            "error".to_string(),
            self.error()
                .map(|e| Value::String(e.to_string()))
                .unwrap_or(Value::Null),
        );
        map
    }

    /// Converts into a standard `Result` for use with `?`.
    pub fn into_result(self) -> Result<(u64, ResultSet)> {
        self.outcome
    }
}
