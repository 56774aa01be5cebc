use std::sync::Arc;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::types::SqlValue;

/// How result rows are represented to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowMode {
    /// Each row maps column names to values.
    #[default]
    Map,
    /// Each row is a positional list of values.
    Tuple,
}

/// Driver-agnostic raw result from a statement or procedure call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawQueryResult {
    /// Column names in order. Empty for statements that return no result set.
    pub columns: Vec<String>,
    /// Rows, where each row is a vector of values in column order
    pub rows: Vec<Vec<SqlValue>>,
    /// Rows changed by the statement, as reported by the server
    pub affected_rows: u64,
}

impl RawQueryResult {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<SqlValue>>) -> Self {
        Self {
            columns,
            rows,
            affected_rows: 0,
        }
    }

    /// A result with no result set, only an affected row count.
    pub fn affected(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Rows returned for result-set statements, affected rows otherwise.
    pub fn row_count(&self) -> u64 {
        if self.columns.is_empty() {
            self.affected_rows
        } else {
            self.rows.len() as u64
        }
    }

    /// Converts the raw rows into `Row`s using the given representation.
    pub fn into_rows(self, mode: RowMode) -> Vec<Row> {
        let columns: Option<Arc<[String]>> = match mode {
            RowMode::Map => Some(self.columns.into()),
            RowMode::Tuple => None,
        };
        self.rows
            .into_iter()
            .map(|values| Row::new(columns.clone(), values))
            .collect()
    }
}

/// A single result row.
/// Values keep column order; names are only available in `RowMode::Map`.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Option<Arc<[String]>>,
    values: Vec<SqlValue>,
}

impl Row {
    pub(crate) fn new(columns: Option<Arc<[String]>>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    /// Gets a value by column name. Always `None` for tuple rows.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        let columns = self.columns.as_ref()?;
        let index = columns.iter().position(|c| c == column)?;
        self.values.get(index)
    }

    /// Gets a value by position.
    pub fn get_index(&self, index: usize) -> Option<&SqlValue> {
        self.values.get(index)
    }

    /// Returns all column names in this row, in order.
    pub fn columns(&self) -> Vec<&str> {
        self.columns
            .as_ref()
            .map(|c| c.iter().map(|s| s.as_str()).collect())
            .unwrap_or_default()
    }

    /// Returns the values of this row in column order.
    pub fn values(&self) -> &[SqlValue] {
        &self.values
    }

    /// Returns the number of values in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// JSON object for map rows, JSON array for tuple rows.
    pub fn to_json(&self) -> Value {
        match &self.columns {
            Some(columns) => {
                let object: Map<String, Value> = columns
                    .iter()
                    .zip(self.values.iter())
                    .map(|(col, val)| (col.clone(), value_to_json(val)))
                    .collect();
                Value::Object(object)
            }
            None => Value::Array(self.values.iter().map(value_to_json).collect()),
        }
    }
}

fn value_to_json(value: &SqlValue) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
