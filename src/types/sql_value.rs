use serde::Serialize;

/// Represents a SQL value in a driver-agnostic way.
/// Used both for bound parameters and for values read back from rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Text(String),
    Int32(i32),
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl SqlValue {
    /// Returns true if this value is SQL NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Returns the text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as a signed integer when it is representable as one.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Int32(i) => Some(i64::from(*i)),
            SqlValue::Int64(i) => Some(*i),
            SqlValue::UInt64(u) => i64::try_from(*u).ok(),
            SqlValue::Bool(b) => Some(i64::from(*b)),
            SqlValue::Text(s) => s.parse().ok(),
            _ => None,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int32(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Int64(value)
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::UInt64(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Double(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}
