mod params;
mod result;
mod row;
mod sql_value;

pub use params::Params;
pub use result::{DbResult, ResultSet};
pub use row::{RawQueryResult, Row, RowMode};
pub use sql_value::SqlValue;
