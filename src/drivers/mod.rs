mod mysql;

pub use self::in_memory_test::{
    InMemoryTestDriver, InMemoryTestResponseBuilder, RecordedQuery, StatementKind,
};
pub use self::mysql::{MysqlConnection, MysqlDriver};
