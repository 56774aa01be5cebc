mod driver;
mod trace;

pub use driver::{Connection, Connector};
pub use trace::{TraceEvent, TraceSink, TracingSink};
