//! Output sinks for merged and loaded tables.

mod sink;

pub use sink::{FileSink, OutputFormat, TabularSink};
