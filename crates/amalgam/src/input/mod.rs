//! Input parsing and tabular sources.

mod parser;
mod source;
#[cfg(feature = "spreadsheet")]
mod spreadsheet;

pub use parser::{Parser, ParserConfig, build_table, table_name, type_column};
pub use source::{FileSource, LoadFailure, SourceBatch, SourceFormat, SourceMetadata, TabularSource};
