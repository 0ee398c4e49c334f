//! In-memory table model and registry.

mod registry;
mod table;
mod value;

pub use registry::TableRegistry;
pub use table::{Table, TableSummary};
pub use value::{ColumnType, KeyValue, Value};
