//! Amalgam: merge a directory of related tables into one denormalized table.
//!
//! Amalgam loads every delimited or spreadsheet file in a directory, infers
//! primary keys and foreign-key relationships from naming conventions, and
//! joins everything reachable from the best-connected table.
//!
//! # Core Principles
//!
//! - **Convention over configuration**: keys and relationships are guessed
//!   from column names, then corrected by hand where needed
//! - **Non-destructive**: loaded tables are never modified by a merge
//! - **Deterministic**: results depend only on load order and inputs
//!
//! # Example
//!
//! ```no_run
//! use amalgam::Amalgam;
//!
//! let mut amalgam = Amalgam::new();
//! amalgam.load_directory("data/").unwrap();
//! amalgam.detect_primary_keys();
//! amalgam.detect_relationships();
//!
//! let result = amalgam.merge().unwrap();
//! println!("Rows: {}", result.table.row_count());
//! println!("Unmerged: {:?}", result.unmerged);
//! ```

pub mod error;
pub mod inference;
pub mod input;
pub mod merge;
pub mod output;
pub mod table;

mod amalgam;

pub use crate::amalgam::{Amalgam, AmalgamConfig, LoadReport, TableInfo};
pub use error::{AmalgamError, ConfigurationError, PreconditionError, Result};
pub use inference::{KeyReason, PrimaryKey, Relationship, RelationshipOrigin};
pub use input::{FileSource, ParserConfig, SourceMetadata, TabularSource};
pub use merge::{MergeOptions, MergeResult, MergeStatus, RelationshipGraph};
pub use output::{FileSink, OutputFormat, TabularSink};
pub use table::{ColumnType, Table, TableRegistry, TableSummary, Value};
