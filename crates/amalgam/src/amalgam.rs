//! Main Amalgam struct and public API.

use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{AmalgamError, ConfigurationError, Result};
use crate::inference::{
    PrimaryKey, Relationship, RelationshipOrigin, detect_primary_key, detect_relationships,
};
use crate::input::{FileSource, LoadFailure, ParserConfig, SourceBatch, SourceMetadata, TabularSource};
use crate::merge::{MergeOptions, MergeResult, RelationshipGraph, merge};
use crate::table::{Table, TableRegistry, TableSummary};

/// Configuration for loading and merging.
#[derive(Debug, Clone, Default)]
pub struct AmalgamConfig {
    /// Parser configuration for delimited and spreadsheet files.
    pub parser: ParserConfig,
    /// Merge tuning.
    pub merge: MergeOptions,
}

/// Outcome of loading a directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    /// Names of the tables registered, in load order.
    pub loaded: Vec<String>,
    /// Files that could not be read.
    pub failures: Vec<LoadFailure>,
    /// Metadata for every loaded file.
    pub sources: Vec<SourceMetadata>,
}

impl LoadReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Snapshot of loaded tables, keys and relationships.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableInfo {
    pub tables: Vec<TableSummary>,
    /// Table → primary key column.
    pub primary_keys: IndexMap<String, String>,
    pub relationships: Vec<Relationship>,
}

/// The table merging engine.
///
/// Owns the loaded tables, the primary key assignments and the relationship
/// list. The usual flow is load, detect keys, detect relationships, optionally
/// correct them, then merge.
pub struct Amalgam {
    config: AmalgamConfig,
    source: FileSource,
    tables: TableRegistry,
    primary_keys: IndexMap<String, String>,
    relationships: Vec<Relationship>,
}

impl Amalgam {
    /// Create an engine with default configuration.
    pub fn new() -> Self {
        Self::with_config(AmalgamConfig::default())
    }

    /// Create an engine with custom configuration.
    pub fn with_config(config: AmalgamConfig) -> Self {
        let source = FileSource::with_config(config.parser.clone());
        Self {
            config,
            source,
            tables: TableRegistry::new(),
            primary_keys: IndexMap::new(),
            relationships: Vec::new(),
        }
    }

    pub fn config(&self) -> &AmalgamConfig {
        &self.config
    }

    /// Load every recognized file in `dir`.
    ///
    /// Files that fail to parse are skipped and listed in the report.
    pub fn load_directory(&mut self, dir: impl AsRef<Path>) -> Result<LoadReport> {
        let batch = self.source.read_dir(dir.as_ref())?;
        Ok(self.register(batch))
    }

    /// Load tables from any [`TabularSource`].
    pub fn load_from(&mut self, source: &dyn TabularSource, dir: impl AsRef<Path>) -> Result<LoadReport> {
        let batch = source.read_dir(dir.as_ref())?;
        Ok(self.register(batch))
    }

    fn register(&mut self, batch: SourceBatch) -> LoadReport {
        let mut report = LoadReport {
            failures: batch.failures,
            ..LoadReport::default()
        };
        for (table, metadata) in batch.tables {
            report.loaded.push(table.name.clone());
            report.sources.push(metadata);
            self.add_table(table);
        }
        info!(
            tables = report.loaded.len(),
            failures = report.failures.len(),
            "load finished"
        );
        report
    }

    /// Register a table directly. A table with the same name is replaced and
    /// its primary key forgotten.
    pub fn add_table(&mut self, table: Table) {
        if let Some(old) = self.tables.insert(table) {
            self.primary_keys.shift_remove(&old.name);
        }
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }

    /// Detect and record a primary key for every table.
    ///
    /// Tables without a detectable key keep any earlier assignment.
    pub fn detect_primary_keys(&mut self) -> IndexMap<String, PrimaryKey> {
        let mut detected = IndexMap::new();
        for table in self.tables.iter() {
            match detect_primary_key(table) {
                Some(key) => {
                    info!(
                        table = %table.name,
                        column = %key.column,
                        reason = %key.reason,
                        "detected primary key"
                    );
                    self.primary_keys
                        .insert(table.name.clone(), key.column.clone());
                    detected.insert(table.name.clone(), key);
                }
                None => info!(table = %table.name, "no primary key detected"),
            }
        }
        detected
    }

    /// Detect and record the primary key of one table.
    pub fn detect_primary_key(&mut self, table: &str) -> Result<Option<PrimaryKey>> {
        let table = self.require_table(table)?;
        let key = detect_primary_key(table);
        if let Some(ref key) = key {
            info!(table = %table.name, column = %key.column, reason = %key.reason, "detected primary key");
            let name = table.name.clone();
            self.primary_keys.insert(name, key.column.clone());
        }
        Ok(key)
    }

    /// Detect relationships between every pair of tables.
    ///
    /// Replaces earlier detected relationships. Manual relationships are kept
    /// after the detected ones. Keys promoted during detection are recorded.
    pub fn detect_relationships(&mut self) -> &[Relationship] {
        let detection = detect_relationships(&self.tables, &self.primary_keys);

        for promotion in detection.promoted_keys {
            info!(
                table = %promotion.table,
                column = %promotion.column,
                "assigned primary key from relationship detection"
            );
            self.primary_keys.insert(promotion.table, promotion.column);
        }
        for rel in &detection.relationships {
            info!(relationship = %rel, "found relationship");
        }

        let manual = std::mem::take(&mut self.relationships)
            .into_iter()
            .filter(|r| r.origin == RelationshipOrigin::Manual);
        self.relationships = detection.relationships;
        self.relationships.extend(manual);

        &self.relationships
    }

    /// Assign a primary key, replacing any earlier one.
    pub fn set_primary_key(&mut self, table: &str, column: &str) -> Result<()> {
        let table = self.require_column(table, column)?;
        info!(table = %table, column, "primary key set manually");
        self.primary_keys.insert(table, column.to_string());
        Ok(())
    }

    /// Append a manual relationship from `source_table.source_column` to
    /// `target_table.target_column`.
    pub fn add_relationship(
        &mut self,
        source_table: &str,
        target_table: &str,
        source_column: &str,
        target_column: &str,
    ) -> Result<()> {
        let source = self.require_column(source_table, source_column)?;
        let target = self.require_column(target_table, target_column)?;
        let rel = Relationship::manual(source, target, source_column, target_column);
        info!(relationship = %rel, "relationship added manually");
        self.relationships.push(rel);
        Ok(())
    }

    /// Remove the relationship at `index`, returning it.
    pub fn remove_relationship(&mut self, index: usize) -> Result<Relationship> {
        if index >= self.relationships.len() {
            return Err(ConfigurationError::RelationshipIndexOutOfRange {
                index,
                len: self.relationships.len(),
            }
            .into());
        }
        let rel = self.relationships.remove(index);
        info!(relationship = %rel, index, "relationship removed");
        Ok(rel)
    }

    pub fn primary_key(&self, table: &str) -> Option<&str> {
        self.primary_keys
            .get(&table.to_lowercase())
            .map(String::as_str)
    }

    pub fn primary_keys(&self) -> &IndexMap<String, String> {
        &self.primary_keys
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    /// Adjacency over the current tables and relationships.
    pub fn relationship_graph(&self) -> RelationshipGraph {
        RelationshipGraph::build(self.tables.names(), &self.relationships)
    }

    /// Merge all reachable tables into one.
    ///
    /// Inputs are not modified; each call produces a fresh result.
    pub fn merge(&self) -> Result<MergeResult> {
        debug!(
            tables = self.tables.len(),
            relationships = self.relationships.len(),
            "starting merge"
        );
        merge(&self.tables, &self.relationships, &self.config.merge)
    }

    /// Tables, keys and relationships as one serializable value.
    pub fn table_info(&self) -> TableInfo {
        TableInfo {
            tables: self.table_summaries(),
            primary_keys: self.primary_keys.clone(),
            relationships: self.relationships.clone(),
        }
    }

    /// First `rows` rows of a table.
    pub fn preview(&self, table: &str, rows: usize) -> Result<Table> {
        Ok(self.require_table(table)?.head(rows))
    }

    pub fn table_summaries(&self) -> Vec<TableSummary> {
        self.tables.iter().map(Table::summary).collect()
    }

    fn require_table(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownTable(name.to_string()).into())
    }

    /// Validate a table/column pair, returning the case-folded table name.
    fn require_column(&self, table: &str, column: &str) -> Result<String> {
        let found = self.require_table(table)?;
        if !found.has_column(column) {
            return Err(AmalgamError::Configuration(ConfigurationError::UnknownColumn {
                table: found.name.clone(),
                column: column.to_string(),
            }));
        }
        Ok(found.name.clone())
    }
}

impl Default for Amalgam {
    fn default() -> Self {
        Self::new()
    }
}
