//! Tabular sources: where loaded tables come from.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use super::parser::{Parser, ParserConfig};
use crate::error::{AmalgamError, Result};
use crate::table::Table;

/// Metadata about a loaded source file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, xlsx, ...).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been loaded.
    pub fn new(path: PathBuf, contents: &[u8], format: String, table: &Table) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut hasher = Sha256::new();
        hasher.update(contents);
        let hash = format!("sha256:{:x}", hasher.finalize());

        Self {
            file,
            path,
            hash,
            size_bytes: contents.len() as u64,
            format,
            row_count: table.row_count(),
            column_count: table.column_count(),
            loaded_at: Utc::now(),
        }
    }
}

/// A file that could not be loaded. The rest of the batch still loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Everything a source produced for one directory.
#[derive(Debug, Default)]
pub struct SourceBatch {
    pub tables: Vec<(Table, SourceMetadata)>,
    pub failures: Vec<LoadFailure>,
}

/// Supplies parsed tables from a directory.
pub trait TabularSource {
    /// Read every recognized tabular file in `dir`.
    ///
    /// Only a failure to list the directory is an error; per-file failures are
    /// reported in [`SourceBatch::failures`].
    fn read_dir(&self, dir: &Path) -> Result<SourceBatch>;
}

/// Recognized file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text (csv, tsv, txt).
    Delimited,
    /// Spreadsheet workbook (xlsx, xlsm, xls, ods).
    Spreadsheet,
}

impl SourceFormat {
    /// Classify a path by extension; `None` for files to skip.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "csv" | "tsv" | "txt" => Some(SourceFormat::Delimited),
            "xlsx" | "xlsm" | "xls" | "ods" => Some(SourceFormat::Spreadsheet),
            _ => None,
        }
    }
}

/// Reads delimited text and spreadsheet files from the filesystem.
pub struct FileSource {
    parser: Parser,
}

impl FileSource {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            parser: Parser::with_config(config),
        }
    }

    /// Load a single file.
    pub fn read_file(&self, path: &Path) -> Result<(Table, SourceMetadata)> {
        let format = SourceFormat::from_path(path).ok_or_else(|| {
            AmalgamError::UnsupportedFormat(path.display().to_string())
        })?;

        let contents = fs::read(path).map_err(|e| AmalgamError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let (table, format_name) = match format {
            SourceFormat::Delimited => self.parser.parse_file_bytes(path, &contents)?,
            SourceFormat::Spreadsheet => (self.read_spreadsheet(path)?, spreadsheet_format(path)),
        };

        let metadata = SourceMetadata::new(path.to_path_buf(), &contents, format_name, &table);
        Ok((table, metadata))
    }

    #[cfg(feature = "spreadsheet")]
    fn read_spreadsheet(&self, path: &Path) -> Result<Table> {
        super::spreadsheet::read_workbook(path, self.parser.config())
    }

    #[cfg(not(feature = "spreadsheet"))]
    fn read_spreadsheet(&self, path: &Path) -> Result<Table> {
        Err(AmalgamError::UnsupportedFormat(format!(
            "{}: spreadsheet support not enabled. Rebuild with --features spreadsheet",
            path.display()
        )))
    }
}

impl Default for FileSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TabularSource for FileSource {
    fn read_dir(&self, dir: &Path) -> Result<SourceBatch> {
        let entries = fs::read_dir(dir).map_err(|e| AmalgamError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();

        let mut batch = SourceBatch::default();
        for path in paths {
            if SourceFormat::from_path(&path).is_none() {
                debug!(path = %path.display(), "skipping unrecognized file");
                continue;
            }

            match self.read_file(&path) {
                Ok((table, metadata)) => {
                    info!(
                        table = %table.name,
                        rows = table.row_count(),
                        columns = table.column_count(),
                        format = %metadata.format,
                        "discovered table"
                    );
                    batch.tables.push((table, metadata));
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load file, skipping");
                    batch.failures.push(LoadFailure {
                        path,
                        message: e.to_string(),
                    });
                }
            }
        }

        Ok(batch)
    }
}

fn spreadsheet_format(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "spreadsheet".to_string())
}
