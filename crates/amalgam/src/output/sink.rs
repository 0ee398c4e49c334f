//! Tabular sinks: persist a table as delimited text or a workbook.

use std::path::Path;

use tracing::info;

use crate::error::{AmalgamError, Result};
use crate::table::Table;

/// Accepts a table and writes it somewhere.
pub trait TabularSink {
    fn write(&self, table: &Table, path: &Path) -> Result<()>;
}

/// Output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Tsv,
    Xlsx,
}

impl OutputFormat {
    /// Pick the encoding from a path's extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "tsv" => Ok(OutputFormat::Tsv),
            "xlsx" => Ok(OutputFormat::Xlsx),
            _ => Err(AmalgamError::UnsupportedFormat(format!(
                "cannot write '{}'. Use a .csv, .tsv or .xlsx file name",
                path.display()
            ))),
        }
    }
}

/// Writes to the filesystem, choosing the encoding by extension.
#[derive(Debug, Clone, Default)]
pub struct FileSink;

impl FileSink {
    pub fn new() -> Self {
        Self
    }

    fn write_delimited(&self, table: &Table, path: &Path, delimiter: u8) -> Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(delimiter)
            .from_path(path)?;

        writer.write_record(&table.columns)?;
        for row in &table.rows {
            writer.write_record(row.iter().map(|v| v.to_string()))?;
        }
        writer.flush().map_err(|e| AmalgamError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    #[cfg(feature = "spreadsheet")]
    fn write_workbook(&self, table: &Table, path: &Path) -> Result<()> {
        use crate::table::Value;
        use rust_xlsxwriter::Workbook;

        let width = u16::try_from(table.column_count()).map_err(|_| {
            AmalgamError::UnsupportedFormat(format!("{} columns exceed the workbook limit", table.column_count()))
        })?;

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();

        for (col, name) in (0..width).zip(&table.columns) {
            worksheet.write_string(0, col, name.as_str())?;
        }

        for (r, row) in table.rows.iter().enumerate() {
            let row_num = u32::try_from(r + 1).map_err(|_| {
                AmalgamError::UnsupportedFormat(format!("{} rows exceed the workbook limit", table.row_count()))
            })?;
            for (col, value) in (0..width).zip(row) {
                match value {
                    Value::Null => {}
                    Value::Integer(i) => {
                        worksheet.write_number(row_num, col, *i as f64)?;
                    }
                    Value::Float(f) => {
                        worksheet.write_number(row_num, col, *f)?;
                    }
                    Value::Boolean(b) => {
                        worksheet.write_boolean(row_num, col, *b)?;
                    }
                    Value::Text(s) => {
                        worksheet.write_string(row_num, col, s.as_str())?;
                    }
                }
            }
        }

        workbook.save(path)?;
        Ok(())
    }

    #[cfg(not(feature = "spreadsheet"))]
    fn write_workbook(&self, _table: &Table, path: &Path) -> Result<()> {
        Err(AmalgamError::UnsupportedFormat(format!(
            "{}: spreadsheet support not enabled. Rebuild with --features spreadsheet",
            path.display()
        )))
    }
}

impl TabularSink for FileSink {
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        let format = OutputFormat::from_path(path)?;
        match format {
            OutputFormat::Csv => self.write_delimited(table, path, b',')?,
            OutputFormat::Tsv => self.write_delimited(table, path, b'\t')?,
            OutputFormat::Xlsx => self.write_workbook(table, path)?,
        }
        info!(
            path = %path.display(),
            rows = table.row_count(),
            columns = table.column_count(),
            "wrote table"
        );
        Ok(())
    }
}
