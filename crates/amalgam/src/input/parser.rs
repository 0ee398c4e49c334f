//! Delimited text parser with delimiter detection and column typing.

use std::io::{BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{AmalgamError, Result};
use crate::table::{Table, Value};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

static SPECIAL_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the file has a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
    /// Trim whitespace around column names.
    pub trim_headers: bool,
    /// Remove characters other than word characters and whitespace from column names.
    pub strip_special_chars: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            trim_headers: false,
            strip_special_chars: false,
        }
    }
}

impl ParserConfig {
    /// Apply the configured header cleaning to a column name.
    pub fn clean_header(&self, header: &str) -> String {
        let mut cleaned = if self.trim_headers {
            header.trim().to_string()
        } else {
            header.to_string()
        };
        if self.strip_special_chars {
            cleaned = SPECIAL_CHARS.replace_all(&cleaned, "").into_owned();
        }
        cleaned
    }
}

/// Parses delimited text files into typed tables.
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse file contents into a table named after the file stem.
    ///
    /// Returns the table and the detected format name.
    pub fn parse_file_bytes(&self, path: &Path, contents: &[u8]) -> Result<(Table, String)> {
        // Detect delimiter if not specified
        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(contents)?,
        };

        let table = self.parse_bytes(&table_name(path), contents, delimiter)?;

        let format = match delimiter {
            b'\t' => "tsv",
            b',' => "csv",
            b';' => "csv-semicolon",
            b'|' => "psv",
            _ => "delimited",
        }
        .to_string();

        Ok((table, format))
    }

    /// Parse bytes directly.
    pub fn parse_bytes(&self, name: &str, bytes: &[u8], delimiter: u8) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            raw_rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        let headers: Vec<String> = if self.config.has_header {
            reader
                .headers()?
                .iter()
                .map(|s| self.config.clean_header(s))
                .collect()
        } else {
            // Generate column names
            let width = raw_rows.iter().map(Vec::len).max().unwrap_or(0);
            (0..width).map(|i| format!("column_{}", i + 1)).collect()
        };

        if headers.is_empty() || (headers.iter().all(|h| h.is_empty()) && raw_rows.is_empty()) {
            return Err(AmalgamError::EmptyData("No columns found".to_string()));
        }

        Ok(build_table(name, headers, raw_rows))
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Table name derived from a file path: the stem, case-folded.
pub fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Build a typed table from raw string cells.
///
/// Each column is typed as a whole: integers if every non-null cell parses as
/// one, then floats, then booleans, otherwise text.
pub fn build_table(name: &str, headers: Vec<String>, raw_rows: Vec<Vec<String>>) -> Table {
    let width = headers.len();
    let mut columns: Vec<Vec<Value>> = Vec::with_capacity(width);

    for index in 0..width {
        let cells: Vec<&str> = raw_rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect();
        columns.push(type_column(&cells));
    }

    let rows = (0..raw_rows.len())
        .map(|r| columns.iter().map(|col| col[r].clone()).collect())
        .collect();

    Table::new(name, headers, rows)
}

/// Convert a column of raw cells into values of one common type.
pub fn type_column(cells: &[&str]) -> Vec<Value> {
    let non_null: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !Value::is_null_token(c))
        .collect();

    let convert = |parse: &dyn Fn(&str) -> Value| -> Vec<Value> {
        cells
            .iter()
            .map(|c| {
                if Value::is_null_token(c) {
                    Value::Null
                } else {
                    parse(c.trim())
                }
            })
            .collect()
    };

    if non_null.is_empty() {
        return cells.iter().map(|_| Value::Null).collect();
    }

    if non_null.iter().all(|c| c.parse::<i64>().is_ok()) {
        return convert(&|c: &str| c.parse::<i64>().map(Value::Integer).unwrap_or(Value::Null));
    }

    if non_null.iter().all(|c| c.parse::<f64>().is_ok()) {
        return convert(&|c: &str| c.parse::<f64>().map(Value::Float).unwrap_or(Value::Null));
    }

    if non_null.iter().all(|c| parse_bool(c).is_some()) {
        return convert(&|c: &str| parse_bool(c).map(Value::Boolean).unwrap_or(Value::Null));
    }

    convert(&|c: &str| Value::Text(c.to_string()))
}

fn parse_bool(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(AmalgamError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a slight bonus
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv_types_columns() {
        let parser = Parser::new();
        let data = b"id,name,price,active\n1,Alice,2.5,true\n2,Bob,3,false\n3,,NA,true";
        let table = parser.parse_bytes("items", data, b',').unwrap();

        assert_eq!(table.columns, vec!["id", "name", "price", "active"]);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(0, "id"), Some(&Value::Integer(1)));
        assert_eq!(table.get(1, "name"), Some(&Value::Text("Bob".into())));
        assert_eq!(table.get(1, "price"), Some(&Value::Float(3.0)));
        assert_eq!(table.get(2, "price"), Some(&Value::Null));
        assert_eq!(table.get(2, "name"), Some(&Value::Null));
        assert_eq!(table.get(0, "active"), Some(&Value::Boolean(true)));
    }

    #[test]
    fn test_header_only_file_gives_empty_table() {
        let table = Parser::new().parse_bytes("t", b"a,b\n", b',').unwrap();
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_clean_header() {
        let config = ParserConfig {
            trim_headers: true,
            strip_special_chars: true,
            ..ParserConfig::default()
        };
        assert_eq!(config.clean_header("  unit price ($) "), "unit price ");
        assert_eq!(ParserConfig::default().clean_header(" a "), " a ");
    }

    #[test]
    fn test_table_name_from_path() {
        assert_eq!(table_name(Path::new("/data/Customers.csv")), "customers");
    }
}
