//! Spreadsheet workbook reader (first worksheet, first row as header).

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use super::parser::{ParserConfig, table_name};
use crate::error::{AmalgamError, Result};
use crate::table::{Table, Value};

/// Read the first worksheet of a workbook into a table named after the file stem.
pub fn read_workbook(path: &Path, config: &ParserConfig) -> Result<Table> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| AmalgamError::Spreadsheet(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AmalgamError::EmptyData(format!("{} has no worksheets", path.display())))?
        .map_err(|e| AmalgamError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| AmalgamError::EmptyData("No header row found".to_string()))?;

    let headers: Vec<String> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| match cell {
            Data::Empty => format!("column_{}", i + 1),
            other => config.clean_header(&other.to_string()),
        })
        .collect();

    let data_rows = rows
        .take(config.max_rows.unwrap_or(usize::MAX))
        .map(|row| row.iter().map(cell_value).collect())
        .collect();

    Ok(Table::new(table_name(path), headers, data_rows))
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        Data::Bool(b) => Value::Boolean(*b),
        Data::String(s) if Value::is_null_token(s) => Value::Null,
        Data::String(s) => Value::Text(s.clone()),
        Data::Error(_) => Value::Null,
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_values() {
        assert_eq!(cell_value(&Data::Int(3)), Value::Integer(3));
        assert_eq!(cell_value(&Data::Float(1.5)), Value::Float(1.5));
        assert_eq!(cell_value(&Data::String("NA".into())), Value::Null);
        assert_eq!(cell_value(&Data::String("x".into())), Value::Text("x".into()));
        assert_eq!(cell_value(&Data::Empty), Value::Null);
    }
}
