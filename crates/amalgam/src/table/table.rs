//! Named tables of typed rows.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::value::{ColumnType, Value};

/// A named table with ordered columns and row-major values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    /// Table name, case-folded.
    pub name: String,
    /// Column names in order.
    pub columns: Vec<String>,
    /// One value per column for every row.
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create a table, padding short rows with nulls and truncating long ones.
    pub fn new(name: impl AsRef<str>, columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();

        Self {
            name: name.as_ref().to_lowercase(),
            columns,
            rows,
        }
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column, matched exactly.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns true if the table has a column with exactly this name.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &Value> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// Get a cell by row index and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Inferred type of the column at `index`.
    pub fn column_type(&self, index: usize) -> ColumnType {
        ColumnType::infer(self.column_values(index))
    }

    /// Whether every value in the column is distinct.
    ///
    /// Nulls count as values, so two nulls make a column non-unique.
    pub fn is_unique(&self, index: usize) -> bool {
        let mut seen = HashSet::with_capacity(self.rows.len());
        self.column_values(index).all(|v| seen.insert(v.key()))
    }

    /// A copy holding at most the first `rows` rows.
    pub fn head(&self, rows: usize) -> Table {
        Table {
            name: self.name.clone(),
            columns: self.columns.clone(),
            rows: self.rows.iter().take(rows).cloned().collect(),
        }
    }

    /// Short description used in listings.
    pub fn summary(&self) -> TableSummary {
        TableSummary {
            name: self.name.clone(),
            row_count: self.row_count(),
            column_count: self.column_count(),
            columns: self.columns.clone(),
        }
    }
}

/// Row and column counts for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSummary {
    pub name: String,
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::new(
            "Orders",
            vec!["order_id".into(), "customer_id".into()],
            vec![
                vec![Value::Integer(10), Value::Integer(1)],
                vec![Value::Integer(11), Value::Integer(1)],
                vec![Value::Integer(12)],
            ],
        )
    }

    #[test]
    fn test_name_is_case_folded() {
        assert_eq!(sample().name, "orders");
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = sample();
        assert_eq!(table.get(2, "customer_id"), Some(&Value::Null));
        assert!(table.rows.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn test_uniqueness() {
        let table = sample();
        assert!(table.is_unique(0));
        assert!(!table.is_unique(1));

        let nulls = Table::new("t", vec!["a".into()], vec![vec![Value::Null], vec![Value::Null]]);
        assert!(!nulls.is_unique(0));
    }

    #[test]
    fn test_head() {
        let table = sample().head(1);
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns.len(), 2);
    }
}
