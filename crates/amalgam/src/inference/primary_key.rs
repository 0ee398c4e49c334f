//! Primary key detection from column names and value uniqueness.

use serde::{Deserialize, Serialize};

use super::naming::{KEY_NAME_FRAGMENTS, primary_key_candidates};
use crate::table::Table;

/// Why a column was picked as the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyReason {
    /// Name matched one of the identifier conventions exactly.
    ExactName,
    /// Name contains an identifier-like fragment.
    KeyLikeName,
    /// First numeric column whose values are all distinct.
    NumericUnique,
}

impl std::fmt::Display for KeyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyReason::ExactName => write!(f, "exact match"),
            KeyReason::KeyLikeName => write!(f, "contains key term"),
            KeyReason::NumericUnique => write!(f, "numeric and unique"),
        }
    }
}

/// A detected primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub column: String,
    pub reason: KeyReason,
}

/// Infer the column most likely to identify rows of `table`.
///
/// Returns `None` when no column qualifies.
pub fn detect_primary_key(table: &Table) -> Option<PrimaryKey> {
    let found = |index: usize, reason| {
        Some(PrimaryKey {
            column: table.columns[index].clone(),
            reason,
        })
    };

    for candidate in primary_key_candidates(&table.name) {
        for (index, column) in table.columns.iter().enumerate() {
            if column.to_lowercase() == candidate && table.is_unique(index) {
                return found(index, KeyReason::ExactName);
            }
        }
    }

    for (index, column) in table.columns.iter().enumerate() {
        let lower = column.to_lowercase();
        if KEY_NAME_FRAGMENTS.iter().any(|f| lower.contains(f)) && table.is_unique(index) {
            return found(index, KeyReason::KeyLikeName);
        }
    }

    (0..table.column_count())
        .find(|&index| table.column_type(index).is_numeric() && table.is_unique(index))
        .and_then(|index| found(index, KeyReason::NumericUnique))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::new(name, columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Integer(v)).collect()
    }

    #[test]
    fn test_table_id_beats_generic_id() {
        let t = table(
            "orders",
            &["id", "orders_id"],
            vec![ints(&[1, 10]), ints(&[2, 11])],
        );
        let key = detect_primary_key(&t).unwrap();
        assert_eq!(key.column, "orders_id");
        assert_eq!(key.reason, KeyReason::ExactName);
    }

    #[test]
    fn test_singular_form() {
        let t = table(
            "customers",
            &["name", "Customer_ID"],
            vec![
                vec![Value::from("A"), Value::Integer(1)],
                vec![Value::from("B"), Value::Integer(2)],
            ],
        );
        assert_eq!(detect_primary_key(&t).unwrap().column, "Customer_ID");
    }

    #[test]
    fn test_non_ascii_names_fold_case() {
        let t = table(
            "Éléments",
            &["label", "ÉLÉMENT_ID"],
            vec![
                vec![Value::from("a"), Value::Integer(1)],
                vec![Value::from("b"), Value::Integer(2)],
            ],
        );
        let key = detect_primary_key(&t).unwrap();
        assert_eq!(key.column, "ÉLÉMENT_ID");
        assert_eq!(key.reason, KeyReason::ExactName);
    }

    #[test]
    fn test_non_unique_exact_match_is_skipped() {
        let t = table(
            "items",
            &["id", "code"],
            vec![ints(&[1, 100]), ints(&[1, 200])],
        );
        assert_eq!(detect_primary_key(&t).unwrap().column, "code");
    }

    #[test]
    fn test_key_like_name() {
        let t = table(
            "lines",
            &["amount", "invoice_num"],
            vec![ints(&[5, 1]), ints(&[5, 2])],
        );
        let key = detect_primary_key(&t).unwrap();
        assert_eq!(key.column, "invoice_num");
        assert_eq!(key.reason, KeyReason::KeyLikeName);
    }

    #[test]
    fn test_numeric_fallback() {
        let t = table(
            "readings",
            &["label", "value"],
            vec![
                vec![Value::from("a"), Value::Float(1.5)],
                vec![Value::from("a"), Value::Float(2.5)],
            ],
        );
        let key = detect_primary_key(&t).unwrap();
        assert_eq!(key.column, "value");
        assert_eq!(key.reason, KeyReason::NumericUnique);
    }

    #[test]
    fn test_no_key() {
        let t = table(
            "notes",
            &["text"],
            vec![vec![Value::from("x")], vec![Value::from("x")]],
        );
        assert_eq!(detect_primary_key(&t), None);
    }
}
