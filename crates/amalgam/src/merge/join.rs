//! Left-outer join of two tables on a single column pair.

use std::collections::{HashMap, HashSet};

use crate::error::{ConfigurationError, Result};
use crate::table::{KeyValue, Table, Value};

/// Result of a join: the combined table plus where the right columns landed.
#[derive(Debug, Clone)]
pub struct JoinOutput {
    pub table: Table,
    /// Final name of each right-side column, in the right table's order.
    pub right_columns: Vec<String>,
}

/// Keep every row of `left`, attaching the matching rows of `right`.
///
/// Rows keep the left table's order; a left row matching several right rows
/// is repeated once per match in the right table's order. Unmatched rows get
/// nulls. Null keys never match. Right columns whose names are taken are
/// renamed with [`disambiguate`].
pub fn left_outer_join(left: &Table, right: &Table, left_on: &str, right_on: &str) -> Result<JoinOutput> {
    let left_index = left.column_index(left_on).ok_or_else(|| ConfigurationError::UnknownColumn {
        table: left.name.clone(),
        column: left_on.to_string(),
    })?;
    let right_index = right.column_index(right_on).ok_or_else(|| ConfigurationError::UnknownColumn {
        table: right.name.clone(),
        column: right_on.to_string(),
    })?;

    let mut lookup: HashMap<KeyValue, Vec<usize>> = HashMap::new();
    for (row_idx, row) in right.rows.iter().enumerate() {
        if let Some(key) = row[right_index].key() {
            lookup.entry(key).or_default().push(row_idx);
        }
    }

    let mut taken: HashSet<String> = left.columns.iter().cloned().collect();
    let mut right_columns = Vec::with_capacity(right.column_count());
    for column in &right.columns {
        let name = disambiguate(column, &right.name, &taken);
        taken.insert(name.clone());
        right_columns.push(name);
    }

    let mut columns = left.columns.clone();
    columns.extend(right_columns.iter().cloned());

    let mut rows = Vec::with_capacity(left.row_count());
    for left_row in &left.rows {
        let matches = left_row[left_index].key().and_then(|k| lookup.get(&k));
        match matches {
            Some(indices) => {
                for &r in indices {
                    let mut row = left_row.clone();
                    row.extend(right.rows[r].iter().cloned());
                    rows.push(row);
                }
            }
            None => {
                let mut row = left_row.clone();
                row.resize(columns.len(), Value::Null);
                rows.push(row);
            }
        }
    }

    Ok(JoinOutput {
        table: Table::new(&left.name, columns, rows),
        right_columns,
    })
}

/// Name for a right-side column that does not clash with `taken`.
///
/// `column` if free, else `{column}_{table}`, else `{column}_{table}_2`,
/// `_3`, and so on.
pub fn disambiguate(column: &str, table: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(column) {
        return column.to_string();
    }
    let base = format!("{column}_{table}");
    if !taken.contains(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let name = format!("{base}_{n}");
        if !taken.contains(&name) {
            return name;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Integer(v)).collect()
    }

    fn customers() -> Table {
        Table::new(
            "customers",
            vec!["id".into(), "name".into()],
            vec![
                vec![Value::Integer(1), Value::from("A")],
                vec![Value::Integer(2), Value::from("B")],
            ],
        )
    }

    fn orders() -> Table {
        Table::new(
            "orders",
            vec!["order_id".into(), "customer_id".into(), "amount".into()],
            vec![ints(&[10, 1, 5]), ints(&[11, 1, 7]), ints(&[12, 3, 3])],
        )
    }

    #[test]
    fn test_unmatched_rows_get_nulls() {
        let out = left_outer_join(&orders(), &customers(), "customer_id", "id").unwrap();
        assert_eq!(out.table.columns, vec!["order_id", "customer_id", "amount", "id", "name"]);
        assert_eq!(out.table.row_count(), 3);
        assert_eq!(out.table.get(0, "name"), Some(&Value::from("A")));
        assert_eq!(out.table.get(2, "name"), Some(&Value::Null));
        assert_eq!(out.table.get(2, "id"), Some(&Value::Null));
    }

    #[test]
    fn test_fan_out_on_non_unique_right_key() {
        let out = left_outer_join(&customers(), &orders(), "id", "customer_id").unwrap();
        // customer 1 has two orders, customer 2 none
        assert_eq!(out.table.row_count(), 3);
        assert_eq!(out.table.get(0, "order_id"), Some(&Value::Integer(10)));
        assert_eq!(out.table.get(1, "order_id"), Some(&Value::Integer(11)));
        assert_eq!(out.table.get(2, "name"), Some(&Value::from("B")));
        assert_eq!(out.table.get(2, "order_id"), Some(&Value::Null));
    }

    #[test]
    fn test_integral_float_keys_match() {
        let right = Table::new(
            "rates",
            vec!["customer_id".into(), "rate".into()],
            vec![vec![Value::Float(1.0), Value::Float(0.5)]],
        );
        let out = left_outer_join(&customers(), &right, "id", "customer_id").unwrap();
        assert_eq!(out.table.get(0, "rate"), Some(&Value::Float(0.5)));
    }

    #[test]
    fn test_colliding_columns_are_renamed() {
        let right = Table::new(
            "regions",
            vec!["id".into(), "name".into()],
            vec![vec![Value::Integer(1), Value::from("North")]],
        );
        let out = left_outer_join(&customers(), &right, "id", "id").unwrap();
        assert_eq!(out.table.columns, vec!["id", "name", "id_regions", "name_regions"]);
        assert_eq!(out.right_columns, vec!["id_regions", "name_regions"]);
    }

    #[test]
    fn test_null_keys_never_match() {
        let left = Table::new("l", vec!["k".into()], vec![vec![Value::Null]]);
        let right = Table::new(
            "r",
            vec!["k".into(), "v".into()],
            vec![vec![Value::Null, Value::Integer(1)]],
        );
        let out = left_outer_join(&left, &right, "k", "k").unwrap();
        assert_eq!(out.table.row_count(), 1);
        assert_eq!(out.table.get(0, "v"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_column_is_an_error() {
        assert!(left_outer_join(&orders(), &customers(), "nope", "id").is_err());
    }

    #[test]
    fn test_disambiguate_counts_up() {
        let taken: HashSet<String> = ["id", "id_t", "id_t_2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(disambiguate("id", "t", &taken), "id_t_3");
        assert_eq!(disambiguate("name", "t", &taken), "name");
    }
}
