//! Foreign-key relationship detection between table pairs.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::naming::{fallback_target_names, foreign_key_candidates};
use crate::table::{Table, TableRegistry};

/// Where a relationship came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipOrigin {
    /// Found by naming conventions.
    #[default]
    Detected,
    /// Added through the override API.
    Manual,
}

/// A directed reference from `source_table.source_column` to
/// `target_table.target_column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    pub source_table: String,
    pub target_table: String,
    pub source_column: String,
    pub target_column: String,
    #[serde(default)]
    pub origin: RelationshipOrigin,
}

impl Relationship {
    /// A relationship found by detection.
    pub fn detected(
        source_table: impl Into<String>,
        target_table: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            source_column: source_column.into(),
            target_column: target_column.into(),
            origin: RelationshipOrigin::Detected,
        }
    }

    /// A relationship supplied by the caller.
    pub fn manual(
        source_table: impl Into<String>,
        target_table: impl Into<String>,
        source_column: impl Into<String>,
        target_column: impl Into<String>,
    ) -> Self {
        Self {
            origin: RelationshipOrigin::Manual,
            ..Self::detected(source_table, target_table, source_column, target_column)
        }
    }

    /// Compare endpoints only, ignoring origin.
    pub fn links(&self, source_table: &str, target_table: &str, source_column: &str, target_column: &str) -> bool {
        self.source_table == source_table
            && self.target_table == target_table
            && self.source_column == source_column
            && self.target_column == target_column
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source_table, self.source_column, self.target_table, self.target_column
        )
    }
}

/// A key assigned to a table during relationship detection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPromotion {
    pub table: String,
    pub column: String,
}

/// Output of [`detect_relationships`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationshipDetection {
    /// Relationships in discovery order. Not deduplicated.
    pub relationships: Vec<Relationship>,
    /// Keys the caller should record, in the order they were assigned.
    pub promoted_keys: Vec<KeyPromotion>,
}

/// Propose relationships for every ordered table pair.
///
/// `keys` is not modified. When a target table has no key, a unique column
/// named `id`, `{table}_id` or `{table}id` is used and returned as a promotion;
/// later pairs in the same run see it as that table's key.
pub fn detect_relationships(
    tables: &TableRegistry,
    keys: &IndexMap<String, String>,
) -> RelationshipDetection {
    let mut overlay = keys.clone();
    let mut detection = RelationshipDetection::default();

    for source in tables.iter() {
        for target in tables.iter() {
            if source.name == target.name {
                continue;
            }

            for candidate in foreign_key_candidates(&source.name, &target.name) {
                for column in &source.columns {
                    if column.to_lowercase() != candidate {
                        continue;
                    }

                    let target_column = match overlay.get(&target.name) {
                        Some(key) => key.clone(),
                        None => match fallback_target_key(target) {
                            Some(key) => {
                                overlay.insert(target.name.clone(), key.clone());
                                detection.promoted_keys.push(KeyPromotion {
                                    table: target.name.clone(),
                                    column: key.clone(),
                                });
                                key
                            }
                            None => continue,
                        },
                    };

                    detection.relationships.push(Relationship::detected(
                        source.name.as_str(),
                        target.name.as_str(),
                        column.as_str(),
                        target_column,
                    ));
                }
            }
        }
    }

    detection
}

/// First unique column whose lowercase name identifies `table`.
fn fallback_target_key(table: &Table) -> Option<String> {
    let names = fallback_target_names(&table.name);
    table
        .columns
        .iter()
        .enumerate()
        .find(|(index, column)| names.contains(&column.to_lowercase()) && table.is_unique(*index))
        .map(|(_, column)| column.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Value;

    fn ints(values: &[i64]) -> Vec<Value> {
        values.iter().map(|&v| Value::Integer(v)).collect()
    }

    fn registry() -> TableRegistry {
        [
            Table::new(
                "customers",
                vec!["id".into(), "name".into()],
                vec![
                    vec![Value::Integer(1), Value::from("A")],
                    vec![Value::Integer(2), Value::from("B")],
                ],
            ),
            Table::new(
                "orders",
                vec!["order_id".into(), "customer_id".into(), "amount".into()],
                vec![ints(&[10, 1, 5]), ints(&[11, 1, 7]), ints(&[12, 2, 3])],
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_uses_assigned_key() {
        let mut keys = IndexMap::new();
        keys.insert("customers".to_string(), "id".to_string());

        let detection = detect_relationships(&registry(), &keys);
        assert!(detection
            .relationships
            .iter()
            .any(|r| r.links("orders", "customers", "customer_id", "id")));
        assert!(detection.promoted_keys.is_empty());
    }

    #[test]
    fn test_promotes_fallback_key() {
        let detection = detect_relationships(&registry(), &IndexMap::new());
        assert_eq!(
            detection.promoted_keys,
            vec![KeyPromotion {
                table: "customers".into(),
                column: "id".into(),
            }]
        );
        assert!(detection
            .relationships
            .iter()
            .all(|r| r.links("orders", "customers", "customer_id", "id")));
    }

    #[test]
    fn test_non_ascii_foreign_key_column() {
        let tables: TableRegistry = [
            Table::new("Éléments", vec!["id".into()], vec![ints(&[1]), ints(&[2])]),
            Table::new(
                "lignes",
                vec!["ligne_id".into(), "ÉLÉMENT_ID".into()],
                vec![ints(&[10, 1]), ints(&[11, 2])],
            ),
        ]
        .into_iter()
        .collect();

        let detection = detect_relationships(&tables, &IndexMap::new());
        assert!(detection
            .relationships
            .iter()
            .any(|r| r.links("lignes", "éléments", "ÉLÉMENT_ID", "id")));
    }

    #[test]
    fn test_multiple_templates_yield_duplicates() {
        let detection = detect_relationships(&registry(), &IndexMap::new());
        // customer_id matches both the singular template and the customers literal
        assert_eq!(detection.relationships.len(), 2);
        assert_eq!(detection.relationships[0], detection.relationships[1]);
    }

    #[test]
    fn test_no_target_key_means_no_relationship() {
        let tables: TableRegistry = [
            Table::new("users", vec!["name".into()], vec![vec![Value::from("a")]]),
            Table::new("posts", vec!["users_id".into()], vec![ints(&[1])]),
        ]
        .into_iter()
        .collect();

        let detection = detect_relationships(&tables, &IndexMap::new());
        assert!(detection.relationships.is_empty());
    }

    #[test]
    fn test_display() {
        let rel = Relationship::detected("orders", "customers", "customer_id", "id");
        assert_eq!(rel.to_string(), "orders.customer_id -> customers.id");
    }
}
