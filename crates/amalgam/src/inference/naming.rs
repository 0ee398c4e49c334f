//! Column-naming conventions for identifiers and foreign keys.
//!
//! Each convention is a small pure function so the candidate lists stay easy
//! to read, reorder and test one by one.

/// Strip one trailing `s`. `None` when the name has no plural `s`.
pub fn singular(name: &str) -> Option<&str> {
    name.strip_suffix('s')
}

/// Produces a candidate name for a table, if the convention applies.
pub type KeyCandidate = fn(&str) -> Option<String>;

/// Produces a foreign-key column name in `source` that would reference `target`.
pub type ForeignKeyCandidate = fn(source: &str, target: &str) -> Option<String>;

/// Primary key conventions, highest priority first.
pub const PRIMARY_KEY_CANDIDATES: &[KeyCandidate] = &[
    |t| Some(format!("{t}_id")),
    |t| singular(t).map(|s| format!("{s}_id")),
    |t| Some(format!("{t}id")),
    |t| singular(t).map(|s| format!("{s}id")),
    |_| Some("id".to_string()),
    |_| Some("key".to_string()),
    |t| Some(format!("{t}_key")),
    |_| Some("pk".to_string()),
    |t| Some(format!("{t}_pk")),
    |_| Some("object_id".to_string()),
    |_| Some("record_id".to_string()),
    |_| Some("sequence".to_string()),
    |_| Some("seq".to_string()),
    |_| Some("code".to_string()),
];

/// Fragments that make a column name look like an identifier.
pub const KEY_NAME_FRAGMENTS: &[&str] = &["id", "key", "code", "num"];

/// Foreign key conventions, in the order they are tried.
pub const FOREIGN_KEY_CANDIDATES: &[ForeignKeyCandidate] = &[
    |_, t| Some(format!("{t}_id")),
    |_, t| Some(format!("{t}id")),
    |_, t| singular(t).map(|s| format!("{s}_id")),
    |_, t| Some(format!("{t}_key")),
    |_, t| Some(format!("{t}_code")),
    |_, t| Some(format!("{t}_number")),
    |_, t| singular(t).map(|s| format!("{s}id")),
    |_, t| singular(t).map(|s| format!("{s}_code")),
    |_, t| known_table(t, "customers", "customer_id"),
    |_, t| known_table(t, "products", "product_id"),
    |_, t| known_table(t, "orders", "order_id"),
    |_, t| known_table(t, "employees", "employee_id"),
    |_, t| known_table(t, "categories", "category_id"),
    |_, t| known_table(t, "suppliers", "supplier_id"),
];

fn known_table(target: &str, table: &str, column: &str) -> Option<String> {
    (target == table).then(|| column.to_string())
}

/// Column names that identify a table when it has no assigned key yet.
pub fn fallback_target_names(table: &str) -> [String; 3] {
    ["id".to_string(), format!("{table}_id"), format!("{table}id")]
}

/// All primary key candidates for a table, in priority order.
pub fn primary_key_candidates(table: &str) -> Vec<String> {
    PRIMARY_KEY_CANDIDATES.iter().filter_map(|c| c(table)).collect()
}

/// All foreign key candidates in `source` that could reference `target`.
pub fn foreign_key_candidates(source: &str, target: &str) -> Vec<String> {
    FOREIGN_KEY_CANDIDATES
        .iter()
        .filter_map(|c| c(source, target))
        .collect()
}
