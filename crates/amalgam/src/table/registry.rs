//! Insertion-ordered collection of loaded tables.

use indexmap::IndexMap;
use tracing::warn;

use super::table::Table;

/// Holds loaded tables keyed by case-folded name.
///
/// Iteration follows load order, which every detection and merge step relies
/// on for determinism.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: IndexMap<String, Table>,
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table, replacing any earlier table with the same name.
    pub fn insert(&mut self, mut table: Table) -> Option<Table> {
        table.name = table.name.to_lowercase();
        let name = table.name.clone();
        let replaced = self.tables.insert(name, table);
        if let Some(ref old) = replaced {
            warn!(table = %old.name, "table loaded twice, keeping the latest");
        }
        replaced
    }

    /// Look up a table; the name is case-folded first.
    pub fn get(&self, name: &str) -> Option<&Table> {
        self.tables.get(&name.to_lowercase())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Table names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Table> {
        self.tables.values()
    }

    /// Position of a table in load order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.tables.get_index_of(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

impl FromIterator<Table> for TableRegistry {
    fn from_iter<I: IntoIterator<Item = Table>>(iter: I) -> Self {
        let mut registry = TableRegistry::new();
        for table in iter {
            registry.insert(table);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str) -> Table {
        Table::new(name, vec!["id".into()], Vec::new())
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let registry: TableRegistry = [table("Customers")].into_iter().collect();
        assert!(registry.contains("customers"));
        assert!(registry.contains("CUSTOMERS"));
    }

    #[test]
    fn test_preserves_load_order() {
        let registry: TableRegistry = [table("b"), table("a"), table("c")].into_iter().collect();
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(registry.position("a"), Some(1));
    }

    #[test]
    fn test_duplicate_name_replaces() {
        let mut registry = TableRegistry::new();
        assert!(registry.insert(table("orders")).is_none());
        assert!(registry.insert(table("ORDERS")).is_some());
        assert_eq!(registry.len(), 1);
    }
}
