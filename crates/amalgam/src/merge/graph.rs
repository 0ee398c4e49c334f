//! Bidirectional adjacency over tables, derived from relationships.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::inference::Relationship;

/// One traversable edge from a table to a neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The table on the other end.
    pub neighbor: String,
    /// Join column in the table that owns this edge.
    pub local_column: String,
    /// Join column in the neighbor.
    pub remote_column: String,
}

/// Table → edges, holding both directions of every relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipGraph {
    adjacency: IndexMap<String, Vec<Edge>>,
}

impl RelationshipGraph {
    /// Build the graph over `tables` (in order) from `relationships`.
    ///
    /// Every table gets an entry. Relationships naming a table outside
    /// `tables` are skipped.
    pub fn build<'a>(
        tables: impl IntoIterator<Item = &'a str>,
        relationships: &[Relationship],
    ) -> Self {
        let mut adjacency: IndexMap<String, Vec<Edge>> = tables
            .into_iter()
            .map(|t| (t.to_string(), Vec::new()))
            .collect();

        for rel in relationships {
            if !adjacency.contains_key(&rel.source_table) || !adjacency.contains_key(&rel.target_table) {
                warn!(relationship = %rel, "relationship references an unknown table, ignoring");
                continue;
            }

            if let Some(edges) = adjacency.get_mut(&rel.source_table) {
                edges.push(Edge {
                    neighbor: rel.target_table.clone(),
                    local_column: rel.source_column.clone(),
                    remote_column: rel.target_column.clone(),
                });
            }
            if let Some(edges) = adjacency.get_mut(&rel.target_table) {
                edges.push(Edge {
                    neighbor: rel.source_table.clone(),
                    local_column: rel.target_column.clone(),
                    remote_column: rel.source_column.clone(),
                });
            }
        }

        Self { adjacency }
    }

    /// Edges leaving `table`, in insertion order.
    pub fn edges(&self, table: &str) -> &[Edge] {
        self.adjacency.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of edges leaving `table`.
    pub fn degree(&self, table: &str) -> usize {
        self.edges(table).len()
    }

    /// Distinct neighbors of `table`, first-seen order.
    pub fn neighbors(&self, table: &str) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for edge in self.edges(table) {
            if !seen.contains(&edge.neighbor.as_str()) {
                seen.push(edge.neighbor.as_str());
            }
        }
        seen
    }

    /// The table with the most edges; the earliest table wins ties.
    pub fn root(&self) -> Option<&str> {
        let mut best: Option<(&str, usize)> = None;
        for (table, edges) in &self.adjacency {
            if best.is_none_or(|(_, degree)| edges.len() > degree) {
                best = Some((table.as_str(), edges.len()));
            }
        }
        best.map(|(table, _)| table)
    }

    /// Tables in the graph, in build order.
    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.adjacency.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_symmetric() {
        let rels = vec![Relationship::detected("orders", "customers", "customer_id", "id")];
        let graph = RelationshipGraph::build(["customers", "orders"], &rels);

        assert_eq!(
            graph.edges("orders"),
            &[Edge {
                neighbor: "customers".into(),
                local_column: "customer_id".into(),
                remote_column: "id".into(),
            }]
        );
        assert_eq!(
            graph.edges("customers"),
            &[Edge {
                neighbor: "orders".into(),
                local_column: "id".into(),
                remote_column: "customer_id".into(),
            }]
        );
    }

    #[test]
    fn test_root_prefers_degree_then_order() {
        let rels = vec![
            Relationship::detected("orders", "customers", "customer_id", "id"),
            Relationship::detected("orders", "products", "product_id", "id"),
        ];
        let graph = RelationshipGraph::build(["customers", "products", "orders"], &rels);
        assert_eq!(graph.root(), Some("orders"));

        let tie = RelationshipGraph::build(["customers", "orders"], &rels[..1]);
        assert_eq!(tie.root(), Some("customers"));
    }

    #[test]
    fn test_isolated_tables_have_empty_entries() {
        let graph = RelationshipGraph::build(["a", "b"], &[]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.degree("a"), 0);
        assert_eq!(graph.root(), Some("a"));
    }

    #[test]
    fn test_unknown_tables_are_skipped() {
        let rels = vec![Relationship::detected("orders", "ghosts", "ghost_id", "id")];
        let graph = RelationshipGraph::build(["orders"], &rels);
        assert_eq!(graph.degree("orders"), 0);
    }

    #[test]
    fn test_neighbors_are_distinct() {
        let rels = vec![
            Relationship::detected("orders", "customers", "customer_id", "id"),
            Relationship::detected("orders", "customers", "customer_id", "id"),
        ];
        let graph = RelationshipGraph::build(["customers", "orders"], &rels);
        assert_eq!(graph.degree("orders"), 2);
        assert_eq!(graph.neighbors("orders"), vec!["customers"]);
    }
}
