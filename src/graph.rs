//! Foreign-key graph: tables are nodes, foreign keys are edges.

use crate::model::ForeignKey;
use std::collections::HashMap;

/// Adjacency map: fully-qualified table name -> every foreign key touching it.
///
/// Each edge is indexed under both its source and destination table, so a
/// self-referencing foreign key appears twice under the same table.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    adjacency: HashMap<String, Vec<ForeignKey>>,
    edge_count: usize,
}

impl Graph {
    /// Build the adjacency map. Input order is preserved per table.
    pub fn from_foreign_keys<I>(foreign_keys: I) -> Self
    where
        I: IntoIterator<Item = ForeignKey>,
    {
        let mut adjacency: HashMap<String, Vec<ForeignKey>> = HashMap::new();
        let mut edge_count = 0;

        for fk in foreign_keys {
            let (source, destination) = fk.tables();
            adjacency.entry(source).or_default().push(fk.clone());
            adjacency.entry(destination).or_default().push(fk);
            edge_count += 1;
        }

        log::debug!(
            "Built foreign key graph: {} tables, {} edges",
            adjacency.len(),
            edge_count
        );

        Self {
            adjacency,
            edge_count,
        }
    }

    /// Edges touching `table`; empty when the table has no foreign keys.
    pub fn edges(&self, table: &str) -> &[ForeignKey] {
        self.adjacency.get(table).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.adjacency.contains_key(table)
    }

    /// Table names in sorted order.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.adjacency.keys().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Key;

    fn fk(source: &str, source_col: &str, destination: &str, destination_col: &str) -> ForeignKey {
        ForeignKey::build(
            Key::new(source, &[source_col]),
            Key::new(destination, &[destination_col]),
        )
        .unwrap()
    }

    #[test]
    fn test_edge_indexed_under_both_tables() {
        let edge = fk("child", "parent_id", "parent", "id");
        let graph = Graph::from_foreign_keys(vec![edge.clone()]);

        assert_eq!(graph.edges("child"), &[edge.clone()]);
        assert_eq!(graph.edges("parent"), &[edge]);
        assert_eq!(graph.tables(), vec!["child", "parent"]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_missing_table_has_no_edges() {
        let graph = Graph::from_foreign_keys(vec![fk("child", "parent_id", "parent", "id")]);
        assert!(graph.edges("orphan").is_empty());
        assert!(!graph.contains_table("orphan"));
    }

    #[test]
    fn test_preserves_insertion_order() {
        let first = fk("foo", "bar_id1", "bar", "id1");
        let second = fk("foo", "bar_id2", "bar", "id2");
        let graph = Graph::from_foreign_keys(vec![first.clone(), second.clone()]);
        assert_eq!(graph.edges("bar"), &[first, second]);
    }

    #[test]
    fn test_self_reference_indexed_twice() {
        let edge = fk("employee", "manager_id", "employee", "id");
        let graph = Graph::from_foreign_keys(vec![edge.clone()]);
        assert_eq!(graph.edges("employee"), &[edge.clone(), edge]);
    }

    #[test]
    fn test_qualified_tables_are_distinct_nodes() {
        let edge = ForeignKey::build(
            Key::qualified("sales", "orders", &["customer_id"]),
            Key::qualified("crm", "customers", &["id"]),
        )
        .unwrap();
        let graph = Graph::from_foreign_keys(vec![edge]);
        assert!(graph.contains_table("sales.orders"));
        assert!(graph.contains_table("crm.customers"));
        assert!(!graph.contains_table("orders"));
    }
}
