//! Foreign-key model: table keys, foreign-key edges and join paths.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Column count mismatch: {source_key} has {source_len}, {destination_key} has {destination_len}")]
    ConstraintShape {
        source_key: String,
        source_len: usize,
        destination_key: String,
        destination_len: usize,
    },
    #[error("Foreign key mixes qualified and unqualified tables: {0} -> {1}")]
    QualificationMismatch(String, String),
    #[error("Path mixes qualified and unqualified foreign keys at edge {0}")]
    PathQualificationMismatch(usize),
    #[error("Path must contain at least one foreign key")]
    EmptyPath,
}

/// A (possibly schema-qualified) table and an ordered list of its columns.
///
/// Column order is positional: in a composite foreign key, the n-th source
/// column pairs with the n-th destination column.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub qualifier: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
}

impl Key {
    pub fn new(table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            qualifier: None,
            table: table.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn qualified(qualifier: impl Into<String>, table: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            qualifier: Some(qualifier.into()),
            ..Self::new(table, columns)
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.qualifier.is_some()
    }

    /// Same number of columns. Duplicate or ragged column lists are not checked.
    pub fn size_matches(&self, other: &Key) -> bool {
        self.columns.len() == other.columns.len()
    }

    /// `qualifier.table`, or `table` when unqualified. Used as graph node identity.
    pub fn fully_qualified_table(&self) -> String {
        match &self.qualifier {
            Some(q) => format!("{}.{}", q, self.table),
            None => self.table.clone(),
        }
    }

    pub fn fully_qualified_columns(&self) -> Vec<String> {
        let table = self.fully_qualified_table();
        self.columns
            .iter()
            .map(|c| format!("{}.{}", table, c))
            .collect()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.fully_qualified_table(),
            self.columns.join(", ")
        )
    }
}

/// One foreign-key constraint: `source` columns reference `destination` columns.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ForeignKey {
    source: Key,
    destination: Key,
}

impl ForeignKey {
    pub fn build(source: Key, destination: Key) -> Result<Self, ModelError> {
        if !source.size_matches(&destination) {
            return Err(ModelError::ConstraintShape {
                source_key: source.to_string(),
                source_len: source.columns.len(),
                destination_key: destination.to_string(),
                destination_len: destination.columns.len(),
            });
        }
        if source.is_qualified() != destination.is_qualified() {
            return Err(ModelError::QualificationMismatch(
                source.to_string(),
                destination.to_string(),
            ));
        }
        Ok(Self {
            source,
            destination,
        })
    }

    pub fn source(&self) -> &Key {
        &self.source
    }

    pub fn destination(&self) -> &Key {
        &self.destination
    }

    pub fn is_qualified(&self) -> bool {
        self.source.is_qualified()
    }

    /// Fully-qualified (source, destination) table names.
    pub fn tables(&self) -> (String, String) {
        (
            self.source.fully_qualified_table(),
            self.destination.fully_qualified_table(),
        )
    }

    pub fn touches(&self, table: &str) -> bool {
        let (source, destination) = self.tables();
        source == table || destination == table
    }

    /// `JOIN <destination> ON <src col> = <dst col> AND ...`, columns paired by position.
    pub fn render_join(&self) -> String {
        let conditions: Vec<String> = self
            .source
            .fully_qualified_columns()
            .into_iter()
            .zip(self.destination.fully_qualified_columns())
            .map(|(src, dst)| format!("{} = {}", src, dst))
            .collect();

        format!(
            "JOIN {} ON {}",
            self.destination.fully_qualified_table(),
            conditions.join(" AND ")
        )
    }
}

impl fmt::Display for ForeignKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// A non-empty walk of foreign keys from a begin table to an end table.
///
/// Edges keep their declared direction; consecutive edges share a table on
/// either side. Paths order lexicographically by their edge sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Path {
    edges: Vec<ForeignKey>,
}

impl Path {
    pub fn new(edges: Vec<ForeignKey>) -> Result<Self, ModelError> {
        let Some(first) = edges.first() else {
            return Err(ModelError::EmptyPath);
        };
        let qualified = first.is_qualified();
        if let Some(idx) = edges.iter().position(|e| e.is_qualified() != qualified) {
            return Err(ModelError::PathQualificationMismatch(idx));
        }
        Ok(Self { edges })
    }

    pub fn edges(&self) -> &[ForeignKey] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Table the rendered join chain starts from: the first edge's source.
    pub fn first_table(&self) -> String {
        self.edges[0].source.fully_qualified_table()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", edge)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fk(source: Key, destination: Key) -> ForeignKey {
        ForeignKey::build(source, destination).unwrap()
    }

    #[test]
    fn test_key_display() {
        assert_eq!(Key::new("table", &["column"]).to_string(), "table(column)");
        assert_eq!(
            Key::qualified("database", "table", &["column"]).to_string(),
            "database.table(column)"
        );
        assert_eq!(
            Key::qualified("plugh", "foo", &["bar", "baz", "qux"]).to_string(),
            "plugh.foo(bar, baz, qux)"
        );
    }

    #[test]
    fn test_fully_qualified_columns() {
        let key = Key::qualified("plugh", "foo", &["a", "b"]);
        assert_eq!(key.fully_qualified_table(), "plugh.foo");
        assert_eq!(key.fully_qualified_columns(), vec!["plugh.foo.a", "plugh.foo.b"]);
    }

    #[test]
    fn test_size_matches_counts_only() {
        let a = Key::new("a", &["x", "x"]);
        let b = Key::new("b", &["y", "z"]);
        assert!(a.size_matches(&b));
        assert!(!a.size_matches(&Key::new("c", &["y"])));
    }

    #[test]
    fn test_foreign_key_display() {
        let foreign_key = fk(
            Key::qualified("src_database", "src_table", &["src_column"]),
            Key::qualified("dst_database", "dst_table", &["dst_column"]),
        );
        assert_eq!(
            foreign_key.to_string(),
            "src_database.src_table(src_column) -> dst_database.dst_table(dst_column)"
        );
    }

    #[test]
    fn test_build_rejects_column_count_mismatch() {
        let err = ForeignKey::build(Key::new("a", &["x", "y"]), Key::new("b", &["id"])).unwrap_err();
        assert!(matches!(
            err,
            ModelError::ConstraintShape {
                source_len: 2,
                destination_len: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_build_rejects_mixed_qualification() {
        let err = ForeignKey::build(Key::qualified("s", "a", &["x"]), Key::new("b", &["id"]))
            .unwrap_err();
        assert!(matches!(err, ModelError::QualificationMismatch(..)));

        let err = ForeignKey::build(Key::new("a", &["x"]), Key::qualified("s", "b", &["id"]))
            .unwrap_err();
        assert!(matches!(err, ModelError::QualificationMismatch(..)));
    }

    #[test]
    fn test_join_simple() {
        let key = fk(Key::new("foo", &["bar_id"]), Key::new("bar", &["id"]));
        assert_eq!(key.render_join(), "JOIN bar ON foo.bar_id = bar.id");
    }

    #[test]
    fn test_join_with_database() {
        let key = fk(
            Key::qualified("plugh", "foo", &["bar_id"]),
            Key::qualified("thud", "bar", &["id"]),
        );
        assert_eq!(
            key.render_join(),
            "JOIN thud.bar ON plugh.foo.bar_id = thud.bar.id"
        );
    }

    #[test]
    fn test_join_composite_is_positional() {
        let key = fk(
            Key::new("src", &["col1", "col3", "col2"]),
            Key::new("dst", &["col_a", "col_c", "col_b"]),
        );
        assert_eq!(
            key.render_join(),
            "JOIN dst ON src.col1 = dst.col_a AND src.col3 = dst.col_c AND src.col2 = dst.col_b"
        );
    }

    #[test]
    fn test_touches() {
        let key = fk(Key::new("foo", &["bar_id"]), Key::new("bar", &["id"]));
        assert!(key.touches("foo"));
        assert!(key.touches("bar"));
        assert!(!key.touches("baz"));
    }

    #[test]
    fn test_path_equality_and_length() {
        let edges = || {
            vec![
                fk(Key::new("foo", &["bar_id"]), Key::new("bar", &["id"])),
                fk(Key::new("bar", &["qux_id"]), Key::new("qux", &["id"])),
            ]
        };
        let path1 = Path::new(edges()).unwrap();
        let path2 = Path::new(edges()).unwrap();
        assert_eq!(path1, path2);
        assert_eq!(path1.len(), 2);
        assert_eq!(path1.first_table(), "foo");
    }

    #[test]
    fn test_path_display_joins_edges_by_newline() {
        let edges = vec![
            fk(Key::qualified("thud", "foo", &["bar_id"]), Key::qualified("plugh", "bar", &["id"])),
            fk(Key::qualified("plugh", "bar", &["qux_id"]), Key::qualified("plugh", "qux", &["id"])),
        ];
        let expected = format!("{}\n{}", edges[0], edges[1]);
        assert_eq!(Path::new(edges).unwrap().to_string(), expected);
    }

    #[test]
    fn test_path_rejects_mixed_qualification() {
        let edges = vec![
            fk(Key::new("foo", &["bar_id"]), Key::new("bar", &["id"])),
            fk(Key::qualified("s", "bar", &["qux_id"]), Key::qualified("s", "qux", &["id"])),
        ];
        assert_eq!(
            Path::new(edges).unwrap_err(),
            ModelError::PathQualificationMismatch(1)
        );
    }

    #[test]
    fn test_path_rejects_empty() {
        assert_eq!(Path::new(vec![]).unwrap_err(), ModelError::EmptyPath);
    }

    #[test]
    fn test_path_ordering_is_lexicographic() {
        let a = Path::new(vec![fk(Key::new("foo", &["bar_id1"]), Key::new("bar", &["id1"]))]).unwrap();
        let b = Path::new(vec![fk(Key::new("foo", &["bar_id2"]), Key::new("bar", &["id2"]))]).unwrap();
        let mut paths = vec![b.clone(), a.clone()];
        paths.sort();
        assert_eq!(paths, vec![a, b]);
    }
}
