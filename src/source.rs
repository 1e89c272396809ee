//! Where foreign keys come from.

use crate::model::{ForeignKey, ModelError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("No default schema available for unqualified table name: {0}")]
    NoDefaultSchema(String),
    #[error("Invalid foreign key on {table}: {error}")]
    InvalidForeignKey {
        table: String,
        #[source]
        error: ModelError,
    },
}

/// A schema that can list its foreign keys and qualify table names.
pub trait SchemaSource {
    /// Every foreign key in the schema, with qualification already normalized.
    fn list_foreign_keys(&self) -> Result<Vec<ForeignKey>, SourceError>;

    /// Turn a user-supplied table name into the graph's node name.
    fn resolve_table_name(&self, name: &str) -> Result<String, SourceError>;
}
