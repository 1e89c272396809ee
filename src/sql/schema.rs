//! Schema source backed by a SQL DDL dump.

use super::dialect::Dialect;
use super::parser::{parse_ddl, RawForeignKey, SqlParseError, TableName};
use crate::model::{ForeignKey, Key};
use crate::source::{SchemaSource, SourceError};

/// Foreign keys read from `CREATE TABLE` / `ALTER TABLE` statements.
///
/// When any table in the dump carries a schema prefix, every name is
/// qualified: bare names get the default schema. Otherwise all names stay
/// bare. Either way the resulting keys never mix qualification.
#[derive(Debug, Clone)]
pub struct SqlSchema {
    dialect: Dialect,
    default_schema: Option<String>,
    qualified: bool,
    tables: Vec<TableName>,
    foreign_keys: Vec<RawForeignKey>,
}

impl SqlSchema {
    pub fn parse(input: &str, dialect: Dialect) -> Result<Self, SqlParseError> {
        let dialect = dialect.resolve(input);
        let ddl = parse_ddl(input)?;

        let qualified = ddl.tables.iter().any(|t| t.schema.is_some())
            || ddl
                .foreign_keys
                .iter()
                .any(|fk| fk.table.schema.is_some() || fk.target.schema.is_some());

        log::debug!(
            "Parsed {:?} schema: {} tables, {} foreign keys, qualified={}",
            dialect,
            ddl.tables.len(),
            ddl.foreign_keys.len(),
            qualified
        );

        Ok(Self {
            dialect,
            default_schema: dialect.default_schema().map(str::to_string),
            qualified,
            tables: ddl.tables,
            foreign_keys: ddl.foreign_keys,
        })
    }

    /// Override the dialect's default schema for bare names.
    pub fn with_default_schema(mut self, schema: Option<String>) -> Self {
        if schema.is_some() {
            self.default_schema = schema;
        }
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn is_qualified(&self) -> bool {
        self.qualified
    }

    /// Names of the tables created in the dump, normalized like graph nodes.
    pub fn table_names(&self) -> Result<Vec<String>, SourceError> {
        self.tables
            .iter()
            .map(|t| self.qualifier(t).map(|q| fully_qualified(q.as_deref(), &t.name)))
            .collect()
    }

    /// Like [`SchemaSource::list_foreign_keys`], but invalid constraints are
    /// logged and skipped instead of failing the whole schema.
    pub fn list_foreign_keys_lenient(&self) -> Vec<ForeignKey> {
        self.foreign_keys
            .iter()
            .filter_map(|raw| match self.build_foreign_key(raw) {
                Ok(fk) => Some(fk),
                Err(e) => {
                    log::warn!("Skipping foreign key: {}", e);
                    None
                }
            })
            .collect()
    }

    fn qualifier(&self, table: &TableName) -> Result<Option<String>, SourceError> {
        if !self.qualified {
            return Ok(None);
        }
        match (&table.schema, &self.default_schema) {
            (Some(schema), _) => Ok(Some(schema.clone())),
            (None, Some(default)) => Ok(Some(default.clone())),
            (None, None) => Err(SourceError::NoDefaultSchema(table.name.clone())),
        }
    }

    fn key(&self, table: &TableName, columns: &[String]) -> Result<Key, SourceError> {
        Ok(Key {
            qualifier: self.qualifier(table)?,
            table: table.name.clone(),
            columns: columns.to_vec(),
        })
    }

    fn build_foreign_key(&self, raw: &RawForeignKey) -> Result<ForeignKey, SourceError> {
        let source = self.key(&raw.table, &raw.columns)?;
        let destination = self.key(&raw.target, &raw.target_columns)?;
        ForeignKey::build(source, destination).map_err(|error| SourceError::InvalidForeignKey {
            table: raw.table.to_string(),
            error,
        })
    }
}

impl SchemaSource for SqlSchema {
    fn list_foreign_keys(&self) -> Result<Vec<ForeignKey>, SourceError> {
        self.foreign_keys
            .iter()
            .map(|raw| self.build_foreign_key(raw))
            .collect()
    }

    /// Names are folded like the DDL lexer folds them: bare parts to lower
    /// case, quoted parts kept as written.
    fn resolve_table_name(&self, name: &str) -> Result<String, SourceError> {
        let name = name
            .split('.')
            .map(fold_identifier)
            .collect::<Vec<_>>()
            .join(".");
        if !self.qualified || name.contains('.') {
            return Ok(name);
        }
        match &self.default_schema {
            Some(schema) => Ok(fully_qualified(Some(schema), &name)),
            None => Err(SourceError::NoDefaultSchema(name)),
        }
    }
}

fn fold_identifier(part: &str) -> String {
    let part = part.trim();
    for (open, close) in [('"', '"'), ('`', '`'), ('[', ']')] {
        if let Some(inner) = part
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.to_string();
        }
    }
    part.to_lowercase()
}

fn fully_qualified(schema: Option<&str>, table: &str) -> String {
    match schema {
        Some(schema) => format!("{}.{}", schema, table),
        None => table.to_string(),
    }
}
