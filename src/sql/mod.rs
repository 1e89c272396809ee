//! SQL dump as a source of foreign keys.

mod dialect;
mod lexer;
mod parser;
mod schema;

pub use dialect::Dialect;
pub use parser::{parse_ddl, Ddl, RawForeignKey, SqlParseError, TableName};
pub use schema::SqlSchema;
