//! SQL parser extracting tables, primary keys and foreign keys from DDL.

use super::lexer::{Lexer, Token};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqlParseError {
    #[error("Expected {expected}, found {found:?}")]
    Expected { expected: &'static str, found: Token },
    #[error("Unexpected end of input")]
    UnexpectedEof,
    #[error("Foreign key on {table} references {target} without columns, and {target} has no primary key")]
    MissingReferencedColumns { table: String, target: String },
}

/// A table name as written, with its schema prefix if any.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    pub schema: Option<String>,
    pub name: String,
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A foreign key as declared, before qualification is normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct RawForeignKey {
    pub table: TableName,
    pub columns: Vec<String>,
    pub target: TableName,
    pub target_columns: Vec<String>,
}

/// Everything the DDL says about keys.
#[derive(Debug, Clone, Default)]
pub struct Ddl {
    pub tables: Vec<TableName>,
    pub foreign_keys: Vec<RawForeignKey>,
}

/// Parse a schema dump. Foreign keys are returned in declaration order.
pub fn parse_ddl(input: &str) -> Result<Ddl, SqlParseError> {
    let tokens = Lexer::new(input).tokenize();
    Parser::new(tokens).parse()
}

/// Foreign key whose referenced columns may still be implied by a primary key.
struct PendingForeignKey {
    table: TableName,
    columns: Vec<String>,
    target: TableName,
    target_columns: Option<Vec<String>>,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    tables: Vec<TableName>,
    primary_keys: HashMap<TableName, Vec<String>>,
    pending: Vec<PendingForeignKey>,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            tables: Vec::new(),
            primary_keys: HashMap::new(),
            pending: Vec::new(),
        }
    }

    fn current(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or(&Token::Eof)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn expected(&self, expected: &'static str) -> SqlParseError {
        match self.current() {
            Token::Eof => SqlParseError::UnexpectedEof,
            found => SqlParseError::Expected {
                expected,
                found: found.clone(),
            },
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), SqlParseError> {
        if *self.current() != token {
            return Err(self.expected(expected));
        }
        self.advance();
        Ok(())
    }

    fn parse(mut self) -> Result<Ddl, SqlParseError> {
        while *self.current() != Token::Eof {
            match self.current() {
                Token::Create => {
                    self.advance();
                    self.parse_create()?;
                }
                Token::Alter => {
                    self.advance();
                    self.parse_alter()?;
                }
                _ => self.advance(),
            }
        }
        self.finish()
    }

    /// Fill in implied referenced columns from primary keys.
    fn finish(self) -> Result<Ddl, SqlParseError> {
        let mut foreign_keys = Vec::with_capacity(self.pending.len());

        for fk in self.pending {
            let target_columns = match fk.target_columns {
                Some(columns) => columns,
                None => self
                    .primary_keys
                    .get(&fk.target)
                    .or_else(|| {
                        // Referenced by bare name while declared with a schema, or vice versa.
                        self.primary_keys
                            .iter()
                            .find(|(table, _)| table.name == fk.target.name)
                            .map(|(_, columns)| columns)
                    })
                    .cloned()
                    .ok_or_else(|| SqlParseError::MissingReferencedColumns {
                        table: fk.table.to_string(),
                        target: fk.target.to_string(),
                    })?,
            };
            foreign_keys.push(RawForeignKey {
                table: fk.table,
                columns: fk.columns,
                target: fk.target,
                target_columns,
            });
        }

        Ok(Ddl {
            tables: self.tables,
            foreign_keys,
        })
    }

    fn parse_create(&mut self) -> Result<(), SqlParseError> {
        // TEMPORARY, UNLOGGED, GLOBAL and similar modifiers
        while matches!(self.current(), Token::Ident(_)) {
            self.advance();
        }
        if *self.current() != Token::Table {
            // INDEX, VIEW, SEQUENCE, ...
            self.skip_statement();
            return Ok(());
        }
        self.advance();
        self.skip_if_exists();

        let Some(table) = self.parse_table_name() else {
            self.skip_statement();
            return Ok(());
        };
        if !self.tables.contains(&table) {
            self.tables.push(table.clone());
        }

        if *self.current() == Token::LParen {
            self.advance();
            self.parse_table_body(&table)?;
        }

        // Table options (ENGINE=, WITH (...), ...)
        self.skip_statement();
        Ok(())
    }

    fn parse_table_body(&mut self, table: &TableName) -> Result<(), SqlParseError> {
        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    return Ok(());
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                Token::Comma => self.advance(),
                Token::Constraint => {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                Token::Primary => {
                    self.advance();
                    self.expect(Token::Key, "KEY")?;
                    let columns = self.parse_column_list()?;
                    self.primary_keys.insert(table.clone(), columns);
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Foreign => {
                    let fk = self.parse_foreign_key_clause(table)?;
                    self.pending.push(fk);
                    self.skip_until(&[Token::Comma, Token::RParen]);
                }
                Token::Ident(_) => self.parse_column(table)?,
                _ => self.skip_until(&[Token::Comma, Token::RParen]),
            }
        }
    }

    /// Column definition; only inline PRIMARY KEY and REFERENCES matter.
    fn parse_column(&mut self, table: &TableName) -> Result<(), SqlParseError> {
        let name = match self.current() {
            Token::Ident(name) => name.clone(),
            _ => return Ok(()),
        };
        self.advance();

        loop {
            match self.current() {
                Token::Comma | Token::RParen | Token::Semicolon => return Ok(()),
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                Token::LParen => self.skip_parenthesized(),
                Token::Primary => {
                    self.advance();
                    if *self.current() == Token::Key {
                        self.advance();
                        self.primary_keys.insert(table.clone(), vec![name.clone()]);
                    }
                }
                Token::References => {
                    self.advance();
                    let (target, target_columns) = self.parse_reference()?;
                    self.pending.push(PendingForeignKey {
                        table: table.clone(),
                        columns: vec![name.clone()],
                        target,
                        target_columns,
                    });
                }
                _ => self.advance(),
            }
        }
    }

    /// `FOREIGN KEY [name] (cols) REFERENCES target [(cols)]`
    fn parse_foreign_key_clause(
        &mut self,
        table: &TableName,
    ) -> Result<PendingForeignKey, SqlParseError> {
        self.expect(Token::Foreign, "FOREIGN")?;
        self.expect(Token::Key, "KEY")?;

        // MySQL allows an index name here
        if let Token::Ident(_) = self.current() {
            self.advance();
        }

        let columns = self.parse_column_list()?;
        self.expect(Token::References, "REFERENCES")?;
        let (target, target_columns) = self.parse_reference()?;

        Ok(PendingForeignKey {
            table: table.clone(),
            columns,
            target,
            target_columns,
        })
    }

    fn parse_reference(&mut self) -> Result<(TableName, Option<Vec<String>>), SqlParseError> {
        let target = self
            .parse_table_name()
            .ok_or_else(|| self.expected("referenced table"))?;

        let columns = if *self.current() == Token::LParen {
            Some(self.parse_column_list()?)
        } else {
            None
        };

        Ok((target, columns))
    }

    /// `[catalog.][schema.]table`; only the last two parts are kept.
    fn parse_table_name(&mut self) -> Option<TableName> {
        let mut parts = Vec::new();
        loop {
            match self.current() {
                Token::Ident(part) => {
                    parts.push(part.clone());
                    self.advance();
                }
                _ => break,
            }
            if *self.current() != Token::Dot {
                break;
            }
            self.advance();
        }

        let name = parts.pop()?;
        Some(TableName {
            schema: parts.pop(),
            name,
        })
    }

    /// `(a, b DESC, c(10))` -> `[a, b, c]`
    fn parse_column_list(&mut self) -> Result<Vec<String>, SqlParseError> {
        self.expect(Token::LParen, "(")?;

        let mut columns = Vec::new();
        let mut expect_column = true;

        loop {
            match self.current() {
                Token::RParen => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(SqlParseError::UnexpectedEof),
                Token::Comma => {
                    expect_column = true;
                    self.advance();
                }
                Token::LParen => self.skip_parenthesized(),
                Token::Ident(name) if expect_column => {
                    columns.push(name.clone());
                    expect_column = false;
                    self.advance();
                }
                _ => self.advance(),
            }
        }

        Ok(columns)
    }

    fn parse_alter(&mut self) -> Result<(), SqlParseError> {
        if *self.current() != Token::Table {
            self.skip_statement();
            return Ok(());
        }
        self.advance();
        self.skip_if_exists();
        if *self.current() == Token::Only {
            self.advance();
        }

        let Some(table) = self.parse_table_name() else {
            self.skip_statement();
            return Ok(());
        };

        // Comma-separated actions; only ADD [CONSTRAINT name] FOREIGN/PRIMARY KEY
        // and ADD [COLUMN] definitions matter.
        loop {
            if *self.current() == Token::Add {
                self.advance();
                if *self.current() == Token::Constraint {
                    self.advance();
                    if let Token::Ident(_) = self.current() {
                        self.advance();
                    }
                }
                match self.current() {
                    Token::Foreign => {
                        let fk = self.parse_foreign_key_clause(&table)?;
                        self.pending.push(fk);
                    }
                    Token::Primary => {
                        self.advance();
                        self.expect(Token::Key, "KEY")?;
                        let columns = self.parse_column_list()?;
                        self.primary_keys.insert(table.clone(), columns);
                    }
                    Token::Ident(word) if word == "column" => {
                        self.advance();
                        self.skip_if_exists();
                        self.parse_column(&table)?;
                    }
                    Token::Ident(_) => self.parse_column(&table)?,
                    _ => {}
                }
            }

            self.skip_until(&[Token::Comma, Token::Semicolon]);
            if *self.current() != Token::Comma {
                break;
            }
            self.advance();
        }

        self.skip_statement();
        Ok(())
    }

    fn skip_if_exists(&mut self) {
        if *self.current() == Token::If {
            self.advance();
            if *self.current() == Token::Not {
                self.advance();
            }
            if *self.current() == Token::Exists {
                self.advance();
            }
        }
    }

    fn skip_parenthesized(&mut self) {
        if *self.current() != Token::LParen {
            self.advance();
            return;
        }
        self.advance();
        let mut depth = 1;
        while depth > 0 {
            match self.current() {
                Token::LParen => depth += 1,
                Token::RParen => depth -= 1,
                Token::Eof => break,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        while !matches!(self.current(), Token::Semicolon | Token::Eof) {
            self.advance();
        }
        if *self.current() == Token::Semicolon {
            self.advance();
        }
    }

    fn skip_until(&mut self, tokens: &[Token]) {
        while !tokens.contains(self.current()) && *self.current() != Token::Eof {
            if *self.current() == Token::LParen {
                self.skip_parenthesized();
            } else {
                self.advance();
            }
        }
    }
}
