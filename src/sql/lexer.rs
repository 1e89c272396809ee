//! SQL lexer for the DDL statements that declare keys.

use std::iter::Peekable;
use std::str::Chars;

/// SQL token types.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords
    Create,
    Alter,
    Add,
    Table,
    Only,
    Primary,
    Key,
    Foreign,
    References,
    Constraint,
    Not,
    If,
    Exists,
    On,
    Check,

    // Identifiers and literals
    Ident(String),
    Str(String),
    Num(String),

    // Symbols
    LParen,
    RParen,
    Comma,
    Semicolon,
    Dot,

    // End of input
    Eof,
}

/// SQL lexer.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    current_char: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut chars = input.chars().peekable();
        let current_char = chars.next();
        Self { chars, current_char }
    }

    fn advance(&mut self) {
        self.current_char = self.chars.next();
    }

    fn peek(&mut self) -> Option<&char> {
        self.chars.peek()
    }

    fn skip_whitespace(&mut self) {
        while self.current_char.is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.current_char {
            self.advance();
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        // current_char is the opening '*'
        self.advance();
        while let Some(c) = self.current_char {
            self.advance();
            if c == '*' && self.current_char == Some('/') {
                self.advance();
                break;
            }
        }
    }

    fn read_while(&mut self, keep: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.current_char {
            if !keep(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
        out
    }

    /// Read up to `close`; a doubled `close` is an escaped literal character.
    fn read_delimited(&mut self, close: char) -> String {
        self.advance(); // opening delimiter
        let mut out = String::new();
        while let Some(c) = self.current_char {
            if c == close {
                if close != ']' && self.peek() == Some(&close) {
                    out.push(c);
                    self.advance();
                    self.advance();
                    continue;
                }
                self.advance();
                break;
            }
            if c == '\\' && close == '\'' {
                self.advance();
                if let Some(escaped) = self.current_char {
                    out.push(escaped);
                    self.advance();
                }
                continue;
            }
            out.push(c);
            self.advance();
        }
        out
    }

    /// `$tag$ ... $tag$` body, or `None` for a positional parameter like `$1`.
    fn read_dollar_quoted(&mut self) -> Option<String> {
        self.advance(); // opening '$'
        let tag = self.read_while(|c| c.is_alphanumeric() || c == '_');
        if self.current_char != Some('$') || tag.starts_with(|c: char| c.is_ascii_digit()) {
            return None;
        }
        self.advance();

        let close = format!("${tag}$");
        let mut out = String::new();
        while let Some(c) = self.current_char {
            out.push(c);
            self.advance();
            if out.ends_with(&close) {
                out.truncate(out.len() - close.len());
                break;
            }
        }
        Some(out)
    }

    /// Bare identifiers fold to lower case; quoted ones never reach here.
    fn keyword_or_ident(s: String) -> Token {
        match s.to_uppercase().as_str() {
            "CREATE" => Token::Create,
            "ALTER" => Token::Alter,
            "ADD" => Token::Add,
            "TABLE" => Token::Table,
            "ONLY" => Token::Only,
            "PRIMARY" => Token::Primary,
            "KEY" => Token::Key,
            "FOREIGN" => Token::Foreign,
            "REFERENCES" => Token::References,
            "CONSTRAINT" => Token::Constraint,
            "NOT" => Token::Not,
            "IF" => Token::If,
            "EXISTS" => Token::Exists,
            "ON" => Token::On,
            "CHECK" => Token::Check,
            _ => Token::Ident(s.to_lowercase()),
        }
    }

    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_whitespace();

            let Some(c) = self.current_char else {
                return Token::Eof;
            };

            let single = match c {
                '(' => Some(Token::LParen),
                ')' => Some(Token::RParen),
                ',' => Some(Token::Comma),
                ';' => Some(Token::Semicolon),
                '.' => Some(Token::Dot),
                _ => None,
            };
            if let Some(token) = single {
                self.advance();
                return token;
            }

            let next = self.peek().copied();
            match c {
                '-' if next == Some('-') => self.skip_line_comment(),
                '#' => self.skip_line_comment(),
                '/' if next == Some('*') => {
                    self.advance();
                    self.skip_block_comment();
                }
                // Quoted identifiers keep their exact spelling.
                '"' => return Token::Ident(self.read_delimited('"')),
                '`' => return Token::Ident(self.read_delimited('`')),
                '[' => return Token::Ident(self.read_delimited(']')),
                '\'' => return Token::Str(self.read_delimited('\'')),
                '$' => {
                    if let Some(body) = self.read_dollar_quoted() {
                        return Token::Str(body);
                    }
                }
                c if c.is_ascii_digit() => {
                    return Token::Num(self.read_while(|c| c.is_ascii_digit() || c == '.'));
                }
                c if c.is_alphabetic() || c == '_' => {
                    let word = self.read_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
                    return Self::keyword_or_ident(word);
                }
                // Operators and anything else carry no key information.
                _ => self.advance(),
            }
        }
    }

    /// Collect all tokens, ending with `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token == Token::Eof;
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }
}
