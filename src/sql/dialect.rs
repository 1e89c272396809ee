//! SQL dialect detection and per-dialect naming defaults.

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// Auto-detect from dump content
    #[default]
    Auto,
    /// Standard SQL
    Generic,
    /// PostgreSQL
    PostgreSQL,
    /// MySQL
    MySQL,
}

// Dump headers are checked for both dialects before any type keyword.
const POSTGRES_HEADERS: &[&str] = &["postgresql database dump", "pg_dump", "-- postgres"];
const MYSQL_HEADERS: &[&str] = &["mysql dump", "mysqldump", "-- mysql"];

const POSTGRES_KEYWORDS: &[&str] = &["alter table only", "set search_path", "timestamptz", "serial"];
const MYSQL_KEYWORDS: &[&str] = &["auto_increment", "engine=", "`"];

impl Dialect {
    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "generic" => Some(Self::Generic),
            "postgres" | "postgresql" => Some(Self::PostgreSQL),
            "mysql" | "mariadb" => Some(Self::MySQL),
            _ => None,
        }
    }

    /// Detect dialect from dump content.
    pub fn detect(content: &str) -> Self {
        let lower = content.to_lowercase();
        let found = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if found(POSTGRES_HEADERS) {
            Self::PostgreSQL
        } else if found(MYSQL_HEADERS) {
            Self::MySQL
        } else if found(POSTGRES_KEYWORDS) {
            Self::PostgreSQL
        } else if found(MYSQL_KEYWORDS) {
            Self::MySQL
        } else {
            Self::Generic
        }
    }

    /// Resolve Auto to a concrete dialect.
    pub fn resolve(self, content: &str) -> Self {
        match self {
            Self::Auto => Self::detect(content),
            other => other,
        }
    }

    /// Schema assumed for unqualified names when the dump qualifies others.
    pub fn default_schema(self) -> Option<&'static str> {
        match self {
            Self::PostgreSQL => Some("public"),
            _ => None,
        }
    }
}
