//! Run configuration: environment defaults, overridden by command-line flags.

use crate::render::OutputFormat;
use crate::sql::Dialect;
use std::env;
use thiserror::Error;

pub const ENV_DIALECT: &str = "FKPATH_DIALECT";
pub const ENV_DEFAULT_SCHEMA: &str = "FKPATH_DEFAULT_SCHEMA";
pub const ENV_FORMAT: &str = "FKPATH_FORMAT";
pub const ENV_MAX_LENGTH: &str = "FKPATH_MAX_LENGTH";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub dialect: Dialect,
    /// Schema for bare table names in a qualified dump; `None` uses the dialect's.
    pub default_schema: Option<String>,
    pub format: OutputFormat,
    /// Longest join path explored, in foreign keys.
    pub max_length: Option<usize>,
    /// Skip malformed foreign keys instead of failing.
    pub skip_invalid: bool,
}

/// Values given on the command line; `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub dialect: Option<String>,
    pub default_schema: Option<String>,
    pub format: Option<String>,
    pub max_length: Option<usize>,
    pub skip_invalid: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from a key lookup, e.g. the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_DIALECT) {
            config.dialect = parse_dialect(&value)?;
        }
        if let Some(value) = lookup(ENV_DEFAULT_SCHEMA).filter(|v| !v.is_empty()) {
            config.default_schema = Some(value);
        }
        if let Some(value) = lookup(ENV_FORMAT) {
            config.format = parse_format(&value)?;
        }
        if let Some(value) = lookup(ENV_MAX_LENGTH) {
            config.max_length = Some(parse_max_length(&value)?);
        }

        Ok(config)
    }

    /// Apply command-line values on top of this configuration.
    pub fn merge(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(value) = overrides.dialect {
            self.dialect = parse_dialect(&value)?;
        }
        if let Some(value) = overrides.default_schema {
            self.default_schema = Some(value);
        }
        if let Some(value) = overrides.format {
            self.format = parse_format(&value)?;
        }
        if let Some(value) = overrides.max_length {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "max length",
                    value: value.to_string(),
                });
            }
            self.max_length = Some(value);
        }
        self.skip_invalid |= overrides.skip_invalid;
        Ok(self)
    }
}

fn parse_dialect(value: &str) -> Result<Dialect, ConfigError> {
    Dialect::from_str(value).ok_or_else(|| ConfigError::InvalidValue {
        field: "dialect",
        value: value.to_string(),
    })
}

fn parse_format(value: &str) -> Result<OutputFormat, ConfigError> {
    OutputFormat::from_str(value).ok_or_else(|| ConfigError::InvalidValue {
        field: "format",
        value: value.to_string(),
    })
}

fn parse_max_length(value: &str) -> Result<usize, ConfigError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidValue {
            field: "max length",
            value: value.to_string(),
        }),
    }
}
