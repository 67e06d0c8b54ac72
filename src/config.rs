//! Configuration file parsing
//!
//! Reads pg-sqlite-shim.toml configuration files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

use crate::output::OutputFormat;

/// Name of the database entry consulted when no connection is available.
pub const PRIMARY_DATABASE: &str = "primary";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Validation(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Declared database connections, keyed by name (`primary`, ...).
    #[serde(default)]
    pub databases: BTreeMap<String, DatabaseConfig>,

    #[serde(default)]
    pub schema: SchemaConfig,

    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Adapter name, e.g. "postgresql" or "sqlite3"
    pub adapter: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchemaConfig {
    /// PostgreSQL schema dump to read
    #[serde(default = "default_schema_input")]
    pub input: PathBuf,

    /// Where the SQLite-loadable schema is written
    #[serde(default = "default_schema_output")]
    pub output: PathBuf,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            input: default_schema_input(),
            output: default_schema_output(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LintConfig {
    /// Migration files or directories to scan
    #[serde(default = "default_lint_paths")]
    pub paths: Vec<PathBuf>,

    /// File extensions picked up when scanning directories
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Violations are reported relative to this directory
    pub root: Option<PathBuf>,
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            paths: default_lint_paths(),
            extensions: default_extensions(),
            root: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Report format: "text" or "json"
    #[serde(default = "default_format")]
    pub format: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
        }
    }
}

fn default_schema_input() -> PathBuf {
    PathBuf::from("db/schema.rb")
}

fn default_schema_output() -> PathBuf {
    PathBuf::from("db/sqlite_schema.rb")
}

fn default_lint_paths() -> Vec<PathBuf> {
    vec![PathBuf::from("db/migrate")]
}

fn default_extensions() -> Vec<String> {
    vec!["rb".to_string()]
}

fn default_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Adapter declared for the primary database, if any.
    pub fn primary_adapter(&self) -> Option<&str> {
        self.databases
            .get(PRIMARY_DATABASE)
            .map(|db| db.adapter.as_str())
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigError> {
        if OutputFormat::parse(&self.output.format).is_none() {
            return Err(ConfigError::Validation(format!(
                "invalid output format '{}'. Valid values: text, json",
                self.output.format
            )));
        }
        if self.lint.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "lint.extensions must list at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}
