//! pg-sqlite-shim: run a PostgreSQL-first Rails schema on SQLite
//!
//! This library rewrites PostgreSQL schema dumps so SQLite can load them,
//! normalizes schema-definition calls issued by migrations through a
//! decorator over the backend, and lints migration sources for constructs
//! that would not survive the switch.

pub mod adapter;
pub mod config;
pub mod expression;
pub mod lint;
pub mod output;
pub mod schema;

// Re-export commonly used types
pub use adapter::{Connection, SchemaStatements, SqliteShim, is_sqlite};
pub use config::Config;
pub use expression::{canonicalize, translate_predicate};
pub use lint::{MigrationLinter, Violation};
pub use schema::{rewrite_schema, rewrite_schema_file};
