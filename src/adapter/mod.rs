//! Schema-definition call surface and its SQLite normalization layer.
//!
//! Migrations talk to a backend through [`SchemaStatements`]. On SQLite the
//! backend is wrapped in a [`SqliteShim`], which rewrites PostgreSQL-only
//! types and options before delegating.

pub mod definition;
pub mod dialect;
pub mod normalize;
pub mod shim;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use definition::{
    ColumnDefinition, ColumnOptions, ColumnType, DefaultValue, IndexDefinition, IndexTarget,
    KeySpec, TableDefinition, TableOptions,
};
pub use dialect::{DialectError, SQLITE_ADAPTER, is_sqlite};
pub use shim::SqliteShim;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// No connection has been opened yet.
    #[error("no database connection established")]
    NotEstablished,

    #[error("connection error: {0}")]
    Other(String),
}

/// A live or pending database connection.
pub trait Connection {
    /// Name of the adapter behind this connection (`"sqlite3"`, `"postgresql"`).
    fn adapter_name(&self) -> Result<String, ConnectionError>;

    /// True when schema statements through this connection are already
    /// normalized for SQLite.
    fn normalizes_for_sqlite(&self) -> bool {
        false
    }
}

/// Schema-definition operations a migration issues.
pub trait SchemaStatements: Connection {
    type Error;

    fn add_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), Self::Error>;

    fn change_column(&mut self, table: &str, column: ColumnDefinition)
    -> Result<(), Self::Error>;

    fn create_table_definition(&mut self, table: TableDefinition) -> Result<(), Self::Error>;

    fn create_index(&mut self, table: &str, index: IndexDefinition) -> Result<(), Self::Error>;

    fn enable_extension(&mut self, name: &str) -> Result<(), Self::Error>;

    fn disable_extension(&mut self, name: &str) -> Result<(), Self::Error>;

    fn extension_enabled(&self, name: &str) -> Result<bool, Self::Error>;

    fn create_enum(&mut self, name: &str, values: &[String]) -> Result<(), Self::Error>;

    fn drop_enum(&mut self, name: &str) -> Result<(), Self::Error>;
}
