//! SQLite normalization decorator.

use tracing::{debug, info};

use super::dialect::{DialectError, is_sqlite};
use super::normalize::{normalize_column, normalize_index, normalize_table};
use super::{
    ColumnDefinition, Connection, ConnectionError, IndexDefinition, SchemaStatements,
    TableDefinition,
};
use crate::config::Config;

/// Wraps a backend and rewrites PostgreSQL-only schema statements so they
/// load on SQLite.
///
/// Whether the shim is active is decided once, at [`SqliteShim::install`].
/// An inactive shim forwards every call untouched.
pub struct SqliteShim<B> {
    inner: B,
    active: bool,
}

impl<B: SchemaStatements> SqliteShim<B> {
    /// Wrap `inner`, activating normalization when it targets SQLite.
    ///
    /// Wrapping a backend that already normalizes yields an inert shim.
    pub fn install(inner: B, config: &Config) -> Result<Self, DialectError> {
        let active = if inner.normalizes_for_sqlite() {
            debug!("backend already normalizes for SQLite, installing inert shim");
            false
        } else {
            is_sqlite(&inner, config)?
        };
        info!(active, "installed SQLite schema shim");
        Ok(Self { inner, active })
    }
}

impl<B> SqliteShim<B> {
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    pub fn into_inner(self) -> B {
        self.inner
    }
}

impl<B: Connection> Connection for SqliteShim<B> {
    fn adapter_name(&self) -> Result<String, ConnectionError> {
        self.inner.adapter_name()
    }

    fn normalizes_for_sqlite(&self) -> bool {
        self.active || self.inner.normalizes_for_sqlite()
    }
}

impl<B: SchemaStatements> SchemaStatements for SqliteShim<B> {
    type Error = B::Error;

    fn add_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), B::Error> {
        let column = if self.active {
            normalize_column(column)
        } else {
            column
        };
        self.inner.add_column(table, column)
    }

    fn change_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), B::Error> {
        let column = if self.active {
            normalize_column(column)
        } else {
            column
        };
        self.inner.change_column(table, column)
    }

    fn create_table_definition(&mut self, table: TableDefinition) -> Result<(), B::Error> {
        let table = if self.active {
            normalize_table(table)
        } else {
            table
        };
        self.inner.create_table_definition(table)
    }

    fn create_index(&mut self, table: &str, index: IndexDefinition) -> Result<(), B::Error> {
        let index = if self.active {
            normalize_index(index)
        } else {
            index
        };
        self.inner.create_index(table, index)
    }

    fn enable_extension(&mut self, name: &str) -> Result<(), B::Error> {
        if self.active {
            debug!(extension = name, "skipping enable_extension");
            return Ok(());
        }
        self.inner.enable_extension(name)
    }

    fn disable_extension(&mut self, name: &str) -> Result<(), B::Error> {
        if self.active {
            debug!(extension = name, "skipping disable_extension");
            return Ok(());
        }
        self.inner.disable_extension(name)
    }

    fn extension_enabled(&self, name: &str) -> Result<bool, B::Error> {
        if self.active {
            return Ok(false);
        }
        self.inner.extension_enabled(name)
    }

    fn create_enum(&mut self, name: &str, values: &[String]) -> Result<(), B::Error> {
        if self.active {
            debug!(enum_type = name, "skipping create_enum");
            return Ok(());
        }
        self.inner.create_enum(name, values)
    }

    fn drop_enum(&mut self, name: &str) -> Result<(), B::Error> {
        if self.active {
            debug!(enum_type = name, "skipping drop_enum");
            return Ok(());
        }
        self.inner.drop_enum(name)
    }
}
