//! Shared test helpers for adapter tests.

use super::{
    ColumnDefinition, Connection, ConnectionError, IndexDefinition, SchemaStatements,
    TableDefinition,
};

/// One call observed by [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    AddColumn(String, ColumnDefinition),
    ChangeColumn(String, ColumnDefinition),
    CreateTable(TableDefinition),
    CreateIndex(String, IndexDefinition),
    EnableExtension(String),
    DisableExtension(String),
    CreateEnum(String, Vec<String>),
    DropEnum(String),
}

/// Backend that records every schema call it receives.
pub struct RecordingBackend {
    adapter: Result<String, String>,
    connected: bool,
    /// When set, every schema call fails with this message.
    pub fail_with: Option<String>,
    pub calls: Vec<Call>,
}

impl RecordingBackend {
    fn with_adapter(adapter: &str) -> Self {
        Self {
            adapter: Ok(adapter.to_string()),
            connected: true,
            fail_with: None,
            calls: vec![],
        }
    }

    pub fn sqlite() -> Self {
        Self::with_adapter("sqlite3")
    }

    pub fn postgres() -> Self {
        Self::with_adapter("postgresql")
    }

    /// No connection opened yet.
    pub fn unconnected() -> Self {
        Self {
            connected: false,
            ..Self::sqlite()
        }
    }

    /// Connection lookup fails for a reason other than "not established".
    pub fn broken(message: &str) -> Self {
        Self {
            adapter: Err(message.to_string()),
            ..Self::sqlite()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::sqlite()
        }
    }

    fn record(&mut self, call: Call) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        self.calls.push(call);
        Ok(())
    }
}

impl Connection for RecordingBackend {
    fn adapter_name(&self) -> Result<String, ConnectionError> {
        if !self.connected {
            return Err(ConnectionError::NotEstablished);
        }
        self.adapter.clone().map_err(ConnectionError::Other)
    }
}

impl SchemaStatements for RecordingBackend {
    type Error = String;

    fn add_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), String> {
        self.record(Call::AddColumn(table.to_string(), column))
    }

    fn change_column(&mut self, table: &str, column: ColumnDefinition) -> Result<(), String> {
        self.record(Call::ChangeColumn(table.to_string(), column))
    }

    fn create_table_definition(&mut self, table: TableDefinition) -> Result<(), String> {
        self.record(Call::CreateTable(table))
    }

    fn create_index(&mut self, table: &str, index: IndexDefinition) -> Result<(), String> {
        self.record(Call::CreateIndex(table.to_string(), index))
    }

    fn enable_extension(&mut self, name: &str) -> Result<(), String> {
        self.record(Call::EnableExtension(name.to_string()))
    }

    fn disable_extension(&mut self, name: &str) -> Result<(), String> {
        self.record(Call::DisableExtension(name.to_string()))
    }

    fn extension_enabled(&self, _name: &str) -> Result<bool, String> {
        match &self.fail_with {
            Some(message) => Err(message.clone()),
            None => Ok(true),
        }
    }

    fn create_enum(&mut self, name: &str, values: &[String]) -> Result<(), String> {
        self.record(Call::CreateEnum(name.to_string(), values.to_vec()))
    }

    fn drop_enum(&mut self, name: &str) -> Result<(), String> {
        self.record(Call::DropEnum(name.to_string()))
    }
}
