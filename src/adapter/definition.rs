//! Column, table and index declarations passed through the schema-definition
//! call surface.
//!
//! These mirror what a migration hands to the execution engine: a column is a
//! name, a declared type and an option map; a table adds its identity strategy
//! and indexes.

use std::fmt;

use serde_json::Value;
use tracing::debug;

/// Declared column type, spanning both dialects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnType {
    String,
    Text,
    Integer,
    Bigint,
    Float,
    Decimal,
    Boolean,
    Date,
    Datetime,
    Timestamp,
    Time,
    Binary,
    Json,
    Jsonb,
    Uuid,
    /// Any type this crate has no special handling for.
    Other(String),
}

impl ColumnType {
    pub fn as_str(&self) -> &str {
        match self {
            ColumnType::String => "string",
            ColumnType::Text => "text",
            ColumnType::Integer => "integer",
            ColumnType::Bigint => "bigint",
            ColumnType::Float => "float",
            ColumnType::Decimal => "decimal",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Datetime => "datetime",
            ColumnType::Timestamp => "timestamp",
            ColumnType::Time => "time",
            ColumnType::Binary => "binary",
            ColumnType::Json => "json",
            ColumnType::Jsonb => "jsonb",
            ColumnType::Uuid => "uuid",
            ColumnType::Other(name) => name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column default.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal written into the schema.
    Value(Value),
    /// A server-side function evaluated per row (`-> { "now()" }`).
    Function(String),
}

impl DefaultValue {
    /// True for anything that calls PostgreSQL's random UUID generator.
    pub fn mentions_random_uuid(&self) -> bool {
        match self {
            DefaultValue::Function(sql) => sql.contains("gen_random_uuid"),
            DefaultValue::Value(Value::String(s)) => s.contains("gen_random_uuid"),
            DefaultValue::Value(_) => false,
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::Value(Value::String(value.to_string()))
    }
}

/// Per-column options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnOptions {
    pub null: Option<bool>,
    pub default: Option<DefaultValue>,
    pub limit: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    /// `array: true` in PostgreSQL migrations.
    pub array: bool,
    /// Expression of a generated column.
    pub generated_as: Option<String>,
    /// Whether a generated column is stored rather than virtual.
    pub stored: Option<bool>,
    pub comment: Option<String>,
}

impl ColumnOptions {
    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_array(mut self) -> Self {
        self.array = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.null = Some(false);
        self
    }

    pub fn generated(mut self, expression: &str, stored: bool) -> Self {
        self.generated_as = Some(expression.to_string());
        self.stored = Some(stored);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub column_type: ColumnType,
    pub options: ColumnOptions,
}

impl ColumnDefinition {
    pub fn new(name: &str, column_type: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            column_type,
            options: ColumnOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ColumnOptions) -> Self {
        self.options = options;
        self
    }
}

/// Identity or primary-key strategy of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySpec {
    /// Key column of the given type (`id: :uuid`, `id: :bigint`).
    Type(ColumnType),
    /// Custom key column name (`primary_key: "code"`).
    Column(String),
    /// Multi-column key.
    Composite(Vec<KeySpec>),
    /// No key (`id: false`).
    Disabled,
}

impl KeySpec {
    /// True when this key, or any part of a composite, is uuid-typed.
    pub fn is_uuid(&self) -> bool {
        match self {
            KeySpec::Type(ColumnType::Uuid) => true,
            KeySpec::Composite(parts) => parts.iter().any(KeySpec::is_uuid),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableOptions {
    pub id: Option<KeySpec>,
    pub primary_key: Option<KeySpec>,
    /// Default of the identity column.
    pub default: Option<DefaultValue>,
    pub temporary: bool,
    pub if_not_exists: bool,
    pub force: bool,
}

/// What an index covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexTarget {
    Columns(Vec<String>),
    /// Raw expression such as `lower((email)::text)`.
    Expression(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDefinition {
    pub target: IndexTarget,
    pub unique: bool,
    /// Partial-index predicate (`where:`).
    pub predicate: Option<String>,
    pub name: Option<String>,
}

impl IndexDefinition {
    pub fn columns(columns: &[&str]) -> Self {
        Self {
            target: IndexTarget::Columns(columns.iter().map(|c| c.to_string()).collect()),
            unique: false,
            predicate: None,
            name: None,
        }
    }

    pub fn expression(expression: &str) -> Self {
        Self {
            target: IndexTarget::Expression(expression.to_string()),
            unique: false,
            predicate: None,
            name: None,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn named(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn with_predicate(mut self, predicate: &str) -> Self {
        self.predicate = Some(predicate.to_string());
        self
    }
}

/// A `create_table` request: options, columns in declaration order, and the
/// indexes declared inside the block.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub options: TableOptions,
    pub columns: Vec<ColumnDefinition>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: TableOptions::default(),
            columns: vec![],
            indexes: vec![],
        }
    }

    pub fn with_options(mut self, options: TableOptions) -> Self {
        self.options = options;
        self
    }

    /// Add a column of any type.
    pub fn column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        options: ColumnOptions,
    ) -> &mut Self {
        self.columns
            .push(ColumnDefinition::new(name, column_type).with_options(options));
        self
    }

    /// Add a unique-identifier column. Stored as text on SQLite.
    pub fn uuid(&mut self, name: &str, options: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Uuid, options)
    }

    /// Add a JSON document column. Stored as text on SQLite.
    pub fn jsonb(&mut self, name: &str, options: ColumnOptions) -> &mut Self {
        self.column(name, ColumnType::Jsonb, options)
    }

    /// Add a generated column.
    ///
    /// Always degrades to an ordinary column of `column_type`: the expression
    /// and the stored flag are discarded and populating the column is up to
    /// the caller.
    pub fn virtual_column(
        &mut self,
        name: &str,
        column_type: ColumnType,
        expression: &str,
        stored: bool,
        mut options: ColumnOptions,
    ) -> &mut Self {
        debug!(column = name, expression, stored, "declaring generated column as plain column");
        options.generated_as = None;
        options.stored = None;
        self.column(name, column_type, options)
    }

    /// Declare an index inside the table block.
    pub fn index(&mut self, index: IndexDefinition) -> &mut Self {
        self.indexes.push(index);
        self
    }
}
