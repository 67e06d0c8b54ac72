//! Option normalization for SQLite.
//!
//! Pure functions mapping PostgreSQL-only column types and options onto ones
//! SQLite accepts. [`SqliteShim`](super::SqliteShim) calls them before
//! delegating; they never look at the connection themselves.

use serde_json::Value;
use tracing::debug;

use super::definition::{
    ColumnDefinition, ColumnOptions, ColumnType, DefaultValue, IndexDefinition, IndexTarget,
    KeySpec, TableDefinition, TableOptions,
};
use crate::expression::{canonicalize, translate_predicate};

/// Normalize one column declaration.
///
/// - `jsonb`/`json` become `text`; object and array defaults are serialized
///   to JSON text, once, even when the column is also an array.
/// - `uuid` becomes `text`; `limit` is dropped, and so is any callable default
///   or default mentioning `gen_random_uuid`.
/// - `array: true` becomes a single `text` column whose default is the JSON
///   text of the default array (`[]` when there is none).
/// - Generated-column options are discarded.
pub fn normalize_column(column: ColumnDefinition) -> ColumnDefinition {
    let ColumnDefinition {
        name,
        column_type,
        options,
    } = column;
    let (column_type, options) = normalize_type_and_options(&name, column_type, options);
    ColumnDefinition {
        name,
        column_type,
        options,
    }
}

fn normalize_type_and_options(
    name: &str,
    mut column_type: ColumnType,
    mut options: ColumnOptions,
) -> (ColumnType, ColumnOptions) {
    if matches!(column_type, ColumnType::Jsonb | ColumnType::Json) {
        debug!(column = name, from = %column_type, "storing JSON document column as text");
        column_type = ColumnType::Text;
        // Array columns serialize their whole default below.
        let serialized = match &options.default {
            Some(DefaultValue::Value(value @ (Value::Object(_) | Value::Array(_))))
                if !options.array =>
            {
                Some(value.to_string())
            }
            _ => None,
        };
        if let Some(json) = serialized {
            options.default = Some(DefaultValue::Value(Value::String(json)));
        }
    }

    if column_type == ColumnType::Uuid {
        debug!(column = name, "storing uuid column as text");
        column_type = ColumnType::Text;
        options.limit = None;
        if options
            .default
            .as_ref()
            .is_some_and(|d| matches!(d, DefaultValue::Function(_)) || d.mentions_random_uuid())
        {
            options.default = None;
        }
    }

    if options.array {
        debug!(column = name, of = %column_type, "storing array column as JSON text");
        let items = match options.default.take() {
            None | Some(DefaultValue::Value(Value::Null)) | Some(DefaultValue::Function(_)) => {
                vec![]
            }
            Some(DefaultValue::Value(Value::Array(items))) => items,
            Some(DefaultValue::Value(other)) => vec![other],
        };
        options.array = false;
        options.default = Some(DefaultValue::Value(Value::String(
            Value::Array(items).to_string(),
        )));
        column_type = ColumnType::Text;
    }

    if options.generated_as.is_some() || options.stored.is_some() {
        debug!(column = name, "discarding generated column expression");
        options.generated_as = None;
        options.stored = None;
    }

    (column_type, options)
}

/// Rewrite uuid key types to text, recursing into composite keys.
pub fn normalize_key_spec(spec: KeySpec) -> KeySpec {
    match spec {
        KeySpec::Type(ColumnType::Uuid) => KeySpec::Type(ColumnType::Text),
        KeySpec::Composite(parts) => {
            KeySpec::Composite(parts.into_iter().map(normalize_key_spec).collect())
        }
        other => other,
    }
}

/// Normalize `create_table` options.
///
/// A uuid identity loses its server-generated default along with its type.
pub fn normalize_table_options(options: TableOptions) -> TableOptions {
    let uuid_keyed = options.id.as_ref().is_some_and(KeySpec::is_uuid)
        || options.primary_key.as_ref().is_some_and(KeySpec::is_uuid);

    let default = match options.default {
        Some(DefaultValue::Function(_)) if uuid_keyed => None,
        Some(d) if uuid_keyed && d.mentions_random_uuid() => None,
        other => other,
    };

    TableOptions {
        id: options.id.map(normalize_key_spec),
        primary_key: options.primary_key.map(normalize_key_spec),
        default,
        ..options
    }
}

/// Canonicalize an expression target and translate the partial predicate.
/// A predicate with nothing usable left is removed.
pub fn normalize_index(index: IndexDefinition) -> IndexDefinition {
    let target = match index.target {
        IndexTarget::Expression(expr) => IndexTarget::Expression(canonicalize(&expr)),
        columns => columns,
    };
    let predicate = index.predicate.as_deref().and_then(translate_predicate);
    if index.predicate.is_some() && predicate.is_none() {
        debug!(name = ?index.name, "dropping empty partial-index predicate");
    }

    IndexDefinition {
        target,
        predicate,
        ..index
    }
}

/// Normalize a whole table: options, every column (count and order kept) and
/// every index.
pub fn normalize_table(table: TableDefinition) -> TableDefinition {
    TableDefinition {
        name: table.name,
        options: normalize_table_options(table.options),
        columns: table.columns.into_iter().map(normalize_column).collect(),
        indexes: table.indexes.into_iter().map(normalize_index).collect(),
    }
}
