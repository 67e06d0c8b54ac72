//! Integration tests for pg-sqlite-shim
//!
//! These exercise the public API end to end: schema documents on disk,
//! migration directories through the linter, and a custom backend wrapped
//! in the SQLite shim.

use std::path::{Path, PathBuf};

use pg_sqlite_shim::adapter::{
    ColumnDefinition, ColumnOptions, ColumnType, ConnectionError, DefaultValue, IndexDefinition,
    KeySpec, TableDefinition, TableOptions,
};
use pg_sqlite_shim::config::DatabaseConfig;
use pg_sqlite_shim::lint::collect_migration_files;
use pg_sqlite_shim::{
    Config, Connection, MigrationLinter, SchemaStatements, SqliteShim, rewrite_schema,
    rewrite_schema_file,
};

const SCHEMA: &str = r#"ActiveRecord::Schema[7.2].define(version: 2024_03_05_101500) do
  enable_extension "pgcrypto"
  enable_extension "plpgsql"
  create_enum "account_status", ["ok", "error"]


  create_table "accounts", id: :uuid, default: -> { "gen_random_uuid()" }, force: :cascade do |t|
    t.string "name", null: false
    t.string "currency", default: "USD"
    t.jsonb "settings", default: {}
    t.decimal "balance", precision: 19, scale: 4
    t.index "lower((name)::text)", name: "index_accounts_on_lower_name", unique: true
  end

  create_table "merchants", id: :uuid, default: -> { "gen_random_uuid()" }, force: :cascade do |t|
    t.string "name", null: false
    t.string "type"
    t.uuid "family_id"
    t.virtual "classification", type: :string, as: "lower((type)::text)", stored: true
    t.datetime "deleted_at"
    t.index ["family_id", "name"], name: "index_merchants_on_family_id_and_name", unique: true, where: "((type)::text = 'FamilyMerchant'::text)"
    t.index ["deleted_at"], name: "index_merchants_on_deleted_at", where: "(deleted_at IS NULL)"
  end

  add_foreign_key "merchants", "accounts", column: "family_id"
end
"#;

// ===========================================================================
// Schema documents
// ===========================================================================

#[test]
fn test_schema_document_rewrite() {
    let rewritten = rewrite_schema(SCHEMA);

    assert!(!rewritten.contains("enable_extension"));
    assert!(!rewritten.contains("create_enum"));
    assert!(!rewritten.contains("gen_random_uuid"));
    assert!(!rewritten.contains("::text"));
    assert!(!rewritten.contains("t.virtual"));
    assert!(!rewritten.contains("\n\n\n"));

    assert!(rewritten.contains(r#"t.string "classification""#));
    assert!(rewritten.contains(r#"t.index "name", name: "index_accounts_on_lower_name", unique: true"#));
    assert!(rewritten.contains(r#"where: "type = 'FamilyMerchant'""#));
    assert!(rewritten.contains(r#"where: "DELETED_AT IS NULL""#));

    // Everything outside the targeted constructs is preserved.
    assert!(rewritten.contains(r#"t.decimal "balance", precision: 19, scale: 4"#));
    assert!(rewritten.contains(r#"add_foreign_key "merchants", "accounts", column: "family_id""#));
    assert!(rewritten.starts_with("ActiveRecord::Schema[7.2].define"));
}

#[test]
fn test_schema_document_second_pass_is_noop() {
    let once = rewrite_schema(SCHEMA);
    assert_eq!(rewrite_schema(&once), once);
}

#[test]
fn test_schema_file_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("db/schema.rb");
    let output = dir.path().join("db/sqlite_schema.rb");
    std::fs::create_dir_all(input.parent().unwrap()).expect("mkdir");
    std::fs::write(&input, SCHEMA).expect("write");

    rewrite_schema_file(&input, &output).expect("rewrite");
    let first = std::fs::read_to_string(&output).expect("read");

    rewrite_schema_file(&output, &output).expect("rewrite again");
    let second = std::fs::read_to_string(&output).expect("read");

    assert_eq!(first, second);
}

// ===========================================================================
// Linter
// ===========================================================================

fn write_migration(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write migration");
    path
}

#[test]
fn test_lint_migration_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let migrate = dir.path().join("db/migrate");
    std::fs::create_dir_all(&migrate).expect("mkdir");

    write_migration(
        &migrate,
        "20240101000000_create_resources.rb",
        "class CreateResources < ActiveRecord::Migration[7.2]\n  def change\n    create_table :resources do |t|\n      t.uuid :identifier\n      t.jsonb :metadata\n      t.string :tags, array: true\n    end\n  end\nend\n",
    );
    write_migration(
        &migrate,
        "20240102000000_add_mood.rb",
        "class AddMood < ActiveRecord::Migration[7.2]\n  def change\n    create_enum :mood, %w[happy sad]\n  end\nend\n",
    );
    write_migration(
        &migrate,
        "20240103000000_create_notes.rb",
        "class CreateNotes < ActiveRecord::Migration[7.2]\n  def change\n    create_table :notes, id: :string do |t|\n      t.text :body\n    end\n  end\nend\n",
    );
    write_migration(&migrate, "notes.txt", "t.uuid :ignored");

    let files =
        collect_migration_files(&[migrate.clone()], &["rb".to_string()]).expect("collect");
    assert_eq!(files.len(), 3);

    let violations = MigrationLinter::new(files)
        .with_root(dir.path())
        .violations()
        .expect("lint");

    let summary: Vec<(&str, &str)> = violations
        .iter()
        .map(|v| (v.file.as_str(), v.pattern.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("db/migrate/20240101000000_create_resources.rb", r"t\.uuid\b"),
            ("db/migrate/20240101000000_create_resources.rb", r"(?:\bt\.|:)jsonb\b"),
            ("db/migrate/20240101000000_create_resources.rb", r"array:\s*true"),
            ("db/migrate/20240102000000_add_mood.rb", r"create_enum\b"),
        ]
    );
}

// ===========================================================================
// Shim over a caller-provided backend
// ===========================================================================

/// Backend that renders every call as a line of pseudo-DDL.
struct LoggingBackend {
    adapter: Option<&'static str>,
    log: Vec<String>,
}

impl LoggingBackend {
    fn new(adapter: Option<&'static str>) -> Self {
        Self {
            adapter,
            log: vec![],
        }
    }
}

impl Connection for LoggingBackend {
    fn adapter_name(&self) -> Result<String, ConnectionError> {
        self.adapter
            .map(str::to_string)
            .ok_or(ConnectionError::NotEstablished)
    }
}

fn describe_column(column: &ColumnDefinition) -> String {
    let mut line = format!("{} {}", column.name, column.column_type);
    if column.options.array {
        line.push_str("[]");
    }
    if let Some(DefaultValue::Value(value)) = &column.options.default {
        line.push_str(&format!(" default {}", value));
    }
    line
}

impl SchemaStatements for LoggingBackend {
    type Error = std::io::Error;

    fn add_column(&mut self, table: &str, column: ColumnDefinition) -> std::io::Result<()> {
        self.log
            .push(format!("add_column {table} {}", describe_column(&column)));
        Ok(())
    }

    fn change_column(&mut self, table: &str, column: ColumnDefinition) -> std::io::Result<()> {
        self.log
            .push(format!("change_column {table} {}", describe_column(&column)));
        Ok(())
    }

    fn create_table_definition(&mut self, table: TableDefinition) -> std::io::Result<()> {
        let id = match &table.options.id {
            Some(KeySpec::Type(t)) => t.to_string(),
            _ => "default".to_string(),
        };
        let columns: Vec<String> = table.columns.iter().map(describe_column).collect();
        self.log.push(format!(
            "create_table {} id={} default={} ({})",
            table.name,
            id,
            table.options.default.is_some(),
            columns.join(", ")
        ));
        Ok(())
    }

    fn create_index(&mut self, table: &str, index: IndexDefinition) -> std::io::Result<()> {
        self.log.push(format!(
            "create_index {table} {:?} where {:?}",
            index.target, index.predicate
        ));
        Ok(())
    }

    fn enable_extension(&mut self, name: &str) -> std::io::Result<()> {
        self.log.push(format!("enable_extension {name}"));
        Ok(())
    }

    fn disable_extension(&mut self, name: &str) -> std::io::Result<()> {
        self.log.push(format!("disable_extension {name}"));
        Ok(())
    }

    fn extension_enabled(&self, _name: &str) -> std::io::Result<bool> {
        Ok(true)
    }

    fn create_enum(&mut self, name: &str, _values: &[String]) -> std::io::Result<()> {
        self.log.push(format!("create_enum {name}"));
        Ok(())
    }

    fn drop_enum(&mut self, name: &str) -> std::io::Result<()> {
        self.log.push(format!("drop_enum {name}"));
        Ok(())
    }
}

/// The migration from the linter fixture, issued through the call surface.
fn run_migration<S: SchemaStatements<Error = std::io::Error>>(conn: &mut S) {
    conn.enable_extension("pgcrypto").expect("enable_extension");

    let mut table = TableDefinition::new("resources").with_options(TableOptions {
        id: Some(KeySpec::Type(ColumnType::Uuid)),
        default: Some(DefaultValue::Function("gen_random_uuid()".to_string())),
        ..TableOptions::default()
    });
    table
        .uuid("identifier", ColumnOptions::default())
        .jsonb("metadata", ColumnOptions::default())
        .column(
            "tags",
            ColumnType::String,
            ColumnOptions::default().with_array(),
        );
    conn.create_table_definition(table).expect("create_table");

    conn.create_index(
        "resources",
        IndexDefinition::expression("lower((identifier)::text)")
            .with_predicate("(metadata IS NOT NULL)"),
    )
    .expect("create_index");
}

fn config_with_primary(adapter: &str) -> Config {
    let mut config = Config::default();
    config.databases.insert(
        "primary".to_string(),
        DatabaseConfig {
            adapter: adapter.to_string(),
        },
    );
    config
}

#[test]
fn test_shim_normalizes_migration_on_sqlite() {
    let mut shim = SqliteShim::install(LoggingBackend::new(Some("sqlite3")), &Config::default())
        .expect("install");
    run_migration(&mut shim);

    assert_eq!(
        shim.into_inner().log,
        vec![
            r#"create_table resources id=text default=false (identifier text, metadata text, tags text default "[]")"#.to_string(),
            r#"create_index resources Expression("identifier") where Some("METADATA IS NOT NULL")"#.to_string(),
        ]
    );
}

#[test]
fn test_shim_passes_through_on_postgres() {
    let mut shim = SqliteShim::install(
        LoggingBackend::new(Some("postgresql")),
        &config_with_primary("sqlite3"),
    )
    .expect("install");
    assert!(!shim.is_active());
    run_migration(&mut shim);

    let log = shim.into_inner().log;
    assert_eq!(log.len(), 3);
    assert_eq!(log[0], "enable_extension pgcrypto");
    assert!(log[1].contains("identifier uuid, metadata jsonb, tags string[]"));
    assert!(log[2].contains("lower((identifier)::text)"));
}

#[test]
fn test_shim_uses_configured_adapter_before_connecting() {
    let shim = SqliteShim::install(LoggingBackend::new(None), &config_with_primary("sqlite3"))
        .expect("install");
    assert!(shim.is_active());

    let shim = SqliteShim::install(LoggingBackend::new(None), &config_with_primary("postgresql"))
        .expect("install");
    assert!(!shim.is_active());
}
