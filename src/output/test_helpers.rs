//! Shared test helpers for output module tests.

use crate::lint::{MigrationLinter, Violation};

/// Violations for a migration declaring a uuid column and an array column.
pub fn test_violations() -> Vec<Violation> {
    MigrationLinter::inspect_source(
        "db/migrate/20240101000000_create_resources.rb",
        "create_table :resources do |t|\n  t.uuid :identifier\n  t.string :tags, array: true\nend\n",
    )
}

/// Render a reporter's output into a string.
pub fn render(reporter: &dyn crate::output::Reporter, violations: &[Violation]) -> String {
    let mut buf = Vec::new();
    reporter.emit(violations, &mut buf).expect("emit");
    String::from_utf8(buf).expect("utf-8 output")
}
