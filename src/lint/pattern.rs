//! Forbidden migration constructs.

use std::sync::LazyLock;

use regex::Regex;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

/// A PostgreSQL-only construct that must not appear in migrations meant to
/// run on SQLite. Variants are checked in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Pattern {
    UuidColumn,
    JsonbColumn,
    ArrayColumn,
    EnableExtension,
    CreateEnum,
}

static COMPILED: LazyLock<Vec<(Pattern, Regex)>> = LazyLock::new(|| {
    Pattern::iter()
        .map(|p| (p, Regex::new(p.source()).expect("valid lint pattern")))
        .collect()
});

impl Pattern {
    /// Regex source, reported alongside each violation.
    pub fn source(self) -> &'static str {
        match self {
            Pattern::UuidColumn => r"t\.uuid\b",
            Pattern::JsonbColumn => r"(?:\bt\.|:)jsonb\b",
            Pattern::ArrayColumn => r"array:\s*true",
            Pattern::EnableExtension => r"enable_extension\b",
            Pattern::CreateEnum => r"create_enum\b",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Pattern::UuidColumn => {
                "Avoid `t.uuid`; declare the column as `t.string` so it loads on SQLite."
            }
            Pattern::JsonbColumn => {
                "SQLite has no `jsonb` type; store the document in a serialized text column."
            }
            Pattern::ArrayColumn => {
                "Array columns are not supported; use a join table or a serialized array."
            }
            Pattern::EnableExtension => "Extensions only exist on PostgreSQL.",
            Pattern::CreateEnum => {
                "Enum types only exist on PostgreSQL; use a check constraint or a plain string."
            }
        }
    }

    /// True when `content` contains this construct anywhere.
    pub fn is_match(self, content: &str) -> bool {
        COMPILED
            .iter()
            .find(|(p, _)| *p == self)
            .is_some_and(|(_, re)| re.is_match(content))
    }

    /// All patterns found in `content`, in declaration order.
    pub fn find_all(content: &str) -> Vec<Pattern> {
        COMPILED
            .iter()
            .filter(|(_, re)| re.is_match(content))
            .map(|(p, _)| *p)
            .collect()
    }
}
