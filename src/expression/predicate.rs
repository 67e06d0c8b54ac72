//! Partial-index predicate translation
//!
//! Recognizes the two predicate shapes that show up in practically every
//! partial index (`column = 'literal'` and `column IS [NOT] NULL`) and
//! re-renders them in a dialect-neutral form. Anything else passes through
//! in canonical form with no equivalence guarantee.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::canonicalize;

static EQUALITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^"?([a-zA-Z0-9_.]+)"?\s*=\s*'?([^']+)'?$"#).expect("valid equality pattern")
});

static NULL_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^"?([a-zA-Z0-9_.]+)"?\s+IS\s+(NOT\s+)?NULL$"#)
        .expect("valid null-check pattern")
});

/// Classification of a canonical predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column = 'literal'`, with dialect quoting removed.
    Equality { column: String, literal: String },
    /// `column IS NULL` / `column IS NOT NULL`.
    NullCheck { column: String, negated: bool },
    /// Any other shape, kept verbatim.
    Unrecognized(String),
}

impl Predicate {
    /// Render the predicate for the target dialect.
    ///
    /// Null checks come out fully upper-cased, column included:
    /// `deleted_at IS NULL` renders as `DELETED_AT IS NULL`. Column names in
    /// SQLite are case-insensitive so the index still applies, but the output
    /// differs from the input spelling.
    pub fn render(&self) -> String {
        match self {
            Predicate::Equality { column, literal } => format!("{} = '{}'", column, literal),
            Predicate::NullCheck { column, negated } => {
                let not = if *negated { "NOT " } else { "" };
                format!("{} IS {}NULL", column, not).to_uppercase()
            }
            Predicate::Unrecognized(text) => text.clone(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Classify an already-canonical predicate.
pub fn classify(canonical: &str) -> Predicate {
    if let Some(caps) = EQUALITY.captures(canonical) {
        return Predicate::Equality {
            column: caps[1].to_string(),
            literal: caps[2].to_string(),
        };
    }

    if let Some(caps) = NULL_CHECK.captures(canonical) {
        return Predicate::NullCheck {
            column: caps[1].to_string(),
            negated: caps.get(2).is_some(),
        };
    }

    Predicate::Unrecognized(canonical.to_string())
}

/// Canonicalize and translate a partial-index predicate.
///
/// Returns `None` when nothing usable is left after canonicalization. The
/// caller must then drop the predicate clause altogether instead of
/// inventing a replacement.
pub fn translate_predicate(expr: &str) -> Option<String> {
    let canonical = canonicalize(expr);
    if canonical.trim().is_empty() {
        return None;
    }
    Some(classify(&canonical).render())
}
