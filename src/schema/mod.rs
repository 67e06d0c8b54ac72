//! Schema document rewriting
//!
//! Turns a PostgreSQL schema dump (the declarative `create_table` / `t.index`
//! mini-language) into a document SQLite can load. The rewrite is purely
//! textual: each [`RewriteStep`] matches one construct and replaces it, and
//! everything the steps do not match passes through byte for byte.
//!
//! No validation is performed. A region the steps do not recognize can still
//! fail to load later; reporting that is the loader's job.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};
use thiserror::Error;
use tracing::{debug, warn};

use crate::expression::{
    CAST_MODIFIERS, CAST_TYPES, canonicalize, strip_cast_calls, translate_predicate,
};

/// Body of a double-quoted string that may contain `\"` escapes.
const QUOTED_BODY: &str = r#"((?:[^"\\]|\\.)*)"#;

static EXTENSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*enable_extension[ \t]+"[^"\n]+"[ \t]*(?:\r?\n|\z)"#)
        .expect("valid extension pattern")
});

static ENUM_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^[ \t]*create_enum[ \t]+(?:"[^"\n]*"|:\w+)[ \t]*,[ \t]*\[[^\n]*\][ \t]*(?:\r?\n|\z)"#,
    )
    .expect("valid enum pattern")
});

/// Lower-case type names only, so Ruby constant paths such as
/// `ActiveRecord::Schema` are not mistaken for casts.
static DOCUMENT_CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"::(?:{CAST_TYPES}){CAST_MODIFIERS}")).expect("valid cast pattern")
});

static RANDOM_UUID_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"default:\s*->\s*\{\s*"(?:gen_random_uuid|uuid_generate_v4)\(\)"\s*\}"#)
        .expect("valid uuid default pattern")
});

static VIRTUAL_COLUMN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^([ \t]*)t\.virtual[ \t]+"([^"]+)",[ \t]*type:[ \t]*:([a-z_]+)([^\n]*)$"#)
        .expect("valid virtual column pattern")
});

static STORED_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*stored:\s*(?:true|false)").expect("valid stored pattern"));

static AS_OPTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#",\s*as:\s*(?:"{QUOTED_BODY}"|[^,]+)"#)).expect("valid as pattern")
});

static INDEX_EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#"t\.index\s+"{QUOTED_BODY}""#)).expect("valid index pattern")
});

static WHERE_CLAUSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r#",\s*where:\s*"{QUOTED_BODY}""#)).expect("valid where pattern")
});

static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\r?\n){3,}").expect("valid blank-line pattern"));

/// One rewrite applied to the whole document. Steps run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "snake_case")]
pub enum RewriteStep {
    /// Delete `enable_extension "..."` lines.
    DropExtensions,
    /// Delete `create_enum "name", [...]` lines.
    DropEnums,
    /// Strip `::type` casts and `CAST(x AS type)` wrappers everywhere.
    StripCasts,
    /// Replace `default: -> { "gen_random_uuid()" }` with `default: nil`.
    DropRandomUuidDefaults,
    /// Turn `t.virtual` columns into plain columns of their declared type.
    FlattenVirtualColumns,
    /// Canonicalize `t.index "expression"` targets.
    CanonicalizeIndexExpressions,
    /// Translate `where:` predicates, removing those with nothing left.
    TranslatePartialPredicates,
    /// Collapse runs of blank lines left behind by deleted lines.
    CollapseBlankLines,
}

impl RewriteStep {
    /// Apply this step to a document.
    pub fn apply(self, document: &str) -> String {
        match self {
            RewriteStep::DropExtensions => EXTENSION_LINE.replace_all(document, "").into_owned(),
            RewriteStep::DropEnums => ENUM_LINE.replace_all(document, "").into_owned(),
            RewriteStep::StripCasts => {
                let without_suffixes = DOCUMENT_CAST.replace_all(document, "");
                strip_cast_calls(&without_suffixes)
            }
            RewriteStep::DropRandomUuidDefaults => RANDOM_UUID_DEFAULT
                .replace_all(document, "default: nil")
                .into_owned(),
            RewriteStep::FlattenVirtualColumns => VIRTUAL_COLUMN
                .replace_all(document, flatten_virtual_column)
                .into_owned(),
            RewriteStep::CanonicalizeIndexExpressions => INDEX_EXPRESSION
                .replace_all(document, |caps: &Captures<'_>| {
                    let target = canonicalize(&unescape(&caps[1]));
                    format!(r#"t.index "{}""#, escape(&target))
                })
                .into_owned(),
            RewriteStep::TranslatePartialPredicates => WHERE_CLAUSE
                .replace_all(document, |caps: &Captures<'_>| {
                    match translate_predicate(&unescape(&caps[1])) {
                        Some(predicate) => format!(r#", where: "{}""#, escape(&predicate)),
                        None => {
                            warn!(clause = &caps[0], "dropping empty partial-index predicate");
                            String::new()
                        }
                    }
                })
                .into_owned(),
            RewriteStep::CollapseBlankLines => BLANK_RUN
                .replace_all(document, |caps: &Captures<'_>| {
                    if caps[0].starts_with('\r') {
                        "\r\n\r\n"
                    } else {
                        "\n\n"
                    }
                })
                .into_owned(),
        }
    }
}

fn flatten_virtual_column(caps: &Captures<'_>) -> String {
    let indentation = &caps[1];
    let column = &caps[2];
    let column_type = &caps[3];

    let remainder = STORED_OPTION.replace_all(&caps[4], "");
    let remainder = AS_OPTION.replace_all(&remainder, "");

    debug!(column, column_type, "flattening virtual column");
    format!(r#"{indentation}t.{column_type} "{column}"{remainder}"#)
}

/// Undo `\"` escapes. Every other escape sequence, `\\` included, is kept
/// as written so [`escape`] restores the original text.
fn unescape(quoted: &str) -> String {
    let mut out = String::with_capacity(quoted.len());
    let mut chars = quoted.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn escape(text: &str) -> String {
    text.replace('"', r#"\""#)
}

/// Run every [`RewriteStep`] over `document`, in order.
///
/// Running it again on its own output changes nothing.
pub fn rewrite_schema(document: &str) -> String {
    RewriteStep::iter().fold(document.to_string(), |current, step| {
        let next = step.apply(&current);
        if next != current {
            debug!(%step, "schema rewrite step changed the document");
        }
        next
    })
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("IO error reading schema {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error writing schema {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read a schema dump, rewrite it and write the result to `output`.
pub fn rewrite_schema_file(input: &Path, output: &Path) -> Result<(), SchemaError> {
    let document = std::fs::read_to_string(input).map_err(|e| SchemaError::Read {
        path: input.to_path_buf(),
        source: e,
    })?;

    let rewritten = rewrite_schema(&document);

    if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| SchemaError::Write {
            path: output.to_path_buf(),
            source: e,
        })?;
    }
    std::fs::write(output, rewritten).map_err(|e| SchemaError::Write {
        path: output.to_path_buf(),
        source: e,
    })
}
