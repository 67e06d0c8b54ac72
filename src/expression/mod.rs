//! Expression canonicalization
//!
//! PostgreSQL schema dumps embed expressions in index targets, partial-index
//! predicates and generated columns, decorated with casts and redundant
//! parentheses that SQLite cannot load. [`canonicalize`] reduces such an
//! expression to a minimal form:
//!
//! 1. casts (`x::text`, `CAST(x AS text)`) are stripped,
//! 2. redundant parentheses are removed, both around the whole expression and
//!    around single terms such as `(type) = 'x'`,
//! 3. `lower(...)` / `upper(...)` calls are replaced by their canonical argument,
//! 4. whitespace runs collapse to a single space,
//! 5. parentheses exposed by the previous steps are removed.
//!
//! The pass repeats until the text stops changing, so the result is always a
//! fixed point.

pub mod predicate;

use std::sync::LazyLock;

use regex::Regex;

pub use predicate::{Predicate, classify, translate_predicate};

/// Type names accepted after `::`. Multi-word names come first so they win
/// over the single-word fallback.
pub(crate) const CAST_TYPES: &str = "character varying|bit varying|double precision|\
     timestamp with time zone|timestamp without time zone|\
     time with time zone|time without time zone|[a-z_][a-z0-9_]*";

/// Optional type modifier such as `(255)` or `(10,2)`, followed by any number
/// of array suffixes.
pub(crate) const CAST_MODIFIERS: &str = r"(?:\(\s*\d+(?:\s*,\s*\d+)?\s*\))?(?:\[\])*";

static CAST_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)::(?:{CAST_TYPES}){CAST_MODIFIERS}")).expect("valid cast pattern")
});

static CAST_CALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bCAST\(([^)]+) AS [^)]+\)").expect("valid CAST pattern")
});

/// A parenthesized single term (identifier, number or quoted literal) in
/// operand position: at the start of the text, or after `(`, `,` or an
/// operator. After a word (`IN (...)`, `coalesce (...)`) the parentheses are
/// syntax and stay.
static GROUPED_TERM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^\s*|[(,=<>!+\-*/%|&~^]\s*)\(\s*([A-Za-z0-9_."]+|'[^']*')\s*\)"#)
        .expect("valid grouped term pattern")
});

static CASE_FOLD_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(?:lower|upper)\(").expect("valid case-fold pattern"));

/// Reduce an expression to its canonical form.
///
/// Blank input is returned unchanged. Malformed input (unbalanced
/// parentheses, an unterminated `lower(`) is never an error: the affected
/// step simply leaves that part of the text alone.
///
/// ```rust
/// use pg_sqlite_shim::expression::canonicalize;
///
/// assert_eq!(canonicalize("lower((accounts.name)::text)"), "accounts.name");
/// assert_eq!(canonicalize("((account_id))"), "account_id");
/// ```
pub fn canonicalize(expr: &str) -> String {
    if expr.trim().is_empty() {
        return expr.to_string();
    }

    let mut current = expr.to_string();
    loop {
        let next = canonical_pass(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn canonical_pass(source: &str) -> String {
    let text = strip_casts(source);
    let text = strip_wrapping_parentheses(&text);
    let text = unwrap_grouped_terms(&text);
    let text = inline_case_folding(&text);
    let text = collapse_whitespace(&text);
    strip_wrapping_parentheses(&text)
}

/// Remove `::type` suffixes and `CAST(x AS type)` wrappers, keeping `x`.
pub fn strip_casts(source: &str) -> String {
    let without_suffixes = CAST_SUFFIX.replace_all(source, "");
    strip_cast_calls(&without_suffixes)
}

/// Remove `CAST(x AS type)` wrappers only, keeping `x`.
pub(crate) fn strip_cast_calls(source: &str) -> String {
    CAST_CALL.replace_all(source, "${1}").into_owned()
}

/// Repeatedly drop one outer pair of parentheses while the content inside
/// stays balanced and non-empty.
///
/// `"(a) + (b)"` is kept whole: dropping its outer characters would leave
/// `"a) + (b"`, whose depth goes negative.
pub fn strip_wrapping_parentheses(source: &str) -> String {
    let mut trimmed = source.trim();
    while trimmed.starts_with('(') && trimmed.ends_with(')') {
        let inner = trimmed[1..trimmed.len() - 1].trim();
        if inner.is_empty() || !is_balanced(inner) {
            break;
        }
        trimmed = inner;
    }
    trimmed.to_string()
}

/// Drop parentheses that group a single term, e.g. `(type) = 'x'` becomes
/// `type = 'x'`. Call arguments (`count(id)`), lists after keywords
/// (`IN ('a')`) and text inside literals are left untouched.
fn unwrap_grouped_terms(source: &str) -> String {
    GROUPED_TERM
        .replace_all(source, |caps: &regex::Captures<'_>| {
            let whole = caps.get(0).map_or(0..0, |m| m.range());
            let inside_literal = source[..whole.start].matches('\'').count() % 2 == 1;
            if inside_literal {
                caps[0].to_string()
            } else {
                format!("{}{}", &caps[1], &caps[2])
            }
        })
        .into_owned()
}

/// Replace every `lower(arg)` / `upper(arg)` call with `canonicalize(arg)`.
///
/// The argument runs to the matching closing parenthesis, so nested calls
/// and casts inside it are handled. Case folding is dropped, not emulated.
fn inline_case_folding(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(call) = CASE_FOLD_CALL.find(rest) {
        let open = call.end() - 1;
        match matching_close(rest, open) {
            Some(close) => {
                out.push_str(&rest[..call.start()]);
                out.push_str(&canonicalize(&rest[open + 1..close]));
                rest = &rest[close + 1..];
            }
            None => {
                out.push_str(&rest[..call.end()]);
                rest = &rest[call.end()..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn collapse_whitespace(source: &str) -> String {
    source.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True when the running parenthesis depth never drops below zero and ends at
/// zero. Parentheses inside single-quoted literals are ignored.
fn is_balanced(text: &str) -> bool {
    let mut depth: usize = 0;
    let mut in_literal = false;
    for ch in text.chars() {
        match ch {
            '\'' => in_literal = !in_literal,
            '(' if !in_literal => depth += 1,
            ')' if !in_literal => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Byte offset of the `)` closing the `(` at `open`, if any.
fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut depth: usize = 0;
    let mut in_literal = false;
    for (offset, ch) in text[open..].char_indices() {
        match ch {
            '\'' => in_literal = !in_literal,
            '(' if !in_literal => depth += 1,
            ')' if !in_literal => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}
