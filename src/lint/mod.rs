//! Migration pattern linter
//!
//! Scans migration source files for PostgreSQL-only constructs that would
//! break on SQLite. This is plain text matching, not parsing: a construct
//! mentioned inside a comment or string still counts.

pub mod input;
pub mod pattern;

pub use input::collect_migration_files;
pub use pattern::Pattern;

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum LintError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One forbidden construct found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    /// Path as reported, with forward slashes.
    pub file: String,
    pub message: String,
    /// Source of the regex that matched.
    pub pattern: String,
}

impl Violation {
    fn new(file: &str, pattern: Pattern) -> Self {
        Self {
            file: file.to_string(),
            message: pattern.message().to_string(),
            pattern: pattern.source().to_string(),
        }
    }
}

pub struct MigrationLinter {
    files: Vec<PathBuf>,
    root: Option<PathBuf>,
}

impl MigrationLinter {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files, root: None }
    }

    /// Report file paths relative to `root`.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Check every file, in order.
    ///
    /// Each pattern is reported at most once per file. The first unreadable
    /// file aborts the run.
    pub fn violations(&self) -> Result<Vec<Violation>, LintError> {
        let mut violations = Vec::new();
        for file in &self.files {
            let content = std::fs::read_to_string(file).map_err(|e| LintError::Io {
                path: file.clone(),
                source: e,
            })?;
            let found = Self::inspect_source(&self.display_path(file), &content);
            debug!(file = %file.display(), count = found.len(), "linted migration");
            violations.extend(found);
        }
        Ok(violations)
    }

    /// Check in-memory source text reported under `file`.
    pub fn inspect_source(file: &str, content: &str) -> Vec<Violation> {
        Pattern::find_all(content)
            .into_iter()
            .map(|p| Violation::new(file, p))
            .collect()
    }

    fn display_path(&self, file: &Path) -> String {
        let shown = match &self.root {
            Some(root) => file.strip_prefix(root).unwrap_or(file),
            None => file,
        };
        shown.to_string_lossy().replace('\\', "/")
    }
}
