//! Migration file discovery
//!
//! Expands the configured lint paths into an ordered list of migration files.

use std::path::{Path, PathBuf};

use super::LintError;

/// Expand `paths` into migration files.
///
/// Directories contribute every file whose extension is listed in
/// `extensions` (non-recursive, sorted by file name). Files given directly
/// are taken as-is, whatever their extension. A path that does not exist is
/// an error.
pub fn collect_migration_files(
    paths: &[PathBuf],
    extensions: &[String],
) -> Result<Vec<PathBuf>, LintError> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            files.extend(collect_dir(path, extensions)?);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            return Err(LintError::Io {
                path: path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("Path does not exist: {}", path.display()),
                ),
            });
        }
    }

    Ok(files)
}

fn collect_dir(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>, LintError> {
    let entries = std::fs::read_dir(dir).map_err(|e| LintError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LintError::Io {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_file() && has_extension(&path, extensions) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| {
        let a_name = a.file_name().unwrap_or_default();
        let b_name = b.file_name().unwrap_or_default();
        a_name.cmp(b_name)
    });

    Ok(files)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|want| want.eq_ignore_ascii_case(e)))
}
