//! Output reporters for different formats
//!
//! Supports plain text and JSON output of lint violations.

use crate::lint::Violation;
use std::io::Write;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error writing report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Report format selected by configuration or `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }

    pub fn reporter(self) -> Box<dyn Reporter> {
        match self {
            OutputFormat::Text => Box::new(TextReporter),
            OutputFormat::Json => Box::new(JsonReporter),
        }
    }
}

/// Trait for output format reporters.
pub trait Reporter {
    /// Write violations to `out`.
    fn emit(&self, violations: &[Violation], out: &mut dyn Write) -> Result<(), ReportError>;
}

/// One line per violation: `file: message [pattern]`.
pub struct TextReporter;

/// A JSON array of violations.
pub struct JsonReporter;

pub mod json;
pub mod text;

#[cfg(test)]
mod test_helpers;
