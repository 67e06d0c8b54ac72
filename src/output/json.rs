//! JSON reporter
//!
//! Emits violations as a pretty-printed JSON array of
//! `{ "file", "message", "pattern" }` objects.

use crate::lint::Violation;
use crate::output::{JsonReporter, ReportError, Reporter};
use std::io::Write;

impl Reporter for JsonReporter {
    fn emit(&self, violations: &[Violation], out: &mut dyn Write) -> Result<(), ReportError> {
        let json = serde_json::to_string_pretty(violations)
            .map_err(|e| ReportError::Serialization(e.to_string()))?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
