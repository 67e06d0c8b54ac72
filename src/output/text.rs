//! Human-readable text output reporter
//!
//! Produces plain text output suitable for terminal display:
//! ```text
//! db/migrate/20240101000000_create_resources.rb: Avoid `t.uuid`; ... [t\.uuid\b]
//! ```

use crate::lint::Violation;
use crate::output::{ReportError, Reporter, TextReporter};
use std::io::Write;

fn format_violation(violation: &Violation) -> String {
    format!(
        "{}: {} [{}]\n",
        violation.file, violation.message, violation.pattern
    )
}

impl Reporter for TextReporter {
    fn emit(&self, violations: &[Violation], out: &mut dyn Write) -> Result<(), ReportError> {
        for violation in violations {
            out.write_all(format_violation(violation).as_bytes())?;
        }
        out.flush()?;
        Ok(())
    }
}
