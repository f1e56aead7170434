//! CLI command handlers.
//!
//! Each handler runs one subcommand, prints its diagnostics and returns the
//! process exit code. `main.rs` only parses arguments and dispatches here.

mod gen;
mod inventory;
mod transform;

pub use gen::run_gen;
pub use inventory::run_inventory;
pub use transform::run_transform;

use crate::model::{max_severity, Diagnostic, Severity};
use std::io::{self, Write};

/// Process exit codes
pub mod exit_codes {
    /// No ERROR or CRITICAL diagnostic
    pub const SUCCESS: i32 = 0;
    /// At least one ERROR or CRITICAL diagnostic
    pub const DIAGNOSTICS_FAILED: i32 = 1;
    /// A fatal error stopped the command
    pub const ERROR: i32 = 3;
}

/// Exit code for a finished command given its diagnostics.
#[must_use]
pub fn exit_code(diagnostics: &[Diagnostic]) -> i32 {
    match max_severity(diagnostics) {
        Some(severity) if severity.is_failure() => exit_codes::DIAGNOSTICS_FAILED,
        _ => exit_codes::SUCCESS,
    }
}

/// Write diagnostics one per line as `SEVERITY: message`.
///
/// INFO diagnostics are only written when `verbose` is set.
pub fn write_diagnostics<W: Write>(
    out: &mut W,
    diagnostics: &[Diagnostic],
    verbose: bool,
) -> io::Result<()> {
    for diagnostic in diagnostics {
        if diagnostic.severity == Severity::Info && !verbose {
            continue;
        }
        writeln!(out, "{diagnostic}")?;
    }
    Ok(())
}

/// Print diagnostics to stdout and return the exit code.
pub(crate) fn finish(diagnostics: &[Diagnostic], verbose: bool) -> anyhow::Result<i32> {
    let stdout = io::stdout();
    write_diagnostics(&mut stdout.lock(), diagnostics, verbose)?;
    Ok(exit_code(diagnostics))
}
