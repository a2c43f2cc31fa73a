use anyhow::Result;
use std::error::Error as _;
use std::io::Write;

use crate::error::SourceError;
use crate::selection::{Database, Diagnostic};

mod list;
mod why;

pub use list::{list, list_with_io};
pub use why::{why, why_with_io};

/// Output switches shared by the commands.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OutputOptions {
    /// Include the first line of each package description.
    pub verbose: bool,
    /// Print JSON instead of plain text.
    pub json: bool,
}

/// Tell the user about databases that could not be read. The listing that
/// follows is still printed.
pub(crate) fn print_diagnostics<W: Write>(diagnostics: &[Diagnostic], err: &mut W) -> Result<()> {
    for diagnostic in diagnostics {
        let error = &diagnostic.error;
        match (diagnostic.database, error.is_missing()) {
            (Database::ExtendedStates, true) => writeln!(
                err,
                "Warning: {}. Assuming no auto-installed packages.",
                error
            )?,
            (_, true) => writeln!(err, "Error: {}", error)?,
            (_, false) => writeln!(
                err,
                "Error parsing {}: {}",
                error.path().display(),
                error_cause(error)
            )?,
        }
    }
    Ok(())
}

fn error_cause(error: &SourceError) -> String {
    match error.source() {
        Some(source) => source.to_string(),
        None => error.to_string(),
    }
}
