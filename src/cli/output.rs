//! Terminal output helpers.
//!
//! Diagnostics go to stderr with an `ERROR:` / `WARNING:` prefix; stdout
//! is reserved for the secret so callers can capture it directly.

use std::io::{self, Write};

use console::style;

/// Print a red error message: "ERROR: {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("ERROR:").for_stderr().red().bold(), msg);
}

/// Print a yellow warning: "WARNING: {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("WARNING:").for_stderr().yellow().bold(), msg);
}

/// Write the secret as a single line.
pub fn secret(out: &mut impl Write, value: &str) -> io::Result<()> {
    writeln!(out, "{value}")?;
    out.flush()
}
