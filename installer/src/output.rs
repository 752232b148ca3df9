//! Output formatting for the updater CLI.
//!
//! All user-facing text goes to standard error: progress lines while the
//! pipeline runs, a summary once it succeeds, and the rendered error chain
//! when it fails.

use crate::pipeline::UpdateOutcome;
use std::error::Error;
use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort output; ignore write failures.
    }
}

/// Render an error and every source beneath it on one line.
///
/// # Example
///
/// ```
/// use gup::error::UpdaterError;
/// use gup::output::render_error;
///
/// let rendered = render_error(&UpdaterError::MissingInstallDir);
/// assert!(rendered.starts_with("no installation directory given"));
/// ```
#[must_use]
pub fn render_error(err: &dyn Error) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

/// Format the summary printed after a successful update.
#[must_use]
pub fn success_message(outcome: &UpdateOutcome) -> String {
    let plural = if outcome.install.files == 1 { "file" } else { "files" };
    format!(
        "Installed {} ({} {plural}) into {}",
        outcome.archive_name,
        outcome.install.files,
        outcome.install_dir.display()
    )
}
