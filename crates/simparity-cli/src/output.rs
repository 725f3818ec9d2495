//! User-facing progress and summary lines on stdout.

use std::io::{self, Write};

use console::style;
use simparity_core::{ComparisonResult, ProgressObserver, RunVerdict};

/// `<step>/<file>: count=<n> max_abs=<e> max_rel=<e> oob=<n>`
pub fn field_line(step: &str, file: &str, result: &ComparisonResult) -> String {
    format!(
        "{step}/{file}: count={} max_abs={:.3e} max_rel={:.3e} oob={}",
        result.count, result.max_abs, result.max_rel, result.out_of_bounds
    )
}

/// `Compared <n> files (missing=<m>, failures=<f>).`
pub fn summary_line(verdict: &RunVerdict) -> String {
    format!(
        "Compared {} files (missing={}, failures={}).",
        verdict.total_files_compared, verdict.missing_count, verdict.failure_count
    )
}

/// Colored PASS/FAIL word for terminals.
pub fn verdict_label(verdict: &RunVerdict) -> String {
    if verdict.passed() {
        style("PASS").green().bold().to_string()
    } else {
        style("FAIL").red().bold().to_string()
    }
}

/// Prints one line per compared field unless quiet.
///
/// Write failures cannot be returned from observer callbacks, so the first
/// one is kept and reported by [`ProgressPrinter::finish`].
pub struct ProgressPrinter<W: Write> {
    out: W,
    quiet: bool,
    error: Option<io::Error>,
}

impl ProgressPrinter<io::Stdout> {
    pub fn stdout(quiet: bool) -> Self {
        Self::new(io::stdout(), quiet)
    }
}

impl<W: Write> ProgressPrinter<W> {
    pub fn new(out: W, quiet: bool) -> Self {
        Self { out, quiet, error: None }
    }

    /// Print the final summary line (unless quiet) and surface any earlier
    /// write error.
    pub fn finish(mut self, verdict: &RunVerdict) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        if !self.quiet {
            writeln!(self.out, "{}", summary_line(verdict))?;
        }
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> ProgressObserver for ProgressPrinter<W> {
    fn on_field(&mut self, step: &str, file: &str, result: &ComparisonResult) {
        if self.quiet || self.error.is_some() {
            return;
        }
        if let Err(err) = writeln!(self.out, "{}", field_line(step, file, result)) {
            self.error = Some(err);
        }
    }
}
