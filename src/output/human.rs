#![forbid(unsafe_code)]

//! Human-readable output formatter
//!
//! Prints one line per document with a colored verdict, the rejection trail
//! indented below rejected documents, and a final summary line. Goes to
//! stderr; stdout is reserved for machine-readable output.

use crate::output::report::{CheckReport, FileReport};
use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Human output formatter writing to stderr
pub struct HumanFormatter {
    color: ColorChoice,
}

impl HumanFormatter {
    pub fn new(color: ColorChoice) -> Self {
        HumanFormatter { color }
    }

    /// Prints the full report
    ///
    /// # Errors
    ///
    /// Returns `std::io::Error` if writing to stderr fails.
    pub fn print(&self, report: &CheckReport) -> std::io::Result<()> {
        let mut out = StandardStream::stderr(self.color);
        for file in &report.files {
            self.print_file(&mut out, file)?;
        }

        writeln!(out)?;
        if report.valid {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(out, "OK")?;
            out.reset()?;
            writeln!(out, ": {} document(s) valid", report.files_checked)?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "REJECTED")?;
            out.reset()?;
            writeln!(
                out,
                ": {} of {} document(s) failed",
                report.files_rejected, report.files_checked
            )?;
        }
        Ok(())
    }

    fn print_file(&self, out: &mut StandardStream, file: &FileReport) -> std::io::Result<()> {
        if file.valid {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
            write!(out, "✓")?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
            write!(out, "✗")?;
        }
        out.reset()?;
        writeln!(out, " {}", file.file)?;

        if let Some(error) = &file.error {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
            writeln!(out, "    error: {}", error)?;
            out.reset()?;
        }
        for rejection in &file.rejections {
            writeln!(out, "    {}: {}", rejection.location, rejection.rule)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::report::FileReport;

    #[test]
    fn test_print_does_not_panic() {
        let report = CheckReport::new(vec![
            FileReport::valid("a.json"),
            FileReport::failed("b.json", "parse error"),
        ]);
        let formatter = HumanFormatter::new(ColorChoice::Never);
        formatter.print(&report).unwrap();
    }
}
