//! Report formatting and printing utilities.
//!
//! Feedback is displayed in cargo-style format: severity and message, a
//! clickable location line, and the source line with a caret when one was
//! captured. Kept separate from the passes so sgweave can be used as a
//! library without pulling in terminal output.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use super::run::{RunResult, RunSummary};
use crate::config::CONFIG_FILE_NAME;
use crate::feedback::{Feedback, Severity};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print a run's feedback and summary to stdout.
pub fn print(result: &RunResult, verbose: bool) {
    print_to(result, verbose, &mut io::stdout().lock());
}

/// Print to a custom writer. Useful for testing or redirecting output.
pub fn print_to<W: Write>(result: &RunResult, verbose: bool, writer: &mut W) {
    let shown: Vec<&Feedback> = result
        .feedback
        .iter()
        .filter(|f| verbose || f.severity != Severity::Info)
        .collect();

    let max_line_width = shown
        .iter()
        .filter(|f| f.source_line.is_some())
        .map(|f| f.line.to_string().len())
        .max()
        .unwrap_or(0);

    for feedback in &shown {
        print_feedback(feedback, writer, max_line_width);
    }

    print_summary(result, &shown, writer);
}

fn print_feedback<W: Write>(feedback: &Feedback, writer: &mut W, max_line_width: usize) {
    let severity_str = match feedback.severity {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
        Severity::Info => "info".bold().cyan(),
    };

    let _ = writeln!(writer, "{}: {}", severity_str, feedback.message);

    if let Some(path) = &feedback.file_path {
        if feedback.has_location() {
            let _ = writeln!(
                writer,
                "  {} {}:{}:{}",
                "-->".blue(),
                path,
                feedback.line,
                feedback.col
            );
        } else {
            let _ = writeln!(writer, "  {} {}", "-->".blue(), path);
        }
    }

    if let Some(source_line) = &feedback.source_line {
        let caret_char = match feedback.severity {
            Severity::Error => "^".red(),
            _ => "^".yellow(),
        };

        let _ = writeln!(
            writer,
            "{:>width$} {}",
            "",
            "|".blue(),
            width = max_line_width
        );
        let _ = writeln!(
            writer,
            "{:>width$} {} {}",
            feedback.line.to_string().blue(),
            "|".blue(),
            source_line,
            width = max_line_width
        );

        // Caret pointing to the column (col is 1-based).
        let prefix = if feedback.col > 1 {
            source_line
                .chars()
                .take(feedback.col - 1)
                .collect::<String>()
        } else {
            String::new()
        };
        let caret_padding = UnicodeWidthStr::width(prefix.as_str());
        let _ = writeln!(
            writer,
            "{:>width$} {} {:>padding$}{}",
            "",
            "|".blue(),
            "",
            caret_char,
            width = max_line_width,
            padding = caret_padding
        );
    }

    let _ = writeln!(writer);
}

fn print_summary<W: Write>(result: &RunResult, shown: &[&Feedback], writer: &mut W) {
    match &result.summary {
        RunSummary::Init { created } => {
            if *created {
                let _ = writeln!(
                    writer,
                    "{} {}",
                    SUCCESS_MARK.green(),
                    format!("Created {}", CONFIG_FILE_NAME).green()
                );
            }
        }
        RunSummary::Build(summary) => {
            let errors = shown
                .iter()
                .filter(|f| f.severity == Severity::Error)
                .count();
            let warnings = shown
                .iter()
                .filter(|f| f.severity == Severity::Warning)
                .count();

            let files = format!(
                "Processed {} {}, wrote {}",
                summary.files_discovered,
                if summary.files_discovered == 1 {
                    "file"
                } else {
                    "files"
                },
                summary.files_written
            );

            if errors == 0 {
                let detail = if warnings > 0 {
                    format!("{} ({} warnings)", files, warnings)
                } else {
                    files
                };
                let _ = writeln!(writer, "{} {}", SUCCESS_MARK.green(), detail.green());
            } else {
                let _ = writeln!(
                    writer,
                    "{} {}",
                    FAILURE_MARK.red(),
                    format!("{} - {} errors, {} warnings", files, errors, warnings).red()
                );
            }
        }
    }
}
