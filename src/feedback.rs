//! Diagnostics collected during a build.
//!
//! Passes record what they find on a [`FeedbackChannel`] and keep going where
//! they can; the CLI renders the channel at the end and derives the exit
//! status from it.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// One diagnostic, optionally pinned to a file location.
#[derive(Debug, Clone)]
pub struct Feedback {
    pub severity: Severity,
    pub file_path: Option<String>,
    /// 1-based; 0 when the diagnostic has no location.
    pub line: usize,
    pub col: usize,
    pub message: String,
    /// The source line the location points into, for report rendering.
    pub source_line: Option<String>,
}

impl Feedback {
    pub fn new(
        severity: Severity,
        file_path: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            file_path: file_path.map(str::to_owned),
            line: 0,
            col: 0,
            message: message.into(),
            source_line: None,
        }
    }

    pub fn with_location(mut self, line: usize, col: usize, source_line: Option<String>) -> Self {
        self.line = line;
        self.col = col;
        self.source_line = source_line;
        self
    }

    pub fn has_location(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.severity)?;
        if let Some(path) = &self.file_path {
            write!(f, " - {}", path)?;
            if self.has_location() {
                write!(f, "({}:{})", self.line, self.col)?;
            }
        }
        write!(f, " {}", self.message)
    }
}

/// Insertion-ordered collection of diagnostics for one build.
#[derive(Debug, Default)]
pub struct FeedbackChannel {
    entries: Vec<Feedback>,
}

impl FeedbackChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, feedback: Feedback) {
        self.entries.push(feedback);
    }

    pub fn info(&mut self, file_path: Option<&str>, message: impl Into<String>) {
        self.push(Feedback::new(Severity::Info, file_path, message));
    }

    pub fn warning(&mut self, file_path: Option<&str>, message: impl Into<String>) {
        self.push(Feedback::new(Severity::Warning, file_path, message));
    }

    pub fn error(&mut self, file_path: Option<&str>, message: impl Into<String>) {
        self.push(Feedback::new(Severity::Error, file_path, message));
    }

    pub fn entries(&self) -> &[Feedback] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Feedback> {
        self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|f| f.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.entries.iter().filter(|f| f.severity == severity).count()
    }
}
