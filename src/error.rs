//! Failure taxonomy for the processing passes.
//!
//! These cover the conditions that abort a file (or signal a programming
//! error in the caller); routine diagnostics go through the feedback channel
//! instead.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("namespace \"{name}\" is already declared by {existing}")]
    DuplicateNamespace { name: String, existing: String },

    #[error("no namespace named \"{name}\" is declared")]
    MissingNamespace { name: String },

    #[error("cyclical import on \"{name}\" while resolving imports of \"{origin}\"")]
    CyclicalImport { origin: String, name: String },

    #[error("markup has no component closing tag to inject scripts before")]
    MalformedMarkup,

    #[error("operation requires a {expected} file, got a {kind} file")]
    UnsupportedFileKind {
        expected: &'static str,
        kind: String,
    },
}

impl ProcessError {
    /// True when the error indicates the caller passed the wrong kind of
    /// file, rather than a defect in the project being processed.
    pub fn is_misuse(&self) -> bool {
        matches!(self, ProcessError::UnsupportedFileKind { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ProcessError::DuplicateNamespace {
            name: "FocusMixin".into(),
            existing: "source/FocusMixin.brs".into(),
        };
        assert_eq!(
            err.to_string(),
            "namespace \"FocusMixin\" is already declared by source/FocusMixin.brs"
        );

        let err = ProcessError::CyclicalImport {
            origin: "A".into(),
            name: "B".into(),
        };
        assert_eq!(
            err.to_string(),
            "cyclical import on \"B\" while resolving imports of \"A\""
        );
    }

    #[test]
    fn test_misuse_classification() {
        assert!(
            ProcessError::UnsupportedFileKind {
                expected: "markup",
                kind: "code".into(),
            }
            .is_misuse()
        );
        assert!(!ProcessError::MalformedMarkup.is_misuse());
    }
}
