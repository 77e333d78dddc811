//! The ParseError type for wrapping parse diagnostics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Diagnostic;

/// A type alias for `Result<T, ParseError>`.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Error type for a parse that produced diagnostics.
///
/// Displays the fatal diagnostic, if any, followed by every recoverable
/// diagnostic, one per line.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{}", render(.fatal.as_ref(), .diagnostics))]
pub struct ParseError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fatal: Option<Diagnostic>,
    diagnostics: Vec<Diagnostic>,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(diagnostics: Vec<Diagnostic>, fatal: Option<Diagnostic>) -> Self {
        Self { fatal, diagnostics }
    }

    /// Get the recoverable diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the fatal source diagnostic, if the character source failed.
    pub fn fatal(&self) -> Option<&Diagnostic> {
        self.fatal.as_ref()
    }

    /// Iterate the fatal diagnostic followed by the recoverable ones.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.fatal.iter().chain(self.diagnostics.iter())
    }
}

fn render(fatal: Option<&Diagnostic>, diagnostics: &[Diagnostic]) -> String {
    fatal
        .into_iter()
        .chain(diagnostics)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl From<Diagnostic> for ParseError {
    fn from(diagnostic: Diagnostic) -> Self {
        Self {
            fatal: None,
            diagnostics: vec![diagnostic],
        }
    }
}

impl From<Vec<Diagnostic>> for ParseError {
    fn from(diagnostics: Vec<Diagnostic>) -> Self {
        Self {
            fatal: None,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorCode,
        position::{Position, Range},
    };

    fn diag(line: usize, message: &str) -> Diagnostic {
        let range = Range::new("f.d2", Position::new(line, 0, 0), Position::new(line, 1, 1));
        Diagnostic::new(ErrorCode::E003, range, message)
    }

    #[test]
    fn test_parse_error_from_diagnostic() {
        let err: ParseError = diag(0, "test error").into();

        assert_eq!(err.diagnostics().len(), 1);
        assert_eq!(err.diagnostics()[0].message(), "test error");
        assert!(err.fatal().is_none());
    }

    #[test]
    fn test_parse_error_display_multiple() {
        let err: ParseError = vec![diag(0, "first"), diag(2, "second")].into();

        assert_eq!(err.to_string(), "f.d2:1:1: first\nf.d2:3:1: second");
    }

    #[test]
    fn test_parse_error_display_fatal_first() {
        let err = ParseError::new(vec![diag(1, "syntax")], Some(diag(4, "io error: broken pipe")));

        assert_eq!(
            err.to_string(),
            "f.d2:5:1: io error: broken pipe\nf.d2:2:1: syntax"
        );
        assert_eq!(err.iter().count(), 2);
    }
}
