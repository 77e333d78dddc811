//! The core diagnostic type.
//!
//! A [`Diagnostic`] represents a single syntax error with an error code, the
//! range it covers and optional help text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::ErrorCode, position::Range};

/// A syntax error with source location information.
///
/// Displayed in the conventional `label:line:column: message` form:
///
/// ```text
/// diagram.d2:3:5: connection missing destination
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    code: ErrorCode,
    range: Range,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    help: Option<String>,
}

impl Diagnostic {
    /// Create a diagnostic.
    ///
    /// # Example
    ///
    /// ```
    /// # use d2_parser::{Diagnostic, ErrorCode, Position, Range};
    /// let range = Range::new("a.d2", Position::new(0, 0, 0), Position::new(0, 1, 1));
    /// let diag = Diagnostic::new(ErrorCode::E004, range, "unexpected map termination character }")
    ///     .with_help("remove the `}` or open a map with `{`");
    ///
    /// assert_eq!(diag.to_string(), "a.d2:1:1: unexpected map termination character }");
    /// ```
    pub fn new(code: ErrorCode, range: Range, message: impl Into<String>) -> Self {
        Self {
            code,
            range,
            message: message.into(),
            help: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Get the range this diagnostic applies to.
    pub fn range(&self) -> &Range {
        &self.range
    }

    /// Get the message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the help text, if any.
    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// Set the help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range, self.message)
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn range() -> Range {
        Range::new("x.d2", Position::new(1, 2, 8), Position::new(1, 4, 10))
    }

    #[test]
    fn test_diagnostic_new() {
        let diag = Diagnostic::new(ErrorCode::E021, range(), "missing value after colon");

        assert_eq!(diag.code(), ErrorCode::E021);
        assert_eq!(diag.message(), "missing value after colon");
        assert_eq!(diag.range(), &range());
        assert!(diag.help().is_none());
    }

    #[test]
    fn test_diagnostic_with_help() {
        let diag = Diagnostic::new(
            ErrorCode::E033,
            range(),
            "only newline escapes are allowed in connections",
        )
        .with_help("end the line with `\\` to continue a connection");

        assert_eq!(
            diag.help(),
            Some("end the line with `\\` to continue a connection")
        );
    }

    #[test]
    fn test_diagnostic_display() {
        let diag = Diagnostic::new(ErrorCode::E031, range(), "connection missing destination");

        assert_eq!(diag.to_string(), "x.d2:2:3: connection missing destination");
    }

    #[test]
    fn test_diagnostic_serializes_compact_range() {
        let diag = Diagnostic::new(ErrorCode::E010, range(), "unterminated");
        let json = serde_json::to_value(&diag).unwrap();

        assert_eq!(json["code"], "E010");
        assert_eq!(json["range"], "x.d2,1:2:8-1:4:10");
        assert!(json.get("help").is_none());
    }
}
