//! Error types for the CLI.

use std::io;

use thiserror::Error;

use d2_parser::ParseError;

use crate::config::ConfigError;

/// Everything that can stop the CLI.
///
/// The `Parse` variant keeps the source text so diagnostics can be rendered
/// with a snippet.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{err}")]
    Parse {
        err: ParseError,
        src: String,
        utf16: bool,
    },

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit status for this error.
    ///
    /// - `1`: the input has syntax errors
    /// - `2`: configuration or output failure
    /// - `3`: an input could not be read
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Parse { err, .. } if err.fatal().is_some() => 3,
            Self::Parse { .. } => 1,
            Self::Config(_) | Self::Output(_) => 2,
            Self::Io(_) => 3,
        }
    }

    /// Create a new `Parse` error with the associated source code.
    pub fn new_parse_error(err: ParseError, src: impl Into<String>, utf16: bool) -> Self {
        Self::Parse {
            err,
            src: src.into(),
            utf16,
        }
    }
}

#[cfg(test)]
mod tests {
    use d2_parser::{Diagnostic, ErrorCode, Position, Range};

    use super::*;

    fn diag(code: ErrorCode) -> Diagnostic {
        let at = Position::default();
        Diagnostic::new(code, Range::new("t.d2", at, at), "failed")
    }

    #[test]
    fn test_exit_codes() {
        let syntax = CliError::new_parse_error(diag(ErrorCode::E001).into(), "a: {", false);
        assert_eq!(syntax.exit_code(), 1);

        let stream = ParseError::new(vec![diag(ErrorCode::E001)], Some(diag(ErrorCode::E090)));
        let stream = CliError::new_parse_error(stream, "a: {", false);
        assert_eq!(stream.exit_code(), 3);

        let config = CliError::Config(ConfigError::Parse("bad".to_string()));
        assert_eq!(config.exit_code(), 2);

        let io = CliError::Io(io::Error::other("gone"));
        assert_eq!(io.exit_code(), 3);
    }
}
