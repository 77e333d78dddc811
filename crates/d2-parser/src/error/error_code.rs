//! Error codes for parser diagnostics.
//!
//! Codes are grouped by the construct that reported them:
//! - `E00x` - Containers and layout of map/array children
//! - `E01x` - Strings and comments
//! - `E02x` - Keys and values
//! - `E03x` - Connections and edge indexes
//! - `E04x` - Substitutions
//! - `E09x` - Source failures

use std::fmt;

use serde::{Deserialize, Serialize};

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // =========================================================================
    // Containers (E00x)
    // =========================================================================
    /// Unterminated map.
    ///
    /// A nested map was opened with `{` but the source ended before `}`.
    E001,

    /// Unterminated array.
    ///
    /// An array was opened with `[` but the source ended before `]`.
    E002,

    /// Unexpected text after a node.
    ///
    /// Text follows a complete node on the same line without a `;` separator.
    E003,

    /// Map termination in the file map.
    ///
    /// A `}` appeared at file scope where there is no map to close.
    E004,

    /// Invalid start of an array value.
    ///
    /// An array element begins with a character that cannot start a value.
    E005,

    /// Maximum nesting depth exceeded.
    ///
    /// Maps and arrays are nested deeper than the configured limit. The
    /// offending container is skipped.
    E006,

    /// Nothing to parse.
    ///
    /// A standalone key, map key or value was requested but the text held
    /// none.
    E007,

    // =========================================================================
    // Strings and comments (E01x)
    // =========================================================================
    /// Unterminated double quoted string.
    E010,

    /// Unterminated single quoted string.
    E011,

    /// Unterminated block string.
    E012,

    /// Unterminated block comment.
    E013,

    /// Unfinished escape sequence.
    ///
    /// A backslash was the last character of the source.
    E014,

    // =========================================================================
    // Keys and values (E02x)
    // =========================================================================
    /// Map value without key.
    E020,

    /// Missing value after colon.
    E021,

    // =========================================================================
    // Connections (E03x)
    // =========================================================================
    /// Connection missing source.
    E030,

    /// Connection missing destination.
    E031,

    /// Unterminated connection.
    E032,

    /// Invalid escape inside a connection.
    ///
    /// Only a backslash followed by a newline may appear inside `--`.
    E033,

    /// Unterminated edge group.
    ///
    /// An edge group opened with `(` was not closed with `)`.
    E034,

    /// Unterminated edge index.
    E035,

    /// Unexpected character in edge index.
    E036,

    // =========================================================================
    // Substitutions (E04x)
    // =========================================================================
    /// Substitution does not begin with `{`.
    E040,

    /// Substitution is not terminated by `}`.
    E041,

    // =========================================================================
    // Source (E09x)
    // =========================================================================
    /// The character source failed.
    E090,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E005 => "E005",
            ErrorCode::E006 => "E006",
            ErrorCode::E007 => "E007",
            ErrorCode::E010 => "E010",
            ErrorCode::E011 => "E011",
            ErrorCode::E012 => "E012",
            ErrorCode::E013 => "E013",
            ErrorCode::E014 => "E014",
            ErrorCode::E020 => "E020",
            ErrorCode::E021 => "E021",
            ErrorCode::E030 => "E030",
            ErrorCode::E031 => "E031",
            ErrorCode::E032 => "E032",
            ErrorCode::E033 => "E033",
            ErrorCode::E034 => "E034",
            ErrorCode::E035 => "E035",
            ErrorCode::E036 => "E036",
            ErrorCode::E040 => "E040",
            ErrorCode::E041 => "E041",
            ErrorCode::E090 => "E090",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated map",
            ErrorCode::E002 => "unterminated array",
            ErrorCode::E003 => "unexpected text",
            ErrorCode::E004 => "unexpected map termination",
            ErrorCode::E005 => "invalid array value",
            ErrorCode::E006 => "nesting too deep",
            ErrorCode::E007 => "empty input",
            ErrorCode::E010 => "unterminated double quoted string",
            ErrorCode::E011 => "unterminated single quoted string",
            ErrorCode::E012 => "unterminated block string",
            ErrorCode::E013 => "unterminated block comment",
            ErrorCode::E014 => "unfinished escape sequence",
            ErrorCode::E020 => "map value without key",
            ErrorCode::E021 => "missing value",
            ErrorCode::E030 => "connection missing source",
            ErrorCode::E031 => "connection missing destination",
            ErrorCode::E032 => "unterminated connection",
            ErrorCode::E033 => "invalid connection escape",
            ErrorCode::E034 => "unterminated edge group",
            ErrorCode::E035 => "unterminated edge index",
            ErrorCode::E036 => "invalid edge index",
            ErrorCode::E040 => "substitution missing `{`",
            ErrorCode::E041 => "substitution missing `}`",
            ErrorCode::E090 => "source read failure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::E001.to_string(), "E001");
        assert_eq!(ErrorCode::E036.to_string(), "E036");
        assert_eq!(ErrorCode::E090.to_string(), "E090");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::E010.description(), "unterminated double quoted string");
        assert_eq!(ErrorCode::E031.description(), "connection missing destination");
    }
}
