//! Source positions and ranges.
//!
//! Every node and every diagnostic produced by the parser carries a
//! [`Range`]. Positions are zero indexed. Columns and byte offsets advance by
//! the UTF-8 length of each character, or by UTF-16 code units when the
//! parser runs in UTF-16 mode (required by LSP and browser clients).
//!
//! Both types have a compact text encoding used for interchange:
//!
//! - [`Position`]: `line:column:byte`
//! - [`Range`]: `label,line:column:byte-line:column:byte`
//!
//! The [`Display`](fmt::Display) forms are intended for error messages and
//! are 1-based.

use std::{fmt, str::FromStr, sync::Arc};

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Error returned when decoding the compact text form of a [`Position`] or
/// [`Range`] fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeParseError {
    #[error("expected three fields in position {0:?}")]
    PositionFields(String),

    #[error("invalid number {0:?} in position")]
    InvalidNumber(String),

    #[error("missing end position in range {0:?}")]
    MissingEnd(String),

    #[error("missing start position in range {0:?}")]
    MissingStart(String),
}

/// A line, column and byte offset in a source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub byte: usize,
}

impl Position {
    /// Create a new position.
    pub fn new(line: usize, column: usize, byte: usize) -> Self {
        Self { line, column, byte }
    }

    /// Advance past `c`.
    ///
    /// A newline moves to column 0 of the next line. With `utf16` set the
    /// column and byte offset advance in UTF-16 code units.
    pub fn advance(mut self, c: char, utf16: bool) -> Self {
        let size = char_size(c, utf16);
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += size;
        }
        self.byte += size;
        self
    }

    /// Step back over `c`, the inverse of [`Position::advance`].
    ///
    /// # Panics
    ///
    /// Panics if `c` is a newline: the previous line's length is unknown.
    pub fn subtract(mut self, c: char, utf16: bool) -> Self {
        assert!(c != '\n', "cannot subtract newline from position");
        let size = char_size(c, utf16);
        self.column = self.column.saturating_sub(size);
        self.byte = self.byte.saturating_sub(size);
        self
    }

    /// Step back over every character of `s`.
    pub fn subtract_str(self, s: &str, utf16: bool) -> Self {
        s.chars().fold(self, |pos, c| pos.subtract(c, utf16))
    }

    /// Advance past every character of `s`.
    pub fn advance_str(self, s: &str, utf16: bool) -> Self {
        s.chars().fold(self, |pos, c| pos.advance(c, utf16))
    }

    /// The compact `line:column:byte` encoding.
    pub fn to_compact_string(&self) -> String {
        format!("{}:{}:{}", self.line, self.column, self.byte)
    }
}

fn char_size(c: char, utf16: bool) -> usize {
    if utf16 { c.len_utf16() } else { c.len_utf8() }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line + 1, self.column + 1)
    }
}

impl FromStr for Position {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        let [line, column, byte] = fields.as_slice() else {
            return Err(RangeParseError::PositionFields(s.to_string()));
        };
        let number = |field: &str| {
            field
                .parse::<usize>()
                .map_err(|_| RangeParseError::InvalidNumber(field.to_string()))
        };
        Ok(Self {
            line: number(line)?,
            column: number(column)?,
            byte: number(byte)?,
        })
    }
}

/// The span `[start, end)` a node or diagnostic occupies in a labelled source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Range {
    label: Arc<str>,
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Create a new range.
    pub fn new(label: impl Into<Arc<str>>, start: Position, end: Position) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// Create an empty range at `pos` with a shared label.
    pub(crate) fn at(label: &Arc<str>, pos: Position) -> Self {
        Self {
            label: Arc::clone(label),
            start: pos,
            end: pos,
        }
    }

    /// The source label, usually a file path.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns `true` if the range starts and ends on the same line.
    pub fn one_line(&self) -> bool {
        self.start.line == self.end.line
    }

    /// The compact `label,start-end` encoding.
    pub fn to_compact_string(&self) -> String {
        format!(
            "{},{}-{}",
            self.label,
            self.start.to_compact_string(),
            self.end.to_compact_string()
        )
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.label.is_empty() {
            write!(f, "{}:", self.label)?;
        }
        write!(f, "{}", self.start)
    }
}

impl FromStr for Range {
    type Err = RangeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (rest, end) = s
            .rsplit_once('-')
            .ok_or_else(|| RangeParseError::MissingEnd(s.to_string()))?;
        let (label, start) = rest
            .rsplit_once(',')
            .ok_or_else(|| RangeParseError::MissingStart(s.to_string()))?;
        Ok(Self {
            label: label.into(),
            start: start.parse()?,
            end: end.parse()?,
        })
    }
}

impl Serialize for Range {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_compact_string())
    }
}

impl<'de> Deserialize<'de> for Range {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_ascii() {
        let pos = Position::default().advance('a', false).advance('b', false);
        assert_eq!(pos, Position::new(0, 2, 2));
    }

    #[test]
    fn test_advance_newline() {
        let pos = Position::new(0, 5, 5).advance('\n', false);
        assert_eq!(pos, Position::new(1, 0, 6));
    }

    #[test]
    fn test_advance_multibyte() {
        let pos = Position::default().advance('é', false);
        assert_eq!(pos, Position::new(0, 2, 2));

        let pos = Position::default().advance('é', true);
        assert_eq!(pos, Position::new(0, 1, 1));
    }

    #[test]
    fn test_advance_surrogate_pair() {
        let pos = Position::default().advance('😀', true);
        assert_eq!(pos, Position::new(0, 2, 2));

        let pos = Position::default().advance('😀', false);
        assert_eq!(pos, Position::new(0, 4, 4));
    }

    #[test]
    fn test_subtract_inverts_advance() {
        let start = Position::new(3, 4, 20);
        for c in ['a', 'é', '😀', '{'] {
            for utf16 in [false, true] {
                assert_eq!(start.advance(c, utf16).subtract(c, utf16), start);
            }
        }
    }

    #[test]
    #[should_panic(expected = "cannot subtract newline")]
    fn test_subtract_newline_panics() {
        Position::new(1, 0, 1).subtract('\n', false);
    }

    #[test]
    fn test_subtract_str() {
        let pos = Position::new(0, 10, 10).subtract_str("...$", false);
        assert_eq!(pos, Position::new(0, 6, 6));
    }

    #[test]
    fn test_position_display_is_one_based() {
        assert_eq!(Position::new(0, 0, 0).to_string(), "1:1");
        assert_eq!(Position::new(4, 2, 40).to_string(), "5:3");
    }

    #[test]
    fn test_position_compact_round_trip() {
        let pos = Position::new(12, 3, 250);
        assert_eq!(pos.to_compact_string(), "12:3:250");
        assert_eq!("12:3:250".parse::<Position>(), Ok(pos));
    }

    #[test]
    fn test_position_parse_errors() {
        assert!(matches!(
            "1:2".parse::<Position>(),
            Err(RangeParseError::PositionFields(_))
        ));
        assert!(matches!(
            "1:x:3".parse::<Position>(),
            Err(RangeParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_range_compact_encoding() {
        let range = Range::new("a.d2", Position::new(0, 0, 0), Position::new(1, 4, 12));
        assert_eq!(range.to_compact_string(), "a.d2,0:0:0-1:4:12");
        assert_eq!("a.d2,0:0:0-1:4:12".parse::<Range>(), Ok(range));
    }

    #[test]
    fn test_range_label_with_separators() {
        let range: Range = "my-dir,v2/x.d2,1:2:3-4:5:6".parse().unwrap();
        assert_eq!(range.label(), "my-dir,v2/x.d2");
        assert_eq!(range.start, Position::new(1, 2, 3));
        assert_eq!(range.end, Position::new(4, 5, 6));
    }

    #[test]
    fn test_range_parse_errors() {
        assert!(matches!(
            "a.d2,0:0:0".parse::<Range>(),
            Err(RangeParseError::MissingEnd(_))
        ));
        assert!(matches!(
            "0:0:0-1:1:1".parse::<Range>(),
            Err(RangeParseError::MissingStart(_))
        ));
    }

    #[test]
    fn test_range_display() {
        let range = Range::new("x.d2", Position::new(2, 3, 10), Position::new(2, 5, 12));
        assert_eq!(range.to_string(), "x.d2:3:4");

        let unlabelled = Range::new("", Position::new(0, 0, 0), Position::new(0, 1, 1));
        assert_eq!(unlabelled.to_string(), "1:1");
    }

    #[test]
    fn test_range_one_line() {
        let range = Range::new("", Position::new(2, 0, 10), Position::new(2, 5, 15));
        assert!(range.one_line());
        let range = Range::new("", Position::new(2, 0, 10), Position::new(3, 0, 16));
        assert!(!range.one_line());
    }

    #[test]
    fn test_range_serde_uses_compact_form() {
        let range = Range::new("x.d2", Position::new(0, 1, 1), Position::new(0, 3, 3));
        let json = serde_json::to_string(&range).unwrap();
        assert_eq!(json, r#""x.d2,0:1:1-0:3:3""#);
        let back: Range = serde_json::from_str(&json).unwrap();
        assert_eq!(back, range);
    }
}

#[cfg(test)]
mod proptest_tests {
    use proptest::prelude::*;

    use super::*;

    fn position_strategy() -> impl Strategy<Value = Position> {
        (0usize..10_000, 0usize..500, 0usize..1_000_000)
            .prop_map(|(line, column, byte)| Position::new(line, column, byte))
    }

    fn check_range_text_round_trip(
        label: &str,
        start: Position,
        end: Position,
    ) -> Result<(), TestCaseError> {
        let range = Range::new(label, start, end);
        let decoded: Range = range.to_compact_string().parse().map_err(|e| {
            TestCaseError::fail(format!("failed to decode {range:?}: {e}"))
        })?;
        prop_assert_eq!(decoded, range);
        Ok(())
    }

    fn check_advance_then_subtract(text: &str, utf16: bool) -> Result<(), TestCaseError> {
        let start = Position::new(7, 100, 1000);
        let end = start.advance_str(text, utf16);
        prop_assert_eq!(end.subtract_str(text, utf16), start);
        Ok(())
    }

    proptest! {
        #[test]
        fn range_text_round_trip(
            label in "[a-z0-9/,._-]{0,16}",
            start in position_strategy(),
            end in position_strategy(),
        ) {
            check_range_text_round_trip(&label, start, end)?;
        }

        #[test]
        fn advance_then_subtract(text in "[^\n]{0,32}", utf16 in any::<bool>()) {
            check_advance_then_subtract(&text, utf16)?;
        }
    }
}
