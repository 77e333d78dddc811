//! # D2 Parser
//!
//! Error-tolerant parser for the D2 diagram language. A source is turned
//! into a tree of [`ast`] nodes, each carrying the exact [`Range`] it was
//! read from, plus every syntax problem found along the way.
//!
//! Parsing never gives up on a syntax error: the returned tree is always
//! usable and malformed parts are reported as [`Diagnostic`]s. Only a
//! failure of the character source itself stops the parse early.
//!
//! ## Usage
//!
//! ```
//! # use d2_parser::{parse_str, ParseOptions, ast::MapNode};
//! let output = parse_str("shapes.d2", "a -> b: hello", &ParseOptions::default());
//!
//! assert!(output.diagnostics().is_empty());
//! let Some(MapNode::Key(key)) = output.map().nodes.first() else {
//!     panic!("expected a map key");
//! };
//! assert_eq!(key.edges.len(), 1);
//! ```

pub mod ast;
mod cursor;
mod error;
mod parser;
mod position;

pub use error::{Diagnostic, ErrorCode, ParseError, Result};
pub use position::{Position, Range, RangeParseError};

use std::{io, iter, str::Chars, sync::Arc};

use log::debug;
use serde::Deserialize;

use ast::{Key, KeyPath, Map, Value};
use cursor::Cursor;
use parser::Parser;

/// Nesting limit used when none is configured.
///
/// Each level of nesting costs several stack frames; this limit keeps a
/// parse within the 2 MiB stack of a spawned thread.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Options controlling a parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Count columns and bytes in UTF-16 code units instead of UTF-8 bytes.
    pub utf16: bool,
    /// Maximum nesting of maps and arrays. Raising it far above
    /// [`DEFAULT_MAX_DEPTH`] needs a correspondingly larger stack.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            utf16: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Everything a parse produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    map: Map,
    diagnostics: Vec<Diagnostic>,
    fatal: Option<Diagnostic>,
}

impl ParseOutput {
    /// The root map of the source. Always present, possibly empty.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// Recoverable syntax errors in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// The character source failure that ended the parse, if any.
    pub fn fatal(&self) -> Option<&Diagnostic> {
        self.fatal.as_ref()
    }

    /// Take the root map, dropping the diagnostics.
    pub fn into_map(self) -> Map {
        self.map
    }

    /// The root map if the source parsed without any diagnostic.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] holding every diagnostic otherwise.
    pub fn into_result(self) -> Result<Map> {
        if self.diagnostics.is_empty() && self.fatal.is_none() {
            Ok(self.map)
        } else {
            Err(ParseError::new(self.diagnostics, self.fatal))
        }
    }
}

/// Parse a D2 source from a stream of decoded characters.
///
/// `label` names the source in every [`Range`] of the result. A character
/// source error ends the parse; it is reported through
/// [`ParseOutput::fatal`] and the tree built so far is still returned.
///
/// # Example
///
/// ```
/// # use std::io;
/// # use d2_parser::{parse, ParseOptions};
/// let chars = "x: 1\ny: 2".chars().map(Ok::<char, io::Error>);
/// let output = parse("x.d2", chars, &ParseOptions::default());
///
/// assert_eq!(output.map().nodes.len(), 2);
/// assert!(output.fatal().is_none());
/// ```
pub fn parse<I>(label: impl Into<Arc<str>>, chars: I, options: &ParseOptions) -> ParseOutput
where
    I: IntoIterator<Item = io::Result<char>>,
{
    let label = label.into();
    debug!(
        label = label.as_ref(),
        utf16 = options.utf16,
        max_depth = options.max_depth;
        "Parsing source"
    );

    let cursor = Cursor::new(Arc::clone(&label), chars.into_iter(), options.utf16);
    let mut parser = Parser::new(cursor, options.max_depth);
    let map = parser.parse_file_map();
    let (diagnostics, fatal) = parser.finish().finish();

    debug!(
        label = label.as_ref(),
        nodes = map.nodes.len(),
        diagnostics = diagnostics.len(),
        fatal = fatal.is_some();
        "Parsed source"
    );

    ParseOutput {
        map,
        diagnostics,
        fatal,
    }
}

/// Parse a D2 source held in memory.
pub fn parse_str(label: impl Into<Arc<str>>, source: &str, options: &ParseOptions) -> ParseOutput {
    parse(label, source.chars().map(Ok), options)
}

type StrSource<'a> = iter::Map<Chars<'a>, fn(char) -> io::Result<char>>;

/// Run one grammar function over `text`, failing on any diagnostic or if
/// it produced nothing.
fn parse_fragment<'a, T>(
    text: &'a str,
    grammar: impl FnOnce(&mut Parser<StrSource<'a>>) -> Option<T>,
    empty: impl FnOnce() -> String,
) -> Result<T> {
    let source: StrSource<'a> = text.chars().map(Ok as fn(char) -> io::Result<char>);
    let cursor = Cursor::new(Arc::from(""), source, false);
    let mut parser = Parser::new(cursor, ParseOptions::default().max_depth);
    let parsed = grammar(&mut parser);
    parser.finish().into_result()?;

    parsed.ok_or_else(|| {
        let start = Position::default();
        Diagnostic::new(ErrorCode::E007, Range::new("", start, start), empty()).into()
    })
}

/// Parse `text` as a single key path such as `a.b."c d"`.
///
/// # Errors
///
/// Fails if `text` has syntax errors or holds no key.
pub fn parse_key(text: &str) -> Result<KeyPath> {
    parse_fragment(text, Parser::parse_key, || format!("empty key: {text:?}"))
}

/// Parse `text` as a single map entry such as `a -> b: label`.
///
/// # Errors
///
/// Fails if `text` has syntax errors or holds no map key.
pub fn parse_map_key(text: &str) -> Result<Key> {
    parse_fragment(text, Parser::parse_map_key, || "empty map key".to_string())
}

/// Parse `text` as a single value: a scalar, an array or a map.
///
/// # Errors
///
/// Fails if `text` has syntax errors or holds no value.
pub fn parse_value(text: &str) -> Result<Value> {
    parse_fragment(text, Parser::parse_value, || "empty value".to_string())
}
