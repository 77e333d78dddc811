//! Diagnostics produced while parsing.
//!
//! Parsing never stops at the first problem. Recoverable syntax errors are
//! recorded as [`Diagnostic`]s, each with an [`ErrorCode`], a message and the
//! [`Range`](crate::Range) it applies to, and parsing carries on. A failure of
//! the underlying character source is kept apart as the single fatal
//! diagnostic of a parse.
//!
//! [`ParseError`] bundles both for callers that want a `Result`.
//!
//! # Example
//!
//! ```
//! # use d2_parser::{parse_str, ParseOptions};
//! let output = parse_str("x.d2", "x: {", &ParseOptions::default());
//!
//! assert_eq!(output.diagnostics().len(), 1);
//! assert_eq!(output.diagnostics()[0].to_string(), "x.d2:1:4: maps must be terminated with }");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod parse_error;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use parse_error::{ParseError, Result};
