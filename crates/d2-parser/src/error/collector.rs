//! Collector for accumulating diagnostics during a parse.
//!
//! Grammar functions report problems to the [`DiagnosticCollector`] and keep
//! going. A failure of the character source occupies a separate slot: there is
//! at most one per parse and it is never mixed with the syntax errors.

use crate::error::{Diagnostic, ParseError};

#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
    fatal: Option<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a recoverable diagnostic.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Record the fatal source diagnostic. Only the first one is kept.
    pub fn emit_fatal(&mut self, diagnostic: Diagnostic) {
        if self.fatal.is_none() {
            self.fatal = Some(diagnostic);
        }
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty() && self.fatal.is_none()
    }

    /// Finish collection, returning the recoverable diagnostics and the
    /// fatal one.
    pub fn finish(self) -> (Vec<Diagnostic>, Option<Diagnostic>) {
        (self.diagnostics, self.fatal)
    }

    /// Finish collection and convert to a result.
    pub fn into_result(self) -> Result<(), ParseError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ParseError::new(self.diagnostics, self.fatal))
        }
    }
}
