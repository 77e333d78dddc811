//! Character cursor with speculative lookahead.
//!
//! The grammar is written against a handful of operations:
//!
//! - [`Cursor::read`] consumes one character.
//! - [`Cursor::peek`] looks at the next character without consuming it.
//! - [`Cursor::commit`] consumes everything peeked so far.
//! - [`Cursor::rewind`] forgets everything peeked so far.
//! - [`Cursor::replay`] pushes one consumed character back.
//!
//! Every run of peeks must be resolved by exactly one commit or rewind before
//! the grammar makes its next decision. When a peek or read hits the end of
//! the source, the pending lookahead is rewound automatically.
//!
//! End of input is sticky: once the source has returned `None` or an error it
//! is never polled again.

use std::{collections::VecDeque, io, sync::Arc};

use log::trace;

use crate::{
    error::{Diagnostic, ErrorCode},
    position::{Position, Range},
};

pub(crate) struct Cursor<I> {
    source: I,
    label: Arc<str>,
    utf16: bool,

    /// Position after every committed character.
    pos: Position,
    /// Position after every committed and peeked character.
    peek_pos: Position,
    /// Position after every character pulled from the source.
    read_end: Position,

    /// Characters pulled from the source and not yet committed. The first
    /// `peeked` of them are the current lookahead.
    pending: VecDeque<char>,
    peeked: usize,

    eof: bool,
    io_error: Option<Diagnostic>,
}

impl<I> Cursor<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    pub fn new(label: Arc<str>, source: I, utf16: bool) -> Self {
        Self {
            source,
            label,
            utf16,
            pos: Position::default(),
            peek_pos: Position::default(),
            read_end: Position::default(),
            pending: VecDeque::new(),
            peeked: 0,
            eof: false,
            io_error: None,
        }
    }

    pub fn utf16(&self) -> bool {
        self.utf16
    }

    /// Position after the last committed character.
    pub fn pos(&self) -> Position {
        self.pos
    }

    /// Position after the last peeked character.
    pub fn peek_pos(&self) -> Position {
        self.peek_pos
    }

    /// Position after the last character taken from the source. At end of
    /// input this is the end of the source.
    pub fn read_end(&self) -> Position {
        self.read_end
    }

    /// The diagnostic for a failed source, if any.
    pub fn take_io_error(&mut self) -> Option<Diagnostic> {
        self.io_error.take()
    }

    fn pull(&mut self) -> Option<char> {
        if self.eof {
            return None;
        }
        match self.source.next() {
            Some(Ok(c)) => {
                self.read_end = self.read_end.advance(c, self.utf16);
                Some(c)
            }
            Some(Err(err)) => {
                self.eof = true;
                trace!(
                    label = self.label.as_ref(),
                    error = err.to_string();
                    "Character source failed"
                );
                self.io_error = Some(Diagnostic::new(
                    ErrorCode::E090,
                    Range::at(&self.label, self.read_end),
                    format!("io error: {err}"),
                ));
                None
            }
            None => {
                self.eof = true;
                None
            }
        }
    }

    /// Consume the next character.
    pub fn read(&mut self) -> Option<char> {
        debug_assert_eq!(self.peeked, 0, "read with unresolved lookahead");
        let c = match self.pending.pop_front() {
            Some(c) => c,
            None => match self.pull() {
                Some(c) => c,
                None => {
                    self.rewind();
                    return None;
                }
            },
        };
        self.pos = self.pos.advance(c, self.utf16);
        self.peek_pos = self.pos;
        Some(c)
    }

    /// Look at the next character after the current lookahead.
    pub fn peek(&mut self) -> Option<char> {
        let c = match self.pending.get(self.peeked) {
            Some(&c) => c,
            None => match self.pull() {
                Some(c) => {
                    self.pending.push_back(c);
                    c
                }
                None => {
                    self.rewind();
                    return None;
                }
            },
        };
        self.peeked += 1;
        self.peek_pos = self.peek_pos.advance(c, self.utf16);
        Some(c)
    }

    /// Peek `n` characters. Returns `None` at end of input.
    pub fn peek_n(&mut self, n: usize) -> Option<String> {
        let mut s = String::with_capacity(n);
        for _ in 0..n {
            s.push(self.peek()?);
        }
        Some(s)
    }

    /// Consume characters up to and including the next non-whitespace one.
    pub fn read_not_space(&mut self) -> Option<char> {
        loop {
            let c = self.read()?;
            if !c.is_whitespace() {
                return Some(c);
            }
        }
    }

    /// Peek past whitespace to the next non-whitespace character, returning
    /// it with the number of newlines skipped.
    pub fn peek_not_space(&mut self) -> Option<(char, usize)> {
        let mut newlines = 0;
        loop {
            let c = self.peek()?;
            if !c.is_whitespace() {
                return Some((c, newlines));
            }
            if c == '\n' {
                newlines += 1;
            }
        }
    }

    /// Consume the current lookahead.
    pub fn commit(&mut self) {
        self.pending.drain(..self.peeked);
        self.peeked = 0;
        self.pos = self.peek_pos;
    }

    /// Drop the current lookahead so it is seen again.
    pub fn rewind(&mut self) {
        self.peeked = 0;
        self.peek_pos = self.pos;
    }

    /// Push `c`, the last consumed character, back in front of the input.
    pub fn replay(&mut self, c: char) {
        self.rewind();
        self.pending.push_front(c);
        self.pos = self.pos.subtract(c, self.utf16);
        self.peek_pos = self.pos;
    }

    /// A range from `start` to `end` in this source.
    pub fn range(&self, start: Position, end: Position) -> Range {
        Range::new(Arc::clone(&self.label), start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor(s: &str) -> Cursor<impl Iterator<Item = io::Result<char>> + '_> {
        Cursor::new(Arc::from("test"), s.chars().map(Ok), false)
    }

    #[test]
    fn test_read_advances() {
        let mut c = cursor("ab\nc");

        assert_eq!(c.read(), Some('a'));
        assert_eq!(c.read(), Some('b'));
        assert_eq!(c.read(), Some('\n'));
        assert_eq!(c.pos(), Position::new(1, 0, 3));
        assert_eq!(c.read(), Some('c'));
        assert_eq!(c.read(), None);
        assert_eq!(c.read(), None);
        assert_eq!(c.pos(), Position::new(1, 1, 4));
    }

    #[test]
    fn test_peek_rewind_and_commit() {
        let mut c = cursor("abc");

        assert_eq!(c.peek(), Some('a'));
        assert_eq!(c.peek(), Some('b'));
        c.rewind();
        assert_eq!(c.pos(), Position::default());

        assert_eq!(c.peek(), Some('a'));
        c.commit();
        assert_eq!(c.pos(), Position::new(0, 1, 1));
        assert_eq!(c.read(), Some('b'));
        assert_eq!(c.read(), Some('c'));
    }

    #[test]
    fn test_peek_at_eof_rewinds() {
        let mut c = cursor("ab");

        assert_eq!(c.peek_n(3), None);
        assert_eq!(c.peek_pos(), Position::default());
        assert_eq!(c.read_end(), Position::new(0, 2, 2));
        assert_eq!(c.read(), Some('a'));
    }

    #[test]
    fn test_replay_pushes_back() {
        let mut c = cursor("xy");

        assert_eq!(c.read(), Some('x'));
        c.replay('x');
        assert_eq!(c.pos(), Position::default());
        assert_eq!(c.read(), Some('x'));
        assert_eq!(c.read(), Some('y'));
    }

    #[test]
    fn test_replay_keeps_lookahead_order() {
        let mut c = cursor("abc");

        assert_eq!(c.read(), Some('a'));
        assert_eq!(c.peek(), Some('b'));
        c.replay('a');
        assert_eq!(c.peek_n(3).as_deref(), Some("abc"));
    }

    #[test]
    fn test_peek_not_space_counts_newlines() {
        let mut c = cursor("  \n \n x");

        assert_eq!(c.peek_not_space(), Some(('x', 2)));
        c.rewind();
        assert_eq!(c.read_not_space(), Some('x'));
        assert_eq!(c.peek_not_space(), None);
    }

    #[test]
    fn test_utf16_positions() {
        let mut c = Cursor::new(Arc::from("t"), "é😀".chars().map(Ok), true);

        c.read();
        c.read();
        assert_eq!(c.pos(), Position::new(0, 3, 3));
    }

    #[test]
    fn test_io_error_is_sticky_eof() {
        let source = vec![
            Ok('a'),
            Err(io::Error::other("boom")),
            Ok('b'),
        ];
        let mut c = Cursor::new(Arc::from("t"), source.into_iter(), false);

        assert_eq!(c.read(), Some('a'));
        assert_eq!(c.read(), None);
        assert_eq!(c.read(), None);

        let err = c.take_io_error().unwrap();
        assert_eq!(err.code(), ErrorCode::E090);
        assert_eq!(err.message(), "io error: boom");
        assert_eq!(err.range().start, Position::new(0, 1, 1));
    }
}
