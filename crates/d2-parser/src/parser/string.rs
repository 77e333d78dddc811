//! The four string grammars.

use std::{io, mem};

use crate::{
    ast::{
        BlockString, DoubleQuotedString, InterpolationSegment, SingleQuotedString, StringNode,
        Substitution, UnquotedString,
    },
    error::ErrorCode,
    parser::{Parser, dedent},
};

const UNTERMINATED_DOUBLE_QUOTED: &str = "double quoted strings must be terminated with \"";
const UNTERMINATED_SINGLE_QUOTED: &str = "single quoted strings must be terminated with '";

/// Accumulates interpolation segments, keeping decoded and raw text apart.
#[derive(Default)]
struct Segments {
    segments: Vec<InterpolationSegment>,
    value: String,
    raw: String,
}

impl Segments {
    fn push(&mut self, c: char) {
        self.value.push(c);
        self.raw.push(c);
    }

    fn push_escape(&mut self, c: char) {
        self.value.push(decode_escape(c));
        self.raw.push('\\');
        self.raw.push(c);
    }

    fn push_substitution(&mut self, substitution: Substitution) {
        self.flush();
        self.segments
            .push(InterpolationSegment::Substitution(substitution));
    }

    fn flush(&mut self) {
        if self.value.is_empty() {
            return;
        }
        self.segments.push(InterpolationSegment::String {
            value: mem::take(&mut self.value),
            raw: mem::take(&mut self.raw),
        });
    }

    fn finish(mut self) -> Vec<InterpolationSegment> {
        self.flush();
        self.segments
    }

    /// Like [`Segments::finish`], dropping whitespace at the very end.
    fn finish_trimmed(mut self) -> Vec<InterpolationSegment> {
        let len = self.value.trim_end().len();
        self.value.truncate(len);
        let len = self.raw.trim_end().len();
        self.raw.truncate(len);
        self.finish()
    }
}

fn decode_escape(c: char) -> char {
    match c {
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0b',
        c => c,
    }
}

impl<I> Parser<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    /// Parse any string form. `in_key` applies the key terminators to
    /// unquoted strings and disables interpolation.
    pub(super) fn parse_string(&mut self, in_key: bool) -> Option<StringNode> {
        let (c, newlines) = self.cursor.peek_not_space()?;
        if newlines > 0 {
            self.cursor.rewind();
            return None;
        }
        self.cursor.commit();

        match c {
            '"' => Some(StringNode::DoubleQuoted(
                self.parse_double_quoted_string(in_key),
            )),
            '\'' => Some(StringNode::SingleQuoted(self.parse_single_quoted_string())),
            '|' => Some(StringNode::Block(self.parse_block_string())),
            _ => {
                self.cursor.replay(c);
                self.parse_unquoted_string(in_key).map(StringNode::Unquoted)
            }
        }
    }

    fn parse_unquoted_string(&mut self, in_key: bool) -> Option<UnquotedString> {
        let start = self.pos();
        let mut last_non_space = start;
        let mut text = Segments::default();

        while let Some(c) = self.cursor.peek() {
            if self.in_edge_group && c == ')' {
                // A `)` followed by more key text belongs to the key.
                match self.cursor.peek_not_space() {
                    Some((next, 0)) if !matches!(next, '#' | '{' | '}' | '[' | ']' | ':' | '.') => {
                        self.cursor.rewind();
                        self.cursor.peek();
                        self.cursor.commit();
                        last_non_space = self.pos();
                        text.push(c);
                        continue;
                    }
                    _ => {
                        self.cursor.rewind();
                        break;
                    }
                }
            }

            match c {
                '\n' | ';' | '#' | '{' | '}' | '[' | ']' => {
                    self.cursor.rewind();
                    break;
                }
                ':' | '.' | '<' | '>' if in_key => {
                    self.cursor.rewind();
                    break;
                }
                '-' | '*' if in_key => {
                    let Some(next) = self.cursor.peek() else {
                        break;
                    };
                    let connector = match c {
                        '-' => matches!(next, '-' | '>' | '*'),
                        _ => next == '-',
                    };
                    self.cursor.rewind();
                    if connector {
                        break;
                    }
                    self.cursor.peek();
                }
                _ => {}
            }
            self.cursor.commit();

            if !c.is_whitespace() {
                last_non_space = self.pos();
            }

            if !in_key && c == '$' {
                if let Some(substitution) = self.parse_substitution(false) {
                    text.push_substitution(substitution);
                    last_non_space = self.pos();
                    continue;
                }
            }

            if c != '\\' {
                text.push(c);
                continue;
            }

            let Some(escaped) = self.cursor.read() else {
                let end = self.cursor.read_end();
                self.error(
                    ErrorCode::E014,
                    self.before(self.pos(), '\\'),
                    end,
                    "unfinished escape sequence",
                );
                break;
            };

            if escaped == '\n' {
                // Line continuation: resume at the next line's first
                // non-space character.
                match self.cursor.peek_not_space() {
                    Some((next, 0)) => {
                        self.cursor.commit();
                        self.cursor.replay(next);
                    }
                    _ => {
                        self.cursor.rewind();
                        break;
                    }
                }
                continue;
            }

            text.push_escape(escaped);
            last_non_space = self.pos();
        }

        let value = text.finish_trimmed();
        if value.is_empty() {
            return None;
        }
        Some(UnquotedString {
            range: self.cursor.range(start, last_non_space),
            value,
        })
    }

    fn parse_double_quoted_string(&mut self, in_key: bool) -> DoubleQuotedString {
        let start = self.before(self.pos(), '"');
        let mut text = Segments::default();

        loop {
            let Some(c) = self.cursor.peek() else {
                let end = self.cursor.read_end();
                self.error(ErrorCode::E010, start, end, UNTERMINATED_DOUBLE_QUOTED);
                break;
            };
            if c == '\n' {
                self.cursor.rewind();
                let end = self.pos();
                self.error(ErrorCode::E010, start, end, UNTERMINATED_DOUBLE_QUOTED);
                break;
            }
            self.cursor.commit();

            if !in_key && c == '$' {
                if let Some(substitution) = self.parse_substitution(false) {
                    text.push_substitution(substitution);
                    continue;
                }
            }

            match c {
                '"' => break,
                '\\' => {}
                c => {
                    text.push(c);
                    continue;
                }
            }

            let Some(escaped) = self.cursor.read() else {
                let end = self.cursor.read_end();
                self.error(
                    ErrorCode::E014,
                    self.before(self.pos(), '\\'),
                    end,
                    "unfinished escape sequence",
                );
                self.error(ErrorCode::E010, start, end, UNTERMINATED_DOUBLE_QUOTED);
                break;
            };
            if escaped != '\n' {
                text.push_escape(escaped);
            }
        }

        DoubleQuotedString {
            range: self.cursor.range(start, self.pos()),
            value: text.finish(),
        }
    }

    fn parse_single_quoted_string(&mut self) -> SingleQuotedString {
        let start = self.before(self.pos(), '\'');
        let mut value = String::new();

        loop {
            let Some(c) = self.cursor.peek() else {
                let end = self.cursor.read_end();
                self.error(ErrorCode::E011, start, end, UNTERMINATED_SINGLE_QUOTED);
                break;
            };
            if c == '\n' {
                self.cursor.rewind();
                let end = self.pos();
                self.error(ErrorCode::E011, start, end, UNTERMINATED_SINGLE_QUOTED);
                break;
            }
            self.cursor.commit();

            if c == '\'' {
                // `''` is an escaped quote.
                match self.cursor.peek() {
                    Some('\'') => {
                        self.cursor.commit();
                        value.push('\'');
                        continue;
                    }
                    Some(_) => {
                        self.cursor.rewind();
                        break;
                    }
                    None => break,
                }
            }

            if c != '\\' {
                value.push(c);
                continue;
            }

            match self.cursor.peek() {
                Some('\n') => self.cursor.commit(),
                Some(_) => {
                    value.push('\\');
                    self.cursor.rewind();
                }
                None => {}
            }
        }

        SingleQuotedString {
            range: self.cursor.range(start, self.pos()),
            value,
        }
    }

    fn parse_block_string(&mut self) -> BlockString {
        let start = self.before(self.pos(), '|');
        let mut block = BlockString {
            range: self.cursor.range(start, start),
            quote: String::new(),
            tag: String::new(),
            value: String::new(),
        };

        self.depth += 1;
        let value = self.scan_block_string(&mut block);
        self.depth -= 1;

        block.value = dedent::dedent(&value);
        block.range.end = self.pos();
        block
    }

    /// Read the delimiter, tag and raw content of a block string.
    fn scan_block_string(&mut self, block: &mut BlockString) -> String {
        let mut value = String::new();

        loop {
            let Some(c) = self.cursor.peek() else {
                self.unterminated_block_string(block);
                return value;
            };
            if c.is_whitespace() || c.is_alphanumeric() || c == '_' {
                self.cursor.rewind();
                break;
            }
            self.cursor.commit();
            block.quote.push(c);
        }

        loop {
            let Some(c) = self.cursor.peek() else {
                self.unterminated_block_string(block);
                return value;
            };
            if c.is_whitespace() {
                self.cursor.rewind();
                break;
            }
            self.cursor.commit();
            block.tag.push(c);
        }
        if block.tag.is_empty() {
            block.tag.push_str("md");
        }

        // Whitespace up to the end of the opening line. Text on the opening
        // line is indented as if it started on the next one.
        loop {
            match self.cursor.peek() {
                None => {
                    self.unterminated_block_string(block);
                    return value;
                }
                Some(c) if !c.is_whitespace() => {
                    value.push_str(&" ".repeat(self.depth * 2));
                    self.cursor.rewind();
                    break;
                }
                Some(c) => {
                    self.cursor.commit();
                    if c == '\n' {
                        break;
                    }
                }
            }
        }

        let mut close = block.quote.chars().chain(['|']);
        let hint = close.next().unwrap_or('|');
        let rest: String = close.collect();
        let rest_len = rest.chars().count();

        loop {
            let Some(c) = self.cursor.read() else {
                self.unterminated_block_string(block);
                return value;
            };
            if c != hint {
                value.push(c);
                continue;
            }

            match self.cursor.peek_n(rest_len) {
                None => {
                    self.unterminated_block_string(block);
                    return value;
                }
                Some(s) if s == rest => {
                    self.cursor.commit();
                    return value;
                }
                Some(_) => {
                    value.push(hint);
                    self.cursor.rewind();
                }
            }
        }
    }

    fn unterminated_block_string(&mut self, block: &BlockString) {
        let end = self.cursor.read_end();
        self.error(
            ErrorCode::E012,
            block.range.start,
            end,
            format!("block string must be terminated with {}|", block.quote),
        );
    }
}
