//! Grammar functions for D2 sources.
//!
//! One method per construct, all sharing a single [`Cursor`]. Each method
//! resolves its own lookahead before returning and reports problems to the
//! [`DiagnosticCollector`] instead of failing, so a malformed child never
//! stops its siblings from being parsed.

mod dedent;
mod number;
mod string;

use std::{borrow::Cow, io};

use log::trace;

use crate::{
    ast::{
        Array, ArrayNode, Arrowhead, BlockComment, Boolean, Comment, Edge, EdgeIndex,
        EdgeIndexValue, InterpolationSegment, Key, KeyPath, Map, MapNode, Node, Null, Number,
        Scalar, StringNode, Substitution, UnquotedString, Value,
    },
    cursor::Cursor,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    position::Position,
};

pub(crate) struct Parser<I> {
    cursor: Cursor<I>,
    diagnostics: DiagnosticCollector,
    in_edge_group: bool,
    depth: usize,
    max_depth: usize,
}

impl<I> Parser<I>
where
    I: Iterator<Item = io::Result<char>>,
{
    pub fn new(cursor: Cursor<I>, max_depth: usize) -> Self {
        Self {
            cursor,
            diagnostics: DiagnosticCollector::new(),
            in_edge_group: false,
            depth: 0,
            max_depth,
        }
    }

    /// Stop parsing and hand back everything that was reported.
    pub fn finish(mut self) -> DiagnosticCollector {
        if let Some(err) = self.cursor.take_io_error() {
            self.diagnostics.emit_fatal(err);
        }
        self.diagnostics
    }

    fn error(
        &mut self,
        code: ErrorCode,
        start: Position,
        end: Position,
        message: impl Into<String>,
    ) {
        let range = self.cursor.range(start, end);
        self.diagnostics.emit(Diagnostic::new(code, range, message));
    }

    fn error_with_help(
        &mut self,
        code: ErrorCode,
        start: Position,
        end: Position,
        message: impl Into<String>,
        help: &str,
    ) {
        let range = self.cursor.range(start, end);
        self.diagnostics
            .emit(Diagnostic::new(code, range, message).with_help(help));
    }

    fn pos(&self) -> Position {
        self.cursor.pos()
    }

    /// `pos` stepped back over `c`.
    fn before(&self, pos: Position, c: char) -> Position {
        pos.subtract(c, self.cursor.utf16())
    }

    /// Consume `delimiter` if the input continues with it.
    fn peek_delimiter(&mut self, delimiter: &str) -> bool {
        match self.cursor.peek_n(delimiter.chars().count()) {
            Some(s) if s == delimiter => {
                self.cursor.commit();
                true
            }
            Some(_) => {
                self.cursor.rewind();
                false
            }
            None => false,
        }
    }

    pub fn parse_file_map(&mut self) -> Map {
        self.parse_map(true)
    }

    fn parse_map(&mut self, is_file_map: bool) -> Map {
        let start = if is_file_map {
            self.pos()
        } else {
            self.before(self.pos(), '{')
        };
        let mut map = Map::new(self.cursor.range(start, start));

        if !is_file_map {
            if self.depth >= self.max_depth {
                self.skip_too_deep(start, '{', '}', ErrorCode::E001, UNTERMINATED_MAP);
                map.range.end = self.pos();
                return map;
            }
            self.depth += 1;
        }

        loop {
            let Some(c) = self.cursor.read_not_space() else {
                if !is_file_map {
                    let end = self.cursor.read_end();
                    self.error(ErrorCode::E001, start, end, UNTERMINATED_MAP);
                }
                break;
            };

            match c {
                ';' => continue,
                '}' if is_file_map => {
                    let end = self.pos();
                    self.error_with_help(
                        ErrorCode::E004,
                        self.before(end, c),
                        end,
                        "unexpected map termination character } in file map",
                        "remove the `}` or open a map with `{`",
                    );
                    continue;
                }
                '}' => break,
                _ => {}
            }

            let node = self.parse_map_node(c);
            if matches!(node, Some(MapNode::BlockComment(_))) {
                // Anything may follow a block comment.
                map.nodes.extend(node);
                continue;
            }

            let kind = node.as_ref().map(|node| match node {
                MapNode::Key(Key {
                    value: Some(value), ..
                }) => value.type_name(),
                node => node.type_name(),
            });
            map.nodes.extend(node);
            self.consume_trailing_text(kind, '}', "invalid text beginning unquoted key");
        }

        if !is_file_map {
            self.depth -= 1;
        }
        map.range.end = self.pos();
        map
    }

    /// Consume the rest of the line after a node, reporting it if non-empty.
    fn consume_trailing_text(
        &mut self,
        kind: Option<Cow<'static, str>>,
        close: char,
        fallback: &str,
    ) {
        let after = self.pos();
        loop {
            match self.cursor.peek_not_space() {
                Some((c, 0)) if c != ';' && c != close && c != '#' => self.cursor.commit(),
                Some(_) => {
                    self.cursor.rewind();
                    break;
                }
                None => break,
            }
        }

        let end = self.pos();
        if after != end {
            let message = match kind {
                Some(kind) => format!("unexpected text after {kind}"),
                None => fallback.to_string(),
            };
            self.error(ErrorCode::E003, after, end, message);
        }
    }

    /// Skip a container that would nest deeper than allowed, up to its
    /// balancing close character.
    fn skip_too_deep(
        &mut self,
        start: Position,
        open: char,
        close: char,
        unterminated_code: ErrorCode,
        unterminated: &str,
    ) {
        trace!(
            depth = self.depth,
            start = start.to_string();
            "Skipping container nested too deep"
        );
        let end = self.pos();
        self.error_with_help(
            ErrorCode::E006,
            start,
            end,
            "maximum nesting depth exceeded",
            "flatten the nesting or raise `max_depth`",
        );

        let mut nesting = 1usize;
        while let Some(c) = self.cursor.read() {
            if c == open {
                nesting += 1;
            } else if c == close {
                nesting -= 1;
                if nesting == 0 {
                    return;
                }
            }
        }
        let end = self.cursor.read_end();
        self.error(unterminated_code, start, end, unterminated);
    }

    fn parse_map_node(&mut self, c: char) -> Option<MapNode> {
        match c {
            '#' => return Some(MapNode::Comment(self.parse_comment())),
            '"' if self.peek_delimiter("\"\"") => {
                return Some(MapNode::BlockComment(self.parse_block_comment()));
            }
            '.' if self.peek_delimiter("..$") => {
                return self.parse_substitution(true).map(MapNode::Substitution);
            }
            _ => {}
        }

        self.cursor.replay(c);
        self.parse_map_key().map(MapNode::Key)
    }

    fn parse_comment(&mut self) -> Comment {
        let start = self.before(self.pos(), '#');
        let mut value = String::new();
        self.parse_comment_line(&mut value);

        while let Some((c, newlines)) = self.cursor.peek_not_space() {
            if c != '#' || newlines >= 2 {
                self.cursor.rewind();
                break;
            }
            self.cursor.commit();
            if newlines == 1 {
                value.push('\n');
            }
            self.parse_comment_line(&mut value);
        }

        Comment {
            range: self.cursor.range(start, self.pos()),
            value,
        }
    }

    fn parse_comment_line(&mut self, value: &mut String) {
        let mut first = true;
        while let Some(c) = self.cursor.peek() {
            if c == '\n' {
                self.cursor.rewind();
                return;
            }
            self.cursor.commit();

            if std::mem::take(&mut first) && c == ' ' {
                continue;
            }
            value.push(c);
        }
    }

    fn parse_block_comment(&mut self) -> BlockComment {
        let start = self
            .pos()
            .subtract_str("\"\"\"", self.cursor.utf16());

        self.depth += 1;
        let value = self.scan_block_comment(start);
        self.depth -= 1;

        BlockComment {
            range: self.cursor.range(start, self.pos()),
            value: dedent::dedent(&value),
        }
    }

    fn scan_block_comment(&mut self, start: Position) -> String {
        let mut value = String::new();

        // Leading whitespace up to and including the first newline.
        loop {
            match self.cursor.peek() {
                None => {
                    self.unterminated_block_comment(start);
                    return value;
                }
                Some(c) if !c.is_whitespace() => {
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

        loop {
            let Some(c) = self.cursor.read() else {
                self.unterminated_block_comment(start);
                return value;
            };
            if c != '"' {
                value.push(c);
                continue;
            }

            match self.cursor.peek_n(2) {
                None => {
                    self.unterminated_block_comment(start);
                    return value;
                }
                Some(s) if s == "\"\"" => {
                    self.cursor.commit();
                    return value;
                }
                Some(_) => {
                    value.push('"');
                    self.cursor.rewind();
                }
            }
        }
    }

    fn unterminated_block_comment(&mut self, start: Position) {
        let end = self.cursor.read_end();
        self.error(
            ErrorCode::E013,
            start,
            end,
            "block comments must be terminated with \"\"\"",
        );
    }

    pub fn parse_map_key(&mut self) -> Option<Key> {
        let start = self.pos();
        let mut key = Key::new(self.cursor.range(start, start));
        self.parse_map_key_parts(&mut key);
        key.range.end = self.pos();

        (key.key.is_some() || !key.edges.is_empty()).then_some(key)
    }

    fn parse_map_key_parts(&mut self, key: &mut Key) {
        match self.cursor.peek() {
            None => return,
            Some('&') => {
                self.cursor.commit();
                key.ampersand = true;
            }
            Some(_) => self.cursor.rewind(),
        }

        match self.cursor.peek() {
            None => return,
            Some('(') => {
                self.cursor.commit();
                self.parse_edge_group(key);
                return;
            }
            Some(_) => self.cursor.rewind(),
        }

        key.key = self.parse_key();

        let Some((c, newlines)) = self.cursor.peek_not_space() else {
            return;
        };
        if newlines > 0 {
            self.cursor.rewind();
            return;
        }
        match c {
            '(' => {
                self.cursor.commit();
                self.parse_edge_group(key);
            }
            '<' | '>' | '-' => {
                self.cursor.rewind();
                let src = key.key.take();
                self.parse_edges(key, src);
                self.parse_map_key_value(key);
            }
            _ => {
                self.cursor.rewind();
                self.parse_map_key_value(key);
            }
        }
    }

    fn parse_map_key_value(&mut self, key: &mut Key) {
        let Some((c, newlines)) = self.cursor.peek_not_space() else {
            return;
        };
        if newlines > 0 {
            self.cursor.rewind();
            return;
        }

        let has_key = key.key.is_some() || !key.edges.is_empty();
        match c {
            '{' => {
                self.cursor.rewind();
                if !has_key {
                    return;
                }
            }
            ':' => {
                self.cursor.commit();
                if !has_key {
                    let end = self.pos();
                    self.error(ErrorCode::E020, key.range.start, end, "map value without key");
                }
            }
            _ => {
                self.cursor.rewind();
                return;
            }
        }

        key.value = self.parse_value();
        let Some(Value::Scalar(_)) = key.value else {
            if key.value.is_none() {
                let end = self.pos();
                self.error(
                    ErrorCode::E021,
                    self.before(end, ':'),
                    end,
                    "missing value after colon",
                );
            }
            return;
        };

        // A scalar followed by `{` on the same line is the primary value of
        // a key that also has a map.
        match self.cursor.peek_not_space() {
            Some(('{', 0)) => {
                self.cursor.commit();
                self.cursor.replay('{');
                if let Some(Value::Scalar(primary)) = key.value.take() {
                    key.primary = Some(primary);
                }
                key.value = self.parse_value();
            }
            _ => self.cursor.rewind(),
        }
    }

    fn parse_edge_group(&mut self, key: &mut Key) {
        // Keeps unquoted keys from swallowing the closing parenthesis.
        self.in_edge_group = true;
        self.parse_edge_group_parts(key);
        self.in_edge_group = false;
    }

    fn parse_edge_group_parts(&mut self, key: &mut Key) {
        let src = self.parse_key();
        self.parse_edges(key, src);

        match self.cursor.peek_not_space() {
            Some((')', 0)) => self.cursor.commit(),
            _ => {
                self.cursor.rewind();
                let end = self.pos();
                self.error(
                    ErrorCode::E034,
                    key.range.start,
                    end,
                    "edge groups must be terminated with )",
                );
                return;
            }
        }

        match self.cursor.peek_not_space() {
            Some(('[', 0)) => {
                self.cursor.commit();
                key.edge_index = self.parse_edge_index();
            }
            Some((_, 0)) => self.cursor.rewind(),
            _ => {
                self.cursor.rewind();
                return;
            }
        }

        match self.cursor.peek_not_space() {
            Some(('.', 0)) => {
                self.cursor.commit();
                key.edge_key = self.parse_key();
            }
            Some((_, 0)) => self.cursor.rewind(),
            _ => {
                self.cursor.rewind();
                return;
            }
        }

        self.in_edge_group = false;
        self.parse_map_key_value(key);
    }

    fn parse_edge_index(&mut self) -> Option<EdgeIndex> {
        let start = self.before(self.pos(), '[');

        let value = match self.cursor.peek_not_space() {
            Some((c, 0)) if c.is_ascii_digit() => {
                self.cursor.commit();
                let mut digits = String::from(c);
                loop {
                    match self.cursor.peek_not_space() {
                        Some((']', 0)) => {
                            self.cursor.rewind();
                            break;
                        }
                        Some((c, 0)) => {
                            self.cursor.commit();
                            if c.is_ascii_digit() {
                                digits.push(c);
                            } else {
                                let end = self.pos();
                                self.error(
                                    ErrorCode::E036,
                                    self.before(end, c),
                                    end,
                                    "unexpected character in edge index",
                                );
                            }
                        }
                        _ => {
                            self.cursor.rewind();
                            self.unterminated_edge_index(start);
                            return None;
                        }
                    }
                }
                EdgeIndexValue::Int(digits.parse().unwrap_or(usize::MAX))
            }
            Some(('*', 0)) => {
                self.cursor.commit();
                EdgeIndexValue::Glob
            }
            Some((c, 0)) => {
                let end = self.cursor.peek_pos();
                self.cursor.rewind();
                self.error(
                    ErrorCode::E036,
                    self.before(end, c),
                    end,
                    "unexpected character in edge index",
                );
                self.unterminated_edge_index(start);
                return None;
            }
            _ => {
                self.cursor.rewind();
                self.unterminated_edge_index(start);
                return None;
            }
        };

        match self.cursor.peek_not_space() {
            Some((']', 0)) => self.cursor.commit(),
            _ => {
                self.cursor.rewind();
                self.unterminated_edge_index(start);
            }
        }

        Some(EdgeIndex {
            range: self.cursor.range(start, self.pos()),
            value,
        })
    }

    fn unterminated_edge_index(&mut self, start: Position) {
        let end = self.pos();
        self.error(ErrorCode::E035, start, end, "unterminated edge index");
    }

    /// Parse a chain of connections, the first one leaving `src`.
    fn parse_edges(&mut self, key: &mut Key, mut src: Option<KeyPath>) {
        loop {
            let Some((c, newlines)) = self.cursor.peek_not_space() else {
                return;
            };
            if newlines > 0 {
                self.cursor.rewind();
                return;
            }
            let src_arrow = match c {
                '<' => Arrowhead::Open,
                '*' => Arrowhead::Filled,
                '-' => Arrowhead::None,
                _ => {
                    self.cursor.rewind();
                    return;
                }
            };

            let start = match &src {
                Some(src) => src.range.start,
                None => {
                    let arrow_end = self.cursor.peek_pos();
                    let arrow_start = self.before(arrow_end, c);
                    self.error(
                        ErrorCode::E030,
                        arrow_start,
                        arrow_end,
                        "connection missing source",
                    );
                    arrow_start
                }
            };
            self.cursor.commit();

            let mut edge = Edge {
                range: self.cursor.range(start, start),
                src,
                src_arrow,
                dst: None,
                dst_arrow: Arrowhead::None,
            };
            let terminated = self.parse_edge(&mut edge);
            edge.range.end = self.pos();
            if !terminated {
                return;
            }

            let dst = self.parse_key();
            match &dst {
                Some(dst) => edge.range.end = dst.range.end,
                None => {
                    let end = self.pos();
                    self.error(
                        ErrorCode::E031,
                        edge.range.start,
                        end,
                        "connection missing destination",
                    );
                }
            }
            edge.dst = dst.clone();
            key.edges.push(edge);
            src = dst;
        }
    }

    /// Consume the `-` run of a connection and its destination arrowhead.
    ///
    /// Returns `false` if the connection is broken beyond recovery.
    fn parse_edge(&mut self, edge: &mut Edge) -> bool {
        loop {
            let Some(c) = self.cursor.peek() else {
                let end = self.cursor.read_end();
                self.error(ErrorCode::E032, edge.range.start, end, "unterminated connection");
                return false;
            };

            match c {
                '>' | '*' => {
                    edge.dst_arrow = if c == '>' {
                        Arrowhead::Open
                    } else {
                        Arrowhead::Filled
                    };
                    self.cursor.commit();
                    return true;
                }
                '\\' => {
                    self.cursor.commit();
                    match self.cursor.peek_not_space() {
                        None => {}
                        Some((_, 0)) => {
                            self.cursor.rewind();
                            let end = self.cursor.read_end();
                            self.error(
                                ErrorCode::E033,
                                edge.range.start,
                                end,
                                "only newline escapes are allowed in connections",
                            );
                            return false;
                        }
                        Some((next, 1)) => {
                            self.cursor.commit();
                            self.cursor.replay(next);
                        }
                        Some(_) => self.cursor.rewind(),
                    }
                }
                '-' => self.cursor.commit(),
                _ => {
                    self.cursor.rewind();
                    return true;
                }
            }
        }
    }

    /// Parse a `.` separated key path.
    pub fn parse_key(&mut self) -> Option<KeyPath> {
        let start = self.pos();
        let mut path = Vec::new();

        loop {
            let Some((c, newlines)) = self.cursor.peek_not_space() else {
                break;
            };
            self.cursor.rewind();
            if newlines > 0 || c == '(' {
                break;
            }

            let Some(segment) = self.parse_string(true) else {
                break;
            };
            path.push(segment);

            match self.cursor.peek_not_space() {
                Some(('.', 0)) => self.cursor.commit(),
                _ => {
                    self.cursor.rewind();
                    break;
                }
            }
        }

        if path.is_empty() {
            return None;
        }
        Some(KeyPath {
            range: self.cursor.range(start, self.pos()),
            path,
        })
    }

    fn parse_array(&mut self) -> Array {
        let start = self.before(self.pos(), '[');
        let mut array = Array::new(self.cursor.range(start, start));

        if self.depth >= self.max_depth {
            self.skip_too_deep(start, '[', ']', ErrorCode::E002, UNTERMINATED_ARRAY);
            array.range.end = self.pos();
            return array;
        }
        self.depth += 1;

        loop {
            let Some(c) = self.cursor.read_not_space() else {
                let end = self.cursor.read_end();
                self.error(ErrorCode::E002, start, end, UNTERMINATED_ARRAY);
                break;
            };

            match c {
                ';' => continue,
                ']' => break,
                _ => {}
            }

            let node = self.parse_array_node(c);
            if matches!(node, Some(ArrayNode::BlockComment(_))) {
                array.nodes.extend(node);
                continue;
            }

            let kind = node.as_ref().map(Node::type_name);
            array.nodes.extend(node);
            self.consume_trailing_text(kind, ']', "invalid text beginning unquoted string");
        }

        self.depth -= 1;
        array.range.end = self.pos();
        array
    }

    fn parse_array_node(&mut self, c: char) -> Option<ArrayNode> {
        match c {
            '#' => return Some(ArrayNode::Comment(self.parse_comment())),
            '"' if self.peek_delimiter("\"\"") => {
                return Some(ArrayNode::BlockComment(self.parse_block_comment()));
            }
            '.' if self.peek_delimiter("..$") => {
                return self.parse_substitution(true).map(ArrayNode::Substitution);
            }
            _ => {}
        }

        self.cursor.replay(c);
        let value = self.parse_value();
        if value.is_none() {
            // Skip the offending character so it is reported once.
            let start = self.pos();
            self.cursor.read();
            let end = self.pos();
            self.error(
                ErrorCode::E005,
                start,
                end,
                format!("unquoted strings cannot start on {c:?}"),
            );
        }
        value.map(ArrayNode::Value)
    }

    /// Parse a scalar, array or map value.
    pub fn parse_value(&mut self) -> Option<Value> {
        let Some((c, newlines)) = self.cursor.peek_not_space() else {
            return None;
        };
        if newlines > 0 {
            self.cursor.rewind();
            return None;
        }
        self.cursor.commit();

        match c {
            '[' => return Some(Value::Array(self.parse_array())),
            '{' => return Some(Value::Map(self.parse_map(false))),
            _ => {}
        }

        self.cursor.replay(c);
        match self.parse_string(false)? {
            StringNode::Unquoted(s) => Some(Value::Scalar(classify(s))),
            string => Some(string.into()),
        }
    }

    fn parse_substitution(&mut self, spread: bool) -> Option<Substitution> {
        let mut start = self.before(self.pos(), '$');
        if spread {
            start = start.subtract_str("...", self.cursor.utf16());
        }

        let (c, newlines) = self.cursor.peek_not_space()?;
        if newlines > 0 {
            self.cursor.rewind();
            return None;
        }
        if c != '{' {
            self.cursor.rewind();
            let end = self.cursor.read_end();
            self.error(ErrorCode::E040, start, end, "substitutions must begin on {");
            return None;
        }
        self.cursor.commit();

        let path = self.parse_key().map(|key| key.path).unwrap_or_default();

        match self.cursor.peek_not_space() {
            Some(('}', 0)) => self.cursor.commit(),
            Some(_) => {
                self.cursor.rewind();
                let end = self.pos();
                self.error(ErrorCode::E041, start, end, UNTERMINATED_SUBSTITUTION);
            }
            None => {
                let end = self.cursor.read_end();
                self.error(ErrorCode::E041, start, end, UNTERMINATED_SUBSTITUTION);
            }
        }

        Some(Substitution {
            range: self.cursor.range(start, self.pos()),
            spread,
            path,
        })
    }
}

const UNTERMINATED_MAP: &str = "maps must be terminated with }";
const UNTERMINATED_ARRAY: &str = "arrays must be terminated with ]";
const UNTERMINATED_SUBSTITUTION: &str = "substitutions must be terminated by }";

/// Turn an unquoted value into `null`, a boolean or a number where it reads
/// as one.
fn classify(s: UnquotedString) -> Scalar {
    let text = match s.value.as_slice() {
        [InterpolationSegment::String { value, .. }] => value.clone(),
        _ => return Scalar::String(StringNode::Unquoted(s)),
    };

    if text.eq_ignore_ascii_case("null") {
        return Scalar::Null(Null { range: s.range });
    }
    if text.eq_ignore_ascii_case("true") || text.eq_ignore_ascii_case("false") {
        let value = text.eq_ignore_ascii_case("true");
        return Scalar::Boolean(Boolean {
            range: s.range,
            value,
        });
    }
    if let Some(value) = number::parse_rational(&text) {
        return Scalar::Number(Number {
            range: s.range,
            raw: text,
            value,
        });
    }
    Scalar::String(StringNode::Unquoted(s))
}
