//! String nodes and quoting rules.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::{
    ast::{Node, Substitution, impl_node},
    position::Range,
};

/// Characters that force quoting when they appear in a key.
const KEY_SPECIALS: &[char] = &[
    '#', ';', '\n', '\\', '{', '}', '[', ']', '\'', '"', '|', ':', '.', '-', '<', '>', '*', '&',
    '(', ')',
];

/// Characters that force quoting when they appear in a value.
const VALUE_SPECIALS: &[char] = &[
    '#', ';', '\n', '\\', '{', '}', '[', ']', '\'', '"', '|', '$',
];

/// A piece of an interpolated string: literal text or a `${path}` substitution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationSegment {
    /// Literal text. `value` is decoded; `raw` is the text as written, with
    /// escapes intact.
    String { value: String, raw: String },
    Substitution(Substitution),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnquotedString {
    pub range: Range,
    pub value: Vec<InterpolationSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoubleQuotedString {
    pub range: Range,
    pub value: Vec<InterpolationSegment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleQuotedString {
    pub range: Range,
    pub value: String,
}

/// A `|`-delimited multi-line string.
///
/// `quote` holds the delimiter characters between the opening `|` and the
/// tag; the string is closed by `quote` followed by `|`. The tag defaults to
/// `md`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockString {
    pub range: Range,
    pub quote: String,
    pub tag: String,
    pub value: String,
}

impl_node!(UnquotedString, "unquoted string");
impl_node!(DoubleQuotedString, "double quoted string");
impl_node!(SingleQuotedString, "single quoted string");

impl Node for BlockString {
    fn range(&self) -> &Range {
        &self.range
    }

    fn type_name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("{} block string", self.tag))
    }
}

/// Any of the four string forms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringNode {
    Unquoted(UnquotedString),
    DoubleQuoted(DoubleQuotedString),
    SingleQuoted(SingleQuotedString),
    Block(BlockString),
}

impl StringNode {
    /// Chooses the least quoted form that represents `s` faithfully.
    ///
    /// `in_key` selects the stricter key rules. The returned node has a
    /// default range.
    pub fn raw(s: &str, in_key: bool) -> StringNode {
        if needs_quotes(s, in_key) {
            if !s.contains('"') && !(!in_key && s.contains('$')) || s.contains('\n') {
                return StringNode::double_quoted(s);
            }
            return StringNode::SingleQuoted(SingleQuotedString {
                range: Range::default(),
                value: s.to_string(),
            });
        }
        if s.is_empty() || s.trim() != s {
            return StringNode::double_quoted(s);
        }
        StringNode::Unquoted(UnquotedString {
            range: Range::default(),
            value: vec![literal(s)],
        })
    }

    fn double_quoted(s: &str) -> StringNode {
        StringNode::DoubleQuoted(DoubleQuotedString {
            range: Range::default(),
            value: vec![literal(s)],
        })
    }

    /// The decoded text of the first literal segment, or `""` if the string
    /// starts with a substitution.
    pub fn scalar_string(&self) -> &str {
        match self {
            StringNode::Unquoted(s) => first_literal(&s.value),
            StringNode::DoubleQuoted(s) => first_literal(&s.value),
            StringNode::SingleQuoted(s) => &s.value,
            StringNode::Block(s) => &s.value,
        }
    }

    /// Replaces the content with a single literal segment of `value`,
    /// keeping the string form.
    pub fn set_string(&mut self, value: &str) {
        match self {
            StringNode::Unquoted(s) => s.value = vec![literal(value)],
            StringNode::DoubleQuoted(s) => s.value = vec![literal(value)],
            StringNode::SingleQuoted(s) => s.value = value.to_string(),
            StringNode::Block(s) => s.value = value.to_string(),
        }
    }

    /// The interpolation segments, for the forms that support them.
    pub fn segments(&self) -> Option<&[InterpolationSegment]> {
        match self {
            StringNode::Unquoted(s) => Some(&s.value),
            StringNode::DoubleQuoted(s) => Some(&s.value),
            _ => None,
        }
    }
}

impl Node for StringNode {
    fn range(&self) -> &Range {
        match self {
            StringNode::Unquoted(n) => n.range(),
            StringNode::DoubleQuoted(n) => n.range(),
            StringNode::SingleQuoted(n) => n.range(),
            StringNode::Block(n) => n.range(),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            StringNode::Unquoted(n) => n.type_name(),
            StringNode::DoubleQuoted(n) => n.type_name(),
            StringNode::SingleQuoted(n) => n.type_name(),
            StringNode::Block(n) => n.type_name(),
        }
    }
}

fn literal(s: &str) -> InterpolationSegment {
    InterpolationSegment::String {
        value: s.to_string(),
        raw: String::new(),
    }
}

fn first_literal(segments: &[InterpolationSegment]) -> &str {
    match segments.first() {
        Some(InterpolationSegment::String { value, .. }) => value,
        _ => "",
    }
}

fn needs_quotes(s: &str, in_key: bool) -> bool {
    if in_key {
        let mut chars = s.chars().enumerate().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                // A lone dash is fine; only `--` style runs and a trailing
                // dash read as connection syntax.
                '-' if chars.peek().is_some_and(|&(_, next)| next != '-') => continue,
                '&' if i > 0 => continue,
                _ => {}
            }
            if KEY_SPECIALS.contains(&c) {
                return true;
            }
        }
        false
    } else {
        s.eq_ignore_ascii_case("null") || s.contains(VALUE_SPECIALS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(node: &StringNode) -> &'static str {
        match node {
            StringNode::Unquoted(_) => "unquoted",
            StringNode::DoubleQuoted(_) => "double",
            StringNode::SingleQuoted(_) => "single",
            StringNode::Block(_) => "block",
        }
    }

    #[test]
    fn test_raw_key_quoting() {
        assert_eq!(kind(&StringNode::raw("hello", true)), "unquoted");
        assert_eq!(kind(&StringNode::raw("a-b", true)), "unquoted");
        assert_eq!(kind(&StringNode::raw("a--b", true)), "double");
        assert_eq!(kind(&StringNode::raw("a-", true)), "double");
        assert_eq!(kind(&StringNode::raw("a&b", true)), "unquoted");
        assert_eq!(kind(&StringNode::raw("&a", true)), "double");
        assert_eq!(kind(&StringNode::raw("a.b", true)), "double");
        assert_eq!(kind(&StringNode::raw("say \"hi\".", true)), "single");
        assert_eq!(kind(&StringNode::raw("say \"hi\"\n", true)), "double");
    }

    #[test]
    fn test_raw_value_quoting() {
        assert_eq!(kind(&StringNode::raw("a.b", false)), "unquoted");
        assert_eq!(kind(&StringNode::raw("NULL", false)), "double");
        assert_eq!(kind(&StringNode::raw("${x}", false)), "single");
        assert_eq!(kind(&StringNode::raw("a;b", false)), "double");
        assert_eq!(kind(&StringNode::raw(" padded ", false)), "double");
        assert_eq!(kind(&StringNode::raw("", false)), "double");
    }

    #[test]
    fn test_set_string_keeps_form() {
        let mut node = StringNode::raw("x", true);
        node.set_string("y");

        assert_eq!(kind(&node), "unquoted");
        assert_eq!(node.scalar_string(), "y");
    }

    #[test]
    fn test_scalar_string_of_substitution_first() {
        let node = StringNode::Unquoted(UnquotedString {
            range: Range::default(),
            value: vec![InterpolationSegment::Substitution(Substitution {
                range: Range::default(),
                spread: false,
                path: Vec::new(),
            })],
        });

        assert_eq!(node.scalar_string(), "");
    }
}
