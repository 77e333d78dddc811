//! Abstract syntax tree for D2 sources.
//!
//! The tree is a closed set of node types, each carrying the [`Range`] it was
//! parsed from. Containers own their children in source order:
//!
//! - [`Map`] holds [`MapNode`]s: comments, spread substitutions and [`Key`]s.
//! - [`Array`] holds [`ArrayNode`]s: comments, spread substitutions and values.
//! - A [`Key`] may hold a [`Value`]: a [`Scalar`], an [`Array`] or a [`Map`].
//!
//! All nodes are plain owned data. Once returned from the parser nothing
//! mutates them except the editing helpers on [`Map`] and [`Key`].

mod container;
mod key;
mod scalar;
mod string;

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::position::Range;

pub use container::{Array, Map};
pub use key::{Arrowhead, Edge, EdgeIndex, EdgeIndexValue, Key, KeyPath, Substitution};
pub use scalar::{BlockComment, Boolean, Comment, Null, Number};
pub use string::{
    BlockString, DoubleQuotedString, InterpolationSegment, SingleQuotedString, StringNode,
    UnquotedString,
};

/// Behaviour shared by every node in the tree.
pub trait Node {
    /// The range the node occupies in its source.
    fn range(&self) -> &Range;

    /// The user facing name of the node kind, as used in diagnostics.
    fn type_name(&self) -> Cow<'static, str>;
}

/// Implements [`Node`] for a struct with a `range` field and a fixed name.
macro_rules! impl_node {
    ($ty:ty, $name:literal) => {
        impl $crate::ast::Node for $ty {
            fn range(&self) -> &$crate::position::Range {
                &self.range
            }

            fn type_name(&self) -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed($name)
            }
        }
    };
}
pub(crate) use impl_node;

/// A child of a [`Map`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapNode {
    Comment(Comment),
    BlockComment(BlockComment),
    Substitution(Substitution),
    #[serde(rename = "map_key")]
    Key(Key),
}

impl MapNode {
    /// Returns the key if this node is one.
    pub fn as_key(&self) -> Option<&Key> {
        match self {
            MapNode::Key(key) => Some(key),
            _ => None,
        }
    }
}

impl Node for MapNode {
    fn range(&self) -> &Range {
        match self {
            MapNode::Comment(n) => n.range(),
            MapNode::BlockComment(n) => n.range(),
            MapNode::Substitution(n) => n.range(),
            MapNode::Key(n) => n.range(),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            MapNode::Comment(n) => n.type_name(),
            MapNode::BlockComment(n) => n.type_name(),
            MapNode::Substitution(n) => n.type_name(),
            MapNode::Key(n) => n.type_name(),
        }
    }
}

/// A child of an [`Array`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArrayNode {
    Comment(Comment),
    BlockComment(BlockComment),
    Substitution(Substitution),
    Value(Value),
}

impl Node for ArrayNode {
    fn range(&self) -> &Range {
        match self {
            ArrayNode::Comment(n) => n.range(),
            ArrayNode::BlockComment(n) => n.range(),
            ArrayNode::Substitution(n) => n.range(),
            ArrayNode::Value(n) => n.range(),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            ArrayNode::Comment(n) => n.type_name(),
            ArrayNode::BlockComment(n) => n.type_name(),
            ArrayNode::Substitution(n) => n.type_name(),
            ArrayNode::Value(n) => n.type_name(),
        }
    }
}

/// The value of a [`Key`] or an element of an [`Array`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Scalar(Scalar),
    Array(Array),
    Map(Map),
}

impl Value {
    /// Returns the scalar if this value is one.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// Returns the map if this value is one.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the array if this value is one.
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }
}

impl Node for Value {
    fn range(&self) -> &Range {
        match self {
            Value::Scalar(n) => n.range(),
            Value::Array(n) => n.range(),
            Value::Map(n) => n.range(),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            Value::Scalar(n) => n.type_name(),
            Value::Array(n) => n.type_name(),
            Value::Map(n) => n.type_name(),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<StringNode> for Value {
    fn from(string: StringNode) -> Self {
        Value::Scalar(Scalar::String(string))
    }
}

/// A scalar value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scalar {
    Null(Null),
    Boolean(Boolean),
    Number(Number),
    String(StringNode),
}

impl Scalar {
    /// The textual form of the scalar.
    ///
    /// Null is `null`, booleans are `true` or `false`, numbers keep their
    /// original literal and strings yield their (first literal segment of)
    /// decoded text.
    pub fn scalar_string(&self) -> Cow<'_, str> {
        match self {
            Scalar::Null(_) => Cow::Borrowed("null"),
            Scalar::Boolean(b) => Cow::Borrowed(if b.value { "true" } else { "false" }),
            Scalar::Number(n) => Cow::Borrowed(&n.raw),
            Scalar::String(s) => Cow::Borrowed(s.scalar_string()),
        }
    }

    /// Returns the string if this scalar is one.
    pub fn as_string(&self) -> Option<&StringNode> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Node for Scalar {
    fn range(&self) -> &Range {
        match self {
            Scalar::Null(n) => n.range(),
            Scalar::Boolean(n) => n.range(),
            Scalar::Number(n) => n.range(),
            Scalar::String(n) => n.range(),
        }
    }

    fn type_name(&self) -> Cow<'static, str> {
        match self {
            Scalar::Null(n) => n.type_name(),
            Scalar::Boolean(n) => n.type_name(),
            Scalar::Number(n) => n.type_name(),
            Scalar::String(n) => n.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use num_rational::BigRational;

    use super::*;
    use crate::position::Position;

    fn range() -> Range {
        Range::new("t.d2", Position::default(), Position::new(0, 4, 4))
    }

    #[test]
    fn test_scalar_string() {
        let null = Scalar::Null(Null { range: range() });
        assert_eq!(null.scalar_string(), "null");

        let boolean = Scalar::Boolean(Boolean {
            range: range(),
            value: false,
        });
        assert_eq!(boolean.scalar_string(), "false");

        let number = Scalar::Number(Number {
            range: range(),
            raw: "0.50".to_string(),
            value: BigRational::new(1.into(), 2.into()),
        });
        assert_eq!(number.scalar_string(), "0.50");
    }

    #[test]
    fn test_value_type_names() {
        let value = Value::Map(Map::new(range()));
        assert_eq!(value.type_name(), "map");

        let block = Value::from(StringNode::Block(BlockString {
            range: range(),
            quote: String::new(),
            tag: "tex".to_string(),
            value: "x".to_string(),
        }));
        assert_eq!(block.type_name(), "tex block string");
    }

    #[test]
    fn test_map_node_serializes_as_tagged_box() {
        let node = MapNode::Comment(Comment {
            range: range(),
            value: "hello".to_string(),
        });
        let json = serde_json::to_value(&node).unwrap();

        assert_eq!(json["comment"]["value"], "hello");
        assert_eq!(json["comment"]["range"], "t.d2,0:0:0-0:4:4");
    }
}
