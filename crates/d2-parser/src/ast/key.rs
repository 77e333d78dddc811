//! Keys, key paths, edges and substitutions.

use serde::{Deserialize, Serialize};

use crate::{
    ast::{Scalar, StringNode, Value, impl_node},
    position::Range,
};

/// A `.` separated path of strings, such as `a.b."c d"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPath {
    pub range: Range,
    pub path: Vec<StringNode>,
}

impl KeyPath {
    /// The decoded text of each segment.
    pub fn strings(&self) -> impl Iterator<Item = &str> {
        self.path.iter().map(StringNode::scalar_string)
    }
}

/// A `${a.b}` reference. `spread` is set for the `...${a.b}` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub range: Range,
    pub spread: bool,
    pub path: Vec<StringNode>,
}

/// The head drawn at one end of an edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arrowhead {
    /// A bare `-` end.
    #[default]
    None,
    /// `<` at the source or `>` at the destination.
    Open,
    /// `*` at either end.
    Filled,
}

impl Arrowhead {
    /// The character written for this head, `src` selecting `<` over `>`.
    pub fn as_char(self, src: bool) -> Option<char> {
        match self {
            Arrowhead::None => None,
            Arrowhead::Open if src => Some('<'),
            Arrowhead::Open => Some('>'),
            Arrowhead::Filled => Some('*'),
        }
    }
}

/// One hop of a connection chain.
///
/// `src` and `dst` are only absent when the source is malformed; a
/// diagnostic is always recorded in that case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub range: Range,
    pub src: Option<KeyPath>,
    pub src_arrow: Arrowhead,
    pub dst: Option<KeyPath>,
    pub dst_arrow: Arrowhead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeIndexValue {
    Int(usize),
    Glob,
}

/// `[n]` or `[*]` after an edge group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeIndex {
    pub range: Range,
    pub value: EdgeIndexValue,
}

/// A map entry.
///
/// At least one of `key` and `edges` is set by the parser. Some valid shapes:
///
/// ```text
/// x                             key
/// x -> y                        edges
/// (x -> y)[*]                   edges, edge_index
/// (x -> y).label                edges, edge_key
/// container.(x -> y -> z)[4].a  key, edges, edge_index, edge_key
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Key {
    pub range: Range,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ampersand: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyPath>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edges: Vec<Edge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_index: Option<EdgeIndex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_key: Option<KeyPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<Scalar>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl Key {
    /// An empty key at `range`.
    pub fn new(range: Range) -> Self {
        Self {
            range,
            ampersand: false,
            key: None,
            edges: Vec::new(),
            edge_index: None,
            edge_key: None,
            primary: None,
            value: None,
        }
    }

    /// Structural comparison that ignores ranges and string forms.
    ///
    /// Keys are equivalent when the same parts are present, key paths decode
    /// to the same strings, nested maps hold pairwise equivalent entries and
    /// scalar values have the same textual form.
    pub fn equivalent(&self, other: &Key) -> bool {
        if self.key.is_some() != other.key.is_some()
            || self.edge_index.is_some() != other.edge_index.is_some()
            || self.edge_key.is_some() != other.edge_key.is_some()
            || self.edges.len() != other.edges.len()
        {
            return false;
        }

        if let (Some(a), Some(b)) = (&self.key, &other.key) {
            if !a.strings().eq(b.strings()) {
                return false;
            }
        }

        match (&self.value, &other.value) {
            (None, None) => true,
            (Some(Value::Map(a)), Some(Value::Map(b))) => {
                a.nodes.len() == b.nodes.len()
                    && a.nodes.iter().zip(&b.nodes).all(|(a, b)| {
                        match (a.as_key(), b.as_key()) {
                            (Some(a), Some(b)) => a.equivalent(b),
                            (None, None) => true,
                            _ => false,
                        }
                    })
            }
            (Some(Value::Array(a)), Some(Value::Array(b))) => a.nodes.len() == b.nodes.len(),
            (Some(Value::Scalar(a)), Some(Value::Scalar(b))) => {
                a.scalar_string() == b.scalar_string()
            }
            _ => false,
        }
    }

    /// Sets a scalar on the key.
    ///
    /// When the key already holds a map or array the scalar becomes the
    /// primary value; otherwise it replaces the value.
    pub fn set_scalar(&mut self, scalar: Scalar) {
        match self.value {
            Some(Value::Map(_) | Value::Array(_)) => self.primary = Some(scalar),
            _ => self.value = Some(Value::Scalar(scalar)),
        }
    }
}

impl_node!(KeyPath, "key path");
impl_node!(Substitution, "substitution");
impl_node!(Edge, "edge");
impl_node!(EdgeIndex, "edge index");
impl_node!(Key, "map key");
