//! Comments and non-string scalars.

use num_rational::BigRational;
use serde::{Deserialize, Serialize};

use crate::{ast::impl_node, position::Range};

/// A run of `#` line comments. Consecutive lines are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub range: Range,
    pub value: String,
}

/// A `"""` delimited comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockComment {
    pub range: Range,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Null {
    pub range: Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boolean {
    pub range: Range,
    pub value: bool,
}

/// A numeric literal.
///
/// The value is an exact rational so that no precision is lost before the
/// number reaches layout. `raw` keeps the literal exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Number {
    pub range: Range,
    pub raw: String,
    pub value: BigRational,
}

impl_node!(Comment, "comment");
impl_node!(BlockComment, "block comment");
impl_node!(Null, "null");
impl_node!(Boolean, "boolean");
impl_node!(Number, "number");
