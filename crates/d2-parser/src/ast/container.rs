use serde::{Deserialize, Serialize};

use crate::{
    ast::{ArrayNode, MapNode, impl_node},
    position::Range,
};

/// A `{ }` block, or the implicit map of a whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub range: Range,
    pub nodes: Vec<MapNode>,
}

impl Map {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            nodes: Vec::new(),
        }
    }

    /// Whether this is the top level map of a file rather than a `{ }` block.
    pub fn is_file_map(&self) -> bool {
        self.range.start.line == 0 && self.range.start.column == 0
    }

    /// Inserts `node` right after the last node equal to `anchor`, or at the
    /// end if there is none.
    pub fn insert_after(&mut self, anchor: &MapNode, node: MapNode) {
        let index = self
            .nodes
            .iter()
            .rposition(|n| n == anchor)
            .map_or(self.nodes.len(), |i| i + 1);
        self.nodes.insert(index, node);
    }

    /// Inserts `node` right before the last node equal to `anchor`, or at
    /// the end if there is none.
    pub fn insert_before(&mut self, anchor: &MapNode, node: MapNode) {
        let index = self
            .nodes
            .iter()
            .rposition(|n| n == anchor)
            .unwrap_or(self.nodes.len());
        self.nodes.insert(index, node);
    }
}

/// A `[ ]` list of values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Array {
    pub range: Range,
    pub nodes: Vec<ArrayNode>,
}

impl Array {
    pub fn new(range: Range) -> Self {
        Self {
            range,
            nodes: Vec::new(),
        }
    }
}

impl_node!(Map, "map");
impl_node!(Array, "array");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::Comment, position::Position};

    fn comment(value: &str) -> MapNode {
        MapNode::Comment(Comment {
            range: Range::default(),
            value: value.to_string(),
        })
    }

    fn values(map: &Map) -> Vec<&str> {
        map.nodes
            .iter()
            .map(|n| match n {
                MapNode::Comment(c) => c.value.as_str(),
                _ => "?",
            })
            .collect()
    }

    #[test]
    fn test_insert_after() {
        let mut map = Map::new(Range::default());
        map.nodes = vec![comment("a"), comment("b")];

        map.insert_after(&comment("a"), comment("x"));
        assert_eq!(values(&map), ["a", "x", "b"]);

        map.insert_after(&comment("missing"), comment("y"));
        assert_eq!(values(&map), ["a", "x", "b", "y"]);
    }

    #[test]
    fn test_insert_before() {
        let mut map = Map::new(Range::default());
        map.nodes = vec![comment("a"), comment("b")];

        map.insert_before(&comment("b"), comment("x"));
        assert_eq!(values(&map), ["a", "x", "b"]);

        map.insert_before(&comment("missing"), comment("y"));
        assert_eq!(values(&map), ["a", "x", "b", "y"]);
    }

    #[test]
    fn test_insert_uses_last_match() {
        let mut map = Map::new(Range::default());
        map.nodes = vec![comment("a"), comment("a")];

        map.insert_after(&comment("a"), comment("x"));
        assert_eq!(values(&map), ["a", "a", "x"]);
    }

    #[test]
    fn test_is_file_map() {
        let file = Map::new(Range::new("f", Position::default(), Position::default()));
        assert!(file.is_file_map());

        let block = Map::new(Range::new(
            "f",
            Position::new(0, 3, 3),
            Position::new(0, 5, 5),
        ));
        assert!(!block.is_file_map());
    }
}
