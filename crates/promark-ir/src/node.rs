/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::kind::Kind;
use crate::meta::Meta;
use serde::{Deserialize, Serialize};

/// A node in the IR tree: tag-specific attributes, universal attributes, and
/// ordered children.
///
/// The tree is immutable for the duration of a render; writers never mutate
/// it. JSON encoding flattens the tag and both attribute sets into one
/// object: `{"tag": "p", "char-limit": 5, "children": ["helloworld"]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(flatten)]
    pub kind: Kind,
    #[serde(flatten)]
    pub meta: Meta,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Child>,
}

/// A child is either a nested node or raw text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Child {
    Text(String),
    Node(Node),
}

impl Node {
    pub fn new(kind: Kind) -> Node {
        Node {
            kind,
            meta: Meta::default(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Child>) -> Node {
        self.children = children;
        self
    }

    pub fn with_range(mut self, start: usize, end: usize) -> Node {
        self.meta.original_start_index = Some(start);
        self.meta.original_end_index = Some(end);
        self
    }

    pub fn with_priority(mut self, priority: i64) -> Node {
        self.meta.priority = Some(priority);
        self
    }

    pub fn with_char_limit(mut self, limit: usize) -> Node {
        self.meta.char_limit = Some(limit);
        self
    }

    pub fn with_token_limit(mut self, limit: usize) -> Node {
        self.meta.token_limit = Some(limit);
        self
    }

    pub fn with_speaker(mut self, speaker: crate::Speaker) -> Node {
        self.meta.speaker = Some(speaker);
        self
    }

    pub fn with_white_space(mut self, mode: crate::WhiteSpace) -> Node {
        self.meta.white_space = Some(mode);
        self
    }

    /// Child nodes, skipping raw text.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter_map(|c| match c {
            Child::Node(n) => Some(n),
            Child::Text(_) => None,
        })
    }

    /// Whether every descendant's recorded source range nests within its
    /// parent's (nodes without a range are skipped).
    pub fn range_nesting_ok(&self) -> bool {
        fn check(node: &Node, enclosing: Option<promark_source_map::IrRange>) -> bool {
            let own = node.meta.ir_range();
            if let (Some(outer), Some(inner)) = (enclosing, own) {
                if !outer.contains(&inner) {
                    return false;
                }
            }
            let next = own.or(enclosing);
            node.child_nodes().all(|child| check(child, next))
        }
        check(self, None)
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Child {
        Child::Node(node)
    }
}

impl From<&str> for Child {
    fn from(text: &str) -> Child {
        Child::Text(text.to_string())
    }
}

impl From<String> for Child {
    fn from(text: String) -> Child {
        Child::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{bold, paragraph, text};

    #[test]
    fn test_node_json_round_trip() {
        let node = paragraph(vec!["hello ".into(), bold(vec!["world".into()]).into()])
            .with_range(0, 30);
        let json = serde_json::to_string(&node).unwrap();
        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(node, back);
    }

    #[test]
    fn test_node_wire_shape() {
        let node = paragraph(vec!["helloworld".into()]).with_char_limit(5);
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["tag"], "p");
        assert_eq!(json["char-limit"], 5);
        assert_eq!(json["children"][0], "helloworld");
    }

    #[test]
    fn test_range_nesting() {
        let good = paragraph(vec![text("hi").with_range(2, 4).into()]).with_range(0, 10);
        assert!(good.range_nesting_ok());

        let bad = paragraph(vec![text("hi").with_range(8, 15).into()]).with_range(0, 10);
        assert!(!bad.range_nesting_ok());
    }

    #[test]
    fn test_deserialize_text_child() {
        let node: Node =
            serde_json::from_str(r#"{"tag": "p", "children": ["a", {"tag": "b", "children": ["x"]}]}"#)
                .unwrap();
        assert_eq!(node.children.len(), 2);
        assert!(matches!(node.children[0], Child::Text(_)));
        assert!(matches!(node.children[1], Child::Node(_)));
    }
}
