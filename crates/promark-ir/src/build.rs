/*
 * build.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Constructor functions for the IR.
//!
//! The tree is built directly as data; there is no markup detour. Children
//! accept anything convertible to [`Child`], so string literals and nodes mix
//! freely:
//!
//! ```rust
//! use promark_ir::{paragraph, bold};
//!
//! let node = paragraph(vec!["hello ".into(), bold(vec!["world".into()]).into()]);
//! assert_eq!(node.children.len(), 2);
//! ```

use crate::kind::{EnvAttrs, Kind, MediaAttrs};
use crate::node::{Child, Node};
use crate::presentation::{Position, Speaker, Syntax};

pub fn env(children: Vec<Child>) -> Node {
    Node::new(Kind::Env(EnvAttrs::default())).with_children(children)
}

/// An environment with an explicit sub-language.
pub fn serialize_env(syntax: Syntax, children: Vec<Child>) -> Node {
    Node::new(Kind::Env(EnvAttrs {
        syntax: Some(syntax.as_str().to_string()),
        ..EnvAttrs::default()
    }))
    .with_children(children)
}

pub fn free_env(children: Vec<Child>) -> Node {
    serialize_env(Syntax::Text, children)
}

pub fn multimedia_env(children: Vec<Child>) -> Node {
    serialize_env(Syntax::Multimedia, children)
}

/// An environment tagged with a chat speaker.
pub fn speaker_env(speaker: Speaker, children: Vec<Child>) -> Node {
    env(children).with_speaker(speaker)
}

pub fn paragraph(children: Vec<Child>) -> Node {
    Node::new(Kind::Paragraph { blank_line: false }).with_children(children)
}

pub fn span(children: Vec<Child>) -> Node {
    Node::new(Kind::Span).with_children(children)
}

/// A header at the ambient level.
pub fn header(children: Vec<Child>) -> Node {
    Node::new(Kind::Header { level: None }).with_children(children)
}

/// A header with an explicit level.
pub fn header_at(level: usize, children: Vec<Child>) -> Node {
    Node::new(Kind::Header { level: Some(level) }).with_children(children)
}

pub fn bold(children: Vec<Child>) -> Node {
    Node::new(Kind::Bold).with_children(children)
}

pub fn italic(children: Vec<Child>) -> Node {
    Node::new(Kind::Italic).with_children(children)
}

pub fn strikeout(children: Vec<Child>) -> Node {
    Node::new(Kind::Strikeout).with_children(children)
}

pub fn underline(children: Vec<Child>) -> Node {
    Node::new(Kind::Underline).with_children(children)
}

pub fn code(text: &str) -> Node {
    Node::new(Kind::Code {
        inline: true,
        lang: None,
    })
    .with_children(vec![text.into()])
}

pub fn code_block(lang: Option<&str>, children: Vec<Child>) -> Node {
    Node::new(Kind::Code {
        inline: false,
        lang: lang.map(|s| s.to_string()),
    })
    .with_children(children)
}

pub fn list(style: Option<&str>, items: Vec<Node>) -> Node {
    Node::new(Kind::List {
        style: style.map(|s| s.to_string()),
    })
    .with_children(items.into_iter().map(Child::Node).collect())
}

pub fn item(children: Vec<Child>) -> Node {
    Node::new(Kind::Item).with_children(children)
}

pub fn newline(count: usize) -> Node {
    Node::new(Kind::Newline { count })
}

pub fn table(children: Vec<Child>) -> Node {
    Node::new(Kind::Table).with_children(children)
}

pub fn table_head(rows: Vec<Node>) -> Node {
    Node::new(Kind::TableHead).with_children(rows.into_iter().map(Child::Node).collect())
}

pub fn table_body(rows: Vec<Node>) -> Node {
    Node::new(Kind::TableBody).with_children(rows.into_iter().map(Child::Node).collect())
}

pub fn table_row(cells: Vec<Node>) -> Node {
    Node::new(Kind::TableRow).with_children(cells.into_iter().map(Child::Node).collect())
}

pub fn table_cell(children: Vec<Child>) -> Node {
    Node::new(Kind::TableCell).with_children(children)
}

pub fn text(s: &str) -> Node {
    Node::new(Kind::Text).with_children(vec![s.into()])
}

/// An unnamed serialize value (array element).
pub fn value(children: Vec<Child>) -> Node {
    Node::new(Kind::Value {
        name: None,
        value_type: None,
    })
    .with_children(children)
}

/// A named serialize value (object key).
pub fn value_named(name: &str, children: Vec<Child>) -> Node {
    Node::new(Kind::Value {
        name: Some(name.to_string()),
        value_type: None,
    })
    .with_children(children)
}

/// Pre-serialized JSON spliced directly into serialize output.
pub fn obj(data: serde_json::Value) -> Node {
    Node::new(Kind::ObjData { data })
}

pub fn image(base64: &str, alt: Option<&str>, media_type: &str) -> Node {
    Node::new(Kind::Image(MediaAttrs {
        base64: base64.to_string(),
        alt: alt.map(|s| s.to_string()),
        media_type: Some(media_type.to_string()),
        position: Position::Here,
    }))
}

pub fn audio(base64: &str, media_type: &str) -> Node {
    Node::new(Kind::Audio(MediaAttrs {
        base64: base64.to_string(),
        alt: None,
        media_type: Some(media_type.to_string()),
        position: Position::Here,
    }))
}

pub fn tool_request(id: &str, name: &str, content: &str) -> Node {
    Node::new(Kind::ToolRequest {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
        content: Some(content.to_string()),
    })
}

pub fn tool_response(id: &str, name: &str, children: Vec<Child>) -> Node {
    Node::new(Kind::ToolResponse {
        id: Some(id.to_string()),
        name: Some(name.to_string()),
    })
    .with_children(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::Kind;

    #[test]
    fn test_serialize_env_syntax() {
        let node = serialize_env(Syntax::Json, vec![]);
        match &node.kind {
            Kind::Env(attrs) => assert_eq!(attrs.syntax.as_deref(), Some("json")),
            _ => panic!("expected env"),
        }
    }

    #[test]
    fn test_list_children_are_nodes() {
        let node = list(Some("decimal"), vec![item(vec!["a".into()]), item(vec!["b".into()])]);
        assert_eq!(node.child_nodes().count(), 2);
    }
}
