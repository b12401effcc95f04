/*
 * kind.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::presentation::Position;
use serde::{Deserialize, Serialize};

/// The closed tag vocabulary of the IR, with each tag's own attributes.
///
/// Serialized with a `"tag"` discriminant matching the wire vocabulary
/// (`p`, `span`, `h`, ..., `any`, `obj`, `toolrequest`, `toolresponse`), so
/// the JSON encoding of a node is the IR's serialized textual form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum Kind {
    /// Environment: presentation/sub-language boundary.
    Env(EnvAttrs),
    #[serde(rename = "p")]
    Paragraph {
        /// Force an extra blank line around this block.
        #[serde(default, rename = "blank-line", skip_serializing_if = "std::ops::Not::not")]
        blank_line: bool,
    },
    Span,
    #[serde(rename = "h")]
    Header {
        /// Explicit header level; otherwise the ancestor-scoped counter applies.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        level: Option<usize>,
    },
    #[serde(rename = "b")]
    Bold,
    #[serde(rename = "i")]
    Italic,
    #[serde(rename = "s")]
    Strikeout,
    #[serde(rename = "u")]
    Underline,
    Code {
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        inline: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    },
    List {
        /// Raw marker style string; validated by the writer against
        /// [`crate::ListStyle`].
        #[serde(default, rename = "list-style", skip_serializing_if = "Option::is_none")]
        style: Option<String>,
    },
    Item,
    #[serde(rename = "nl")]
    Newline {
        #[serde(default = "default_newline_count")]
        count: usize,
    },
    Table,
    #[serde(rename = "thead")]
    TableHead,
    #[serde(rename = "tbody")]
    TableBody,
    #[serde(rename = "trow")]
    TableRow,
    #[serde(rename = "tcell")]
    TableCell,
    /// Verbatim text container; white-space mode comes from [`crate::Meta`].
    Text,
    /// Serialize-mode value (`any`): named values become object keys,
    /// unnamed ones array elements.
    #[serde(rename = "any")]
    Value {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Explicit scalar type: string, integer, float, boolean, null.
        #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
        value_type: Option<String>,
    },
    /// Pre-serialized JSON data spliced directly into serialize output.
    #[serde(rename = "obj")]
    ObjData { data: serde_json::Value },
    #[serde(rename = "img")]
    Image(MediaAttrs),
    Audio(MediaAttrs),
    #[serde(rename = "toolrequest")]
    ToolRequest {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// JSON-encoded call arguments.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    #[serde(rename = "toolresponse")]
    ToolResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
    },
}

fn default_newline_count() -> usize {
    1
}

/// Attributes of an `env` node.
///
/// `presentation` and `syntax` are kept as raw strings: an unrecognized value
/// must surface as a validation error carrying the node's source range, which
/// the writer's resolver produces.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EnvAttrs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presentation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    /// Render a nested serialize environment as an inline span instead of a
    /// fenced block when embedded in markup.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub inline: bool,
    /// Partial writer-options override for this subtree, validated eagerly by
    /// the writer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub writer_options: Option<serde_json::Value>,
}

/// Attributes shared by `img` and `audio` nodes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct MediaAttrs {
    pub base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// MIME type, e.g. `image/png`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "is_default_position")]
    pub position: Position,
}

fn is_default_position(p: &Position) -> bool {
    *p == Position::Here
}
