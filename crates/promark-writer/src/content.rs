/*
 * content.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Rendered-output content model: plain text, mixed part streams, and chat
//! messages.

use promark_ir::Speaker;
use promark_source_map::IrRange;
use serde::Serialize;
use serde::ser::SerializeMap;

/// One element of a mixed-content stream.
///
/// Serializes to the wire shape consumed by prompt frontends: media as
/// `{"type": "image/png", "base64": ..., "alt": ...}`, tool calls as
/// `{"type": "toolrequest", ...}` / `{"type": "toolresponse", ...}`.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    Text(String),
    Media(Media),
    ToolRequest(ToolRequest),
    ToolResponse(ToolResponse),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    /// MIME type, e.g. `image/png` or `audio/wav`.
    pub media_type: String,
    pub base64: String,
    pub alt: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolRequest {
    pub id: String,
    pub name: String,
    /// Parsed JSON call arguments.
    pub content: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub id: String,
    pub name: String,
    pub content: RichContent,
}

impl Serialize for ContentPart {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ContentPart::Text(text) => serializer.serialize_str(text),
            ContentPart::Media(media) => {
                let mut map = serializer.serialize_map(None)?;
                map.serialize_entry("type", &media.media_type)?;
                map.serialize_entry("base64", &media.base64)?;
                if let Some(alt) = &media.alt {
                    map.serialize_entry("alt", alt)?;
                }
                map.end()
            }
            ContentPart::ToolRequest(request) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "toolrequest")?;
                map.serialize_entry("id", &request.id)?;
                map.serialize_entry("name", &request.name)?;
                map.serialize_entry("content", &request.content)?;
                map.end()
            }
            ContentPart::ToolResponse(response) => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "toolresponse")?;
                map.serialize_entry("id", &response.id)?;
                map.serialize_entry("name", &response.name)?;
                map.serialize_entry("content", &response.content)?;
                map.end()
            }
        }
    }
}

/// Rendered content: a plain string, or an ordered mixed-content array when
/// the output interleaves text with media or tool calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RichContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl RichContent {
    pub fn is_empty(&self) -> bool {
        match self {
            RichContent::Text(text) => text.is_empty(),
            RichContent::Parts(parts) => parts.is_empty(),
        }
    }

    /// The plain text form; `None` when the content holds non-text parts.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            RichContent::Text(text) => Some(text),
            RichContent::Parts(_) => None,
        }
    }
}

/// A speaker-attributed chat message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub speaker: Speaker,
    pub content: RichContent,
}

/// A message together with the source map of its content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageSegments {
    pub speaker: Speaker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir_range: Option<IrRange>,
    pub start_index: usize,
    pub end_index: usize,
    pub content: Vec<promark_source_map::Segment<RichContent>>,
}
