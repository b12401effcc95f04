/*
 * presentation.rs
 * Copyright (c) 2025 Posit, PBC
 */

use serde::{Deserialize, Serialize};

/// Rendering mode for a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presentation {
    Markup,
    Serialize,
    Free,
    Multimedia,
}

impl Presentation {
    pub fn parse(s: &str) -> Option<Presentation> {
        match s {
            "markup" => Some(Presentation::Markup),
            "serialize" => Some(Presentation::Serialize),
            "free" => Some(Presentation::Free),
            "multimedia" => Some(Presentation::Multimedia),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Presentation::Markup => "markup",
            Presentation::Serialize => "serialize",
            Presentation::Free => "free",
            Presentation::Multimedia => "multimedia",
        }
    }

    /// The sub-language used when an environment names only a presentation.
    pub fn default_syntax(&self) -> Syntax {
        match self {
            Presentation::Markup => Syntax::Markdown,
            Presentation::Serialize => Syntax::Json,
            Presentation::Free => Syntax::Text,
            Presentation::Multimedia => Syntax::Multimedia,
        }
    }
}

/// Concrete sub-language of a presentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    Markdown,
    Csv,
    Tsv,
    Json,
    Yaml,
    Xml,
    Text,
    Multimedia,
}

impl Syntax {
    pub fn parse(s: &str) -> Option<Syntax> {
        match s {
            "markdown" => Some(Syntax::Markdown),
            "csv" => Some(Syntax::Csv),
            "tsv" => Some(Syntax::Tsv),
            "json" => Some(Syntax::Json),
            "yaml" => Some(Syntax::Yaml),
            "xml" => Some(Syntax::Xml),
            "text" => Some(Syntax::Text),
            "multimedia" => Some(Syntax::Multimedia),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Markdown => "markdown",
            Syntax::Csv => "csv",
            Syntax::Tsv => "tsv",
            Syntax::Json => "json",
            Syntax::Yaml => "yaml",
            Syntax::Xml => "xml",
            Syntax::Text => "text",
            Syntax::Multimedia => "multimedia",
        }
    }

    pub fn presentation(&self) -> Presentation {
        match self {
            Syntax::Markdown | Syntax::Csv | Syntax::Tsv => Presentation::Markup,
            Syntax::Json | Syntax::Yaml | Syntax::Xml => Presentation::Serialize,
            Syntax::Text => Presentation::Free,
            Syntax::Multimedia => Presentation::Multimedia,
        }
    }
}

/// Chat role attached to a top-level node for message segmentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    System,
    Human,
    Ai,
    Tool,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::System => "system",
            Speaker::Human => "human",
            Speaker::Ai => "ai",
            Speaker::Tool => "tool",
        }
    }
}

/// Whitespace handling for text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhiteSpace {
    /// Collapse runs of whitespace to a single space (markup default).
    #[default]
    Filter,
    /// Preserve verbatim.
    Pre,
    /// Trim leading and trailing whitespace.
    Trim,
}

/// Recognized list marker styles. The node stores the raw attribute string
/// (see [`crate::Kind::List`]) so an unknown style surfaces as a validation
/// error carrying the node's range, not as a deserialization failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Star,
    Dash,
    Plus,
    Decimal,
    Latin,
}

impl ListStyle {
    pub fn parse(s: &str) -> Option<ListStyle> {
        match s {
            "star" => Some(ListStyle::Star),
            "dash" => Some(ListStyle::Dash),
            "plus" => Some(ListStyle::Plus),
            "decimal" => Some(ListStyle::Decimal),
            "latin" => Some(ListStyle::Latin),
            _ => None,
        }
    }
}

/// Placement hint for media items relative to their containing block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    Bottom,
    #[default]
    Here,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_presentation_mapping() {
        assert_eq!(Syntax::Markdown.presentation(), Presentation::Markup);
        assert_eq!(Syntax::Csv.presentation(), Presentation::Markup);
        assert_eq!(Syntax::Json.presentation(), Presentation::Serialize);
        assert_eq!(Syntax::Yaml.presentation(), Presentation::Serialize);
        assert_eq!(Syntax::Xml.presentation(), Presentation::Serialize);
        assert_eq!(Syntax::Text.presentation(), Presentation::Free);
        assert_eq!(Syntax::Multimedia.presentation(), Presentation::Multimedia);
    }

    #[test]
    fn test_parse_round_trip() {
        for s in ["markdown", "csv", "tsv", "json", "yaml", "xml", "text", "multimedia"] {
            assert_eq!(Syntax::parse(s).unwrap().as_str(), s);
        }
        assert_eq!(Syntax::parse("html"), None);
        assert_eq!(Presentation::parse("serialize"), Some(Presentation::Serialize));
        assert_eq!(Presentation::parse("verbatim"), None);
    }

    #[test]
    fn test_default_syntax() {
        assert_eq!(Presentation::Markup.default_syntax(), Syntax::Markdown);
        assert_eq!(Presentation::Serialize.default_syntax(), Syntax::Json);
    }
}
