/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering engine for promark IR documents.
 *
 * The writer turns a normalized document tree into prompt-ready output:
 * markdown (with csv/tsv sub-languages), serialized data (json, yaml, xml),
 * free text, or mixed-content streams carrying media and tool calls. All
 * entry points are pure functions of the IR and the writer options;
 * rendering never mutates the input tree.
 */

pub mod content;
pub mod context;
pub mod error;
pub mod layout;
pub mod measure;
pub mod messages;
pub mod options;
pub mod segments;
pub mod truncate;
pub mod writers;

pub use content::{
    ContentPart, Media, Message, MessageSegments, RichContent, ToolRequest, ToolResponse,
};
pub use error::{Result, WriteError};
pub use options::{TruncateDirection, WriterOptions, DEFAULT_TRUNCATE_MARKER};
pub use promark_source_map::{IrRange, Segment};

use crate::context::RenderContext;
use crate::layout::{Fragment, Piece};
use promark_ir::{Kind, Node, Presentation};

/// A stateless document writer.
///
/// The options given at construction apply to the whole document; a
/// `writer-options` attribute on an environment overrides them for that
/// subtree only.
#[derive(Debug, Clone, Default)]
pub struct Writer {
    options: WriterOptions,
}

impl Writer {
    pub fn new() -> Writer {
        Writer::default()
    }

    pub fn with_options(options: WriterOptions) -> Writer {
        Writer { options }
    }

    /// Render a document to its content: a plain string for text-only
    /// output, a mixed part array when media or tool calls are present.
    pub fn write(&self, node: &Node) -> Result<RichContent> {
        let (fragments, force_parts) = self.render_document(node)?;
        Ok(assemble(&fragments, force_parts))
    }

    /// Render a document and return its source map: ordered segments with
    /// output offsets and the IR ranges they were rendered from.
    pub fn write_with_source_map(&self, node: &Node) -> Result<Vec<Segment<RichContent>>> {
        let (fragments, _) = self.render_document(node)?;
        let (segments, _) = segments::fragments_to_segments(&fragments, 0);
        Ok(segments)
    }

    /// Render a document as speaker-attributed chat messages.
    pub fn write_messages(&self, node: &Node) -> Result<Vec<Message>> {
        self.options.validate()?;
        let ctx = RenderContext::root(self.options.clone());
        let raw = messages::split_messages(node, &ctx)?;
        Ok(raw
            .into_iter()
            .map(|message| Message {
                speaker: message.speaker,
                content: if message.fragments.is_empty() {
                    RichContent::Parts(Vec::new())
                } else {
                    assemble(&message.fragments, false)
                },
            })
            .collect())
    }

    /// Render a document as chat messages, each carrying the source map of
    /// its content. The joiner between consecutive messages is attributed
    /// to the end of the preceding message, so concatenating all message
    /// segments reproduces the single-document rendering.
    pub fn write_messages_with_source_map(&self, node: &Node) -> Result<Vec<MessageSegments>> {
        self.options.validate()?;
        let ctx = RenderContext::root(self.options.clone());
        let raw = messages::split_messages(node, &ctx)?;
        let last = raw.len().saturating_sub(1);

        let mut out = Vec::with_capacity(raw.len());
        let mut base = 0usize;
        for (index, mut message) in raw.into_iter().enumerate() {
            if index < last {
                message.fragments.push(Fragment::text(None, "\n\n"));
            }
            let (content, end) = segments::fragments_to_segments(&message.fragments, base);
            out.push(MessageSegments {
                speaker: message.speaker,
                ir_range: span_of(&content),
                start_index: base,
                end_index: end,
                content,
            });
            base = end;
        }
        Ok(out)
    }

    fn render_document(&self, node: &Node) -> Result<(Vec<Fragment>, bool)> {
        self.options.validate()?;
        let ctx = RenderContext::root(self.options.clone());
        let range = node.meta.ir_range();

        let mut force_parts = false;
        if let Kind::Env(attrs) = &node.kind {
            let inner = ctx.enter_document(attrs, &node.meta, range)?;
            match inner.presentation() {
                Presentation::Serialize => {
                    let rendered = writers::data::write_env(node, &inner)?;
                    return Ok((vec![Fragment::text(range, rendered)], false));
                }
                Presentation::Free => {
                    let rendered = writers::free::write_env(node, &inner)?;
                    return Ok((vec![Fragment::text(range, rendered)], false));
                }
                Presentation::Multimedia => force_parts = true,
                Presentation::Markup => {}
            }
        }

        let mut root = layout::build_root(node, &ctx)?;
        truncate::apply_limits(&mut root);
        Ok((layout::emit(&root), force_parts))
    }
}

fn assemble(fragments: &[Fragment], force_parts: bool) -> RichContent {
    let has_parts = fragments
        .iter()
        .any(|f| matches!(f.piece, Piece::Part(_)));
    if !force_parts && !has_parts {
        return RichContent::Text(layout::plain_text(fragments));
    }
    RichContent::Parts(layout::merge_parts(fragments))
}

fn span_of(segments: &[Segment<RichContent>]) -> Option<IrRange> {
    let mut span: Option<IrRange> = None;
    for segment in segments {
        let Some(range) = segment.ir_range else {
            continue;
        };
        span = Some(match span {
            None => range,
            Some(current) => IrRange::new(
                current.start.min(range.start),
                current.end.max(range.end),
            ),
        });
    }
    span
}
