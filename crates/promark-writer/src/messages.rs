/*
 * messages.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Chat message segmentation.
//!
//! The root environment's children are split at speaker boundaries: a child
//! carrying a `speaker` attribute opens a new message, untagged content
//! joins the message before it, and content before the first tagged child
//! belongs to the default speaker. Adjacent messages with the same speaker
//! merge, and a run of consecutive empty messages collapses into its first.

use crate::context::RenderContext;
use crate::error::Result;
use crate::layout::{self, BoxKind, Display, Fragment, LayoutBox};
use crate::truncate;
use promark_ir::{Child, Kind, Node, Presentation, Speaker};

/// One message before content assembly: the resolved speaker and the
/// emitted fragments of its body.
#[derive(Debug)]
pub struct RawMessage {
    pub speaker: Speaker,
    pub fragments: Vec<Fragment>,
}

impl RawMessage {
    fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Split a document into speaker-attributed messages.
pub fn split_messages(node: &Node, ctx: &RenderContext) -> Result<Vec<RawMessage>> {
    let Kind::Env(attrs) = &node.kind else {
        // A bare block renders as a single default-speaker message.
        let mut root = layout::build_root(node, ctx)?;
        truncate::apply_limits(&mut root);
        return Ok(vec![RawMessage {
            speaker: ctx.speaker,
            fragments: layout::emit(&root),
        }]);
    };

    let range = node.meta.ir_range();
    let inner = ctx.enter_document(attrs, &node.meta, range)?;
    match inner.presentation() {
        Presentation::Markup | Presentation::Multimedia => {}
        Presentation::Serialize => {
            let rendered = crate::writers::data::write_env(node, &inner)?;
            return Ok(vec![RawMessage {
                speaker: inner.speaker,
                fragments: vec![Fragment::text(range, rendered)],
            }]);
        }
        Presentation::Free => {
            let rendered = crate::writers::free::write_env(node, &inner)?;
            return Ok(vec![RawMessage {
                speaker: inner.speaker,
                fragments: vec![Fragment::text(range, rendered)],
            }]);
        }
    }

    let mut groups: Vec<(Speaker, Vec<LayoutBox>)> = Vec::new();
    for child in &node.children {
        let tagged = match child {
            Child::Node(n) => n.meta.speaker,
            Child::Text(_) => None,
        };
        let boxes = layout::build_child_blocks(child, &inner, range)?;
        match tagged {
            Some(speaker) => groups.push((speaker, boxes)),
            None => match groups.last_mut() {
                Some((_, current)) => current.extend(boxes),
                None => groups.push((inner.speaker, boxes)),
            },
        }
    }
    if groups.is_empty() {
        groups.push((inner.speaker, Vec::new()));
    }

    let mut messages = Vec::new();
    for (speaker, boxes) in groups {
        let mut body = LayoutBox {
            display: Display::Block,
            kind: BoxKind::Group {
                children: boxes,
                tight: false,
            },
            priority: 0,
            ir_range: None,
            blank_line: false,
            limit: None,
        };
        truncate::apply_limits(&mut body);
        messages.push(RawMessage {
            speaker,
            fragments: layout::emit(&body),
        });
    }
    Ok(collapse(messages))
}

fn collapse(messages: Vec<RawMessage>) -> Vec<RawMessage> {
    // Adjacent same-speaker messages merge with a block joiner.
    let mut merged: Vec<RawMessage> = Vec::new();
    for message in messages {
        match merged.last_mut() {
            Some(last) if last.speaker == message.speaker => {
                if !last.fragments.is_empty() && !message.fragments.is_empty() {
                    last.fragments.push(Fragment::text(None, "\n\n"));
                }
                last.fragments.extend(message.fragments);
            }
            _ => merged.push(message),
        }
    }

    // A run of consecutive empty messages keeps only its first.
    let mut out: Vec<RawMessage> = Vec::new();
    for message in merged {
        if message.is_empty() && out.last().is_some_and(|m| m.is_empty()) {
            continue;
        }
        out.push(message);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::plain_text;
    use crate::options::WriterOptions;
    use promark_ir::build;

    fn split(node: &Node) -> Vec<RawMessage> {
        let ctx = RenderContext::root(WriterOptions::default());
        split_messages(node, &ctx).unwrap()
    }

    #[test]
    fn untagged_content_defaults_to_human() {
        let doc = build::env(vec![build::paragraph(vec!["hello".into()]).into()]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Human);
        assert_eq!(plain_text(&messages[0].fragments), "hello");
    }

    #[test]
    fn speaker_attribute_opens_a_message() {
        let doc = build::env(vec![
            build::speaker_env(Speaker::System, vec![build::paragraph(vec!["rules".into()]).into()]).into(),
            build::speaker_env(Speaker::Human, vec![build::paragraph(vec!["question".into()]).into()]).into(),
        ]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].speaker, Speaker::System);
        assert_eq!(plain_text(&messages[0].fragments), "rules");
        assert_eq!(messages[1].speaker, Speaker::Human);
    }

    #[test]
    fn untagged_content_joins_preceding_message() {
        let doc = build::env(vec![
            build::speaker_env(Speaker::Ai, vec![build::paragraph(vec!["first".into()]).into()]).into(),
            build::paragraph(vec!["second".into()]).into(),
        ]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Ai);
        assert_eq!(plain_text(&messages[0].fragments), "first\n\nsecond");
    }

    #[test]
    fn adjacent_same_speaker_messages_merge() {
        let doc = build::env(vec![
            build::speaker_env(Speaker::Human, vec![build::paragraph(vec!["a".into()]).into()]).into(),
            build::speaker_env(Speaker::Human, vec![build::paragraph(vec!["b".into()]).into()]).into(),
        ]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 1);
        assert_eq!(plain_text(&messages[0].fragments), "a\n\nb");
    }

    #[test]
    fn empty_message_runs_collapse() {
        let doc = build::env(vec![
            build::speaker_env(Speaker::Human, vec![]).into(),
            build::speaker_env(Speaker::Ai, vec![]).into(),
            build::speaker_env(Speaker::System, vec![]).into(),
        ]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Human);
        assert!(messages[0].is_empty());
    }

    #[test]
    fn empty_document_is_one_empty_message() {
        let doc = build::env(vec![]);
        let messages = split(&doc);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].speaker, Speaker::Human);
        assert!(messages[0].is_empty());
    }
}
