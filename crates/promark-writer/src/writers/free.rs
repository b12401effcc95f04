/*
 * writers/free.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Free-mode output: verbatim text with no markup decoration.

use crate::context::RenderContext;
use crate::error::{Result, WriteError};
use promark_ir::{Child, Kind, Node, Presentation, WhiteSpace};

/// Render a free environment to its output string.
pub fn write_env(node: &Node, ctx: &RenderContext) -> Result<String> {
    collect(&node.children, ctx.white_space, ctx)
}

fn collect(children: &[Child], mode: WhiteSpace, ctx: &RenderContext) -> Result<String> {
    let mut out = String::new();
    for child in children {
        match child {
            Child::Text(raw) => out.push_str(&apply(raw, mode)),
            Child::Node(node) => match &node.kind {
                // A nested environment renders in its own mode and the
                // result is spliced in verbatim.
                Kind::Env(attrs) => {
                    let inner = ctx.enter_env(attrs, &node.meta, node.meta.ir_range())?;
                    let rendered = match inner.presentation() {
                        Presentation::Free => write_env(node, &inner)?,
                        Presentation::Serialize => super::data::write_env(node, &inner)?,
                        Presentation::Markup => crate::layout::render_to_string(node, ctx)?,
                        Presentation::Multimedia => {
                            return Err(WriteError::validation(
                                "Invalid presentation",
                                node.meta.ir_range(),
                            ));
                        }
                    };
                    out.push_str(&rendered);
                }
                _ => {
                    let child_mode = node.meta.white_space.unwrap_or(mode);
                    out.push_str(&collect(&node.children, child_mode, ctx)?);
                }
            },
        }
    }
    Ok(out)
}

fn apply(text: &str, mode: WhiteSpace) -> String {
    match mode {
        WhiteSpace::Pre => text.to_string(),
        WhiteSpace::Trim => text.trim().to_string(),
        WhiteSpace::Filter => {
            let mut out = String::with_capacity(text.len());
            let mut in_run = false;
            for c in text.chars() {
                if c.is_whitespace() {
                    if !in_run {
                        out.push(' ');
                        in_run = true;
                    }
                } else {
                    out.push(c);
                    in_run = false;
                }
            }
            out
        }
    }
}
