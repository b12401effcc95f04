/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * IR type definitions for promark.
 *
 * This crate provides pure data type definitions for the promark IR:
 * a typed, tagged-variant document tree consumed by the writer layer.
 * It has minimal dependencies (serde, promark-source-map) and can be
 * used by any crate that needs to construct or inspect prompt documents.
 */

pub mod build;
pub mod kind;
pub mod meta;
pub mod node;
pub mod presentation;

// Re-export commonly used types at the crate root
pub use build::{
    audio, bold, code, code_block, env, free_env, header, header_at, image, italic, item, list,
    multimedia_env, newline, obj, paragraph, serialize_env, span, speaker_env, strikeout, table,
    table_body, table_cell, table_head, table_row, text, tool_request, tool_response, underline,
    value, value_named,
};
pub use kind::{EnvAttrs, Kind, MediaAttrs};
pub use meta::Meta;
pub use node::{Child, Node};
pub use presentation::{ListStyle, Position, Presentation, Speaker, Syntax, WhiteSpace};
