/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for rendering.
//!
//! The engine is deterministic and pure, so every error is fail-fast: the
//! whole render aborts on the first problem and the caller must fix the
//! input. Aggregating multiple diagnostics across a render is the caller's
//! responsibility.

use promark_source_map::IrRange;
use thiserror::Error;

/// Errors that can occur while rendering an IR tree.
#[derive(Debug, Clone, Error)]
pub enum WriteError {
    /// Structurally invalid IR: unknown presentation/sub-language/list style,
    /// or an illegal presentation nesting.
    #[error("{message}")]
    Validation {
        message: String,
        range: Option<IrRange>,
    },

    /// Invalid content: tool calls missing required attributes, unparsable
    /// tool-call JSON, or empty required children.
    #[error("{message}")]
    Content {
        message: String,
        range: Option<IrRange>,
    },

    /// Invalid writer options, rejected before traversal.
    #[error("Invalid writer options: {message}")]
    Configuration { message: String },

    /// A format backend failed to emit (JSON/YAML/XML serialization).
    #[error("Serialization failed: {message}")]
    Emit { message: String },
}

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, WriteError>;

impl WriteError {
    pub fn validation(message: impl Into<String>, range: Option<IrRange>) -> WriteError {
        WriteError::Validation {
            message: message.into(),
            range,
        }
    }

    pub fn content(message: impl Into<String>, range: Option<IrRange>) -> WriteError {
        WriteError::Content {
            message: message.into(),
            range,
        }
    }

    pub fn configuration(message: impl Into<String>) -> WriteError {
        WriteError::Configuration {
            message: message.into(),
        }
    }

    pub fn emit(message: impl Into<String>) -> WriteError {
        WriteError::Emit {
            message: message.into(),
        }
    }

    /// The source range of the offending node, when known.
    pub fn range(&self) -> Option<IrRange> {
        match self {
            WriteError::Validation { range, .. } | WriteError::Content { range, .. } => *range,
            _ => None,
        }
    }
}
