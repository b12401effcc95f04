/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Writer configuration.

use crate::error::{Result, WriteError};
use serde::{Deserialize, Serialize};

/// Direction of text truncation once a subtree exceeds its budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TruncateDirection {
    /// Keep the first N units, append the marker.
    #[default]
    End,
    /// Keep the last N units, prepend the marker.
    Start,
    /// Keep roughly half the budget at each end, joined by the marker.
    Middle,
}

pub const DEFAULT_TRUNCATE_MARKER: &str = " (...truncated)";

/// Options accepted by every writer, overridable per environment via the
/// `writer-options` attribute.
///
/// Unknown option names and out-of-range values are configuration errors,
/// rejected before traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct WriterOptions {
    /// Level rendered for a top-level header (1 => `#`).
    pub markdown_base_header_level: usize,
    /// Emit compact pipe tables without column-width padding.
    pub markdown_table_collapse: bool,
    /// Field separator when tables are emitted as delimited text.
    pub csv_separator: char,
    /// Include the header row in delimited table output.
    pub csv_header: bool,
    pub truncate_direction: TruncateDirection,
    pub truncate_marker: String,
}

impl Default for WriterOptions {
    fn default() -> Self {
        WriterOptions {
            markdown_base_header_level: 1,
            markdown_table_collapse: false,
            csv_separator: ',',
            csv_header: true,
            truncate_direction: TruncateDirection::End,
            truncate_marker: DEFAULT_TRUNCATE_MARKER.to_string(),
        }
    }
}

impl WriterOptions {
    pub fn validate(&self) -> Result<()> {
        if self.markdown_base_header_level == 0 || self.markdown_base_header_level > 6 {
            return Err(WriteError::configuration(format!(
                "markdown-base-header-level must be between 1 and 6, got {}",
                self.markdown_base_header_level
            )));
        }
        Ok(())
    }

    /// Apply a partial override (an env's `writer-options` attribute) on top
    /// of these options.
    pub fn merged_with(&self, patch: &serde_json::Value) -> Result<WriterOptions> {
        let patch_map = patch.as_object().ok_or_else(|| {
            WriteError::configuration("writer-options must be an object".to_string())
        })?;
        let mut base = serde_json::to_value(self)
            .map_err(|e| WriteError::emit(e.to_string()))?;
        let Some(base_map) = base.as_object_mut() else {
            return Err(WriteError::emit("options did not serialize to an object"));
        };
        for (key, value) in patch_map {
            base_map.insert(key.clone(), value.clone());
        }
        let merged: WriterOptions = serde_json::from_value(base)
            .map_err(|e| WriteError::configuration(e.to_string()))?;
        merged.validate()?;
        Ok(merged)
    }
}
