/*
 * meta.rs
 * Copyright (c) 2025 Posit, PBC
 */

use crate::presentation::{Speaker, WhiteSpace};
use promark_source_map::IrRange;
use serde::{Deserialize, Serialize};

/// Universal attributes that may appear on any IR node.
///
/// `original_start_index`/`original_end_index` record the node's range in the
/// original source markup; a child's range always nests within its parent's.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Meta {
    /// Eviction priority under a size limit. Default 0; higher survives longer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub char_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_limit: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<Speaker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub white_space: Option<WhiteSpace>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_start_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_end_index: Option<usize>,
}

impl Meta {
    /// The node's original-source range, when both indices are present.
    pub fn ir_range(&self) -> Option<IrRange> {
        match (self.original_start_index, self.original_end_index) {
            (Some(start), Some(end)) => Some(IrRange::new(start, end)),
            _ => None,
        }
    }

    pub fn has_limit(&self) -> bool {
        self.char_limit.is_some() || self.token_limit.is_some()
    }
}
