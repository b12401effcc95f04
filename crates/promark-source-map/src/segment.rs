//! Source-mapped output fragments

use crate::types::IrRange;
use serde::{Deserialize, Serialize};

/// A source-mapped fragment of rendered output.
///
/// `start_index`/`end_index` locate the fragment in the rendered output;
/// `ir_range` locates the IR node it was rendered from, when that node
/// recorded original-source indices. The content type is generic: plain
/// writers emit `Segment<String>`, the multimedia writer emits segments
/// whose content is a mixed part list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment<C> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ir_range: Option<IrRange>,
    /// Start offset in the rendered output (inclusive)
    pub start_index: usize,
    /// End offset in the rendered output (exclusive)
    pub end_index: usize,
    pub content: C,
}

impl<C> Segment<C> {
    pub fn new(ir_range: Option<IrRange>, start_index: usize, end_index: usize, content: C) -> Self {
        Segment {
            ir_range,
            start_index,
            end_index,
            content,
        }
    }
}

/// Reassemble text segments into the plain rendered output.
pub fn concat_segments(segments: &[Segment<String>]) -> String {
    segments.iter().map(|s| s.content.as_str()).collect()
}
