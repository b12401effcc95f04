//! Core types for source mapping

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range of byte offsets in the original source.
///
/// IR nodes carry these as `original-start-index`/`original-end-index`
/// attributes. A child node's range is always contained within its parent's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IrRange {
    /// Start offset (inclusive)
    pub start: usize,
    /// End offset (exclusive)
    pub end: usize,
}

impl IrRange {
    pub fn new(start: usize, end: usize) -> Self {
        IrRange { start, end }
    }

    /// Whether `other` nests within this range.
    pub fn contains(&self, other: &IrRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}
