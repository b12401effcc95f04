//! Source mapping for promark
//!
//! This crate provides the provenance types shared between the IR and the
//! writer layer. Every fragment of rendered output can be traced back to a
//! range in the IR (and, through the IR's recorded indices, to the original
//! source markup).
//!
//! # Overview
//!
//! The core types are:
//! - [`IrRange`]: A half-open range of original-source offsets carried by IR nodes
//! - [`Segment`]: A source-mapped output fragment pairing content with ranges
//! - [`SegmentAccumulator`]: Builds a monotonic segment list during rendering
//!
//! # Round-trip law
//!
//! Concatenating the `content` fields of the segments produced for a render,
//! in order, reproduces the plain rendered output byte for byte:
//!
//! ```rust
//! use promark_source_map::{IrRange, SegmentAccumulator};
//!
//! let mut acc = SegmentAccumulator::new();
//! acc.push(Some(IrRange::new(0, 5)), "hello");
//! acc.push(None, " ");
//! acc.push(Some(IrRange::new(6, 11)), "world");
//! let segments = acc.finish();
//!
//! let reassembled: String = segments.iter().map(|s| s.content.as_str()).collect();
//! assert_eq!(reassembled, "hello world");
//! ```

pub mod accumulator;
pub mod segment;
pub mod types;

pub use accumulator::SegmentAccumulator;
pub use segment::{Segment, concat_segments};
pub use types::IrRange;
