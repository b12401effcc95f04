/*
 * segments.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Fragment lists to source-mapped segments.
//!
//! Text runs go through [`SegmentAccumulator`], which merges same-range
//! fragments and attaches joiners to their neighbors. A media part breaks
//! the run and occupies exactly one output position, so offsets stay
//! deterministic for mixed content.

use crate::content::RichContent;
use crate::layout::{Fragment, Piece};
use promark_source_map::{Segment, SegmentAccumulator};

/// Convert an emitted fragment list into segments, starting at output
/// offset `base`. Returns the segments and the offset after the last one.
pub fn fragments_to_segments(
    fragments: &[Fragment],
    base: usize,
) -> (Vec<Segment<RichContent>>, usize) {
    let mut out = Vec::new();
    let mut cursor = base;
    let mut acc = SegmentAccumulator::new();

    fn flush(
        acc: &mut SegmentAccumulator,
        cursor: &mut usize,
        out: &mut Vec<Segment<RichContent>>,
    ) {
        let finished = std::mem::take(acc);
        let consumed = finished.cursor();
        for segment in finished.finish() {
            out.push(Segment::new(
                segment.ir_range,
                *cursor + segment.start_index,
                *cursor + segment.end_index,
                RichContent::Text(segment.content),
            ));
        }
        *cursor += consumed;
    }

    for fragment in fragments {
        match &fragment.piece {
            Piece::Text(text) => acc.push(fragment.ir_range, text),
            Piece::Part(part) => {
                flush(&mut acc, &mut cursor, &mut out);
                out.push(Segment::new(
                    fragment.ir_range,
                    cursor,
                    cursor + 1,
                    RichContent::Parts(vec![part.clone()]),
                ));
                cursor += 1;
            }
        }
    }
    flush(&mut acc, &mut cursor, &mut out);
    (out, cursor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentPart, Media};
    use promark_source_map::IrRange;

    fn media_part() -> ContentPart {
        ContentPart::Media(Media {
            media_type: "image/png".to_string(),
            base64: "aGk=".to_string(),
            alt: None,
        })
    }

    #[test]
    fn text_fragments_become_text_segments() {
        let fragments = vec![
            Fragment::text(Some(IrRange::new(0, 5)), "hello"),
            Fragment::text(None, " "),
            Fragment::text(Some(IrRange::new(6, 11)), "world"),
        ];
        let (segments, end) = fragments_to_segments(&fragments, 0);
        assert_eq!(end, 11);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].content, RichContent::Text("hello ".to_string()));
        assert_eq!(segments[1].start_index, 6);
        assert_eq!(segments[1].end_index, 11);
    }

    #[test]
    fn media_part_occupies_one_position() {
        let fragments = vec![
            Fragment::text(Some(IrRange::new(0, 4)), "see"),
            Fragment::part(Some(IrRange::new(4, 20)), media_part()),
            Fragment::text(Some(IrRange::new(20, 25)), "after"),
        ];
        let (segments, end) = fragments_to_segments(&fragments, 0);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].start_index, 3);
        assert_eq!(segments[1].end_index, 4);
        assert_eq!(segments[2].start_index, 4);
        assert_eq!(end, 9);
    }

    #[test]
    fn base_offsets_all_segments() {
        let fragments = vec![Fragment::text(Some(IrRange::new(0, 2)), "hi")];
        let (segments, end) = fragments_to_segments(&fragments, 100);
        assert_eq!(segments[0].start_index, 100);
        assert_eq!(segments[0].end_index, 102);
        assert_eq!(end, 102);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let (segments, end) = fragments_to_segments(&[], 7);
        assert!(segments.is_empty());
        assert_eq!(end, 7);
    }
}
