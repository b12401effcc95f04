//! Segment accumulation during rendering

use crate::segment::Segment;
use crate::types::IrRange;

/// Accumulates text fragments into a monotonic segment list.
///
/// Writers push fragments in output order. Consecutive fragments carrying
/// the same IR range merge into one segment; fragments with no range
/// (joiners such as blank lines and padding spaces) merge into the segment
/// before them, or are held back and prepended to the next ranged fragment
/// when they occur at the start of the output.
///
/// Output offsets are byte offsets into the rendered string, non-overlapping
/// and strictly increasing.
#[derive(Debug, Default)]
pub struct SegmentAccumulator {
    segments: Vec<Segment<String>>,
    /// Rangeless text seen before the first ranged fragment.
    leading: String,
    cursor: usize,
}

impl SegmentAccumulator {
    pub fn new() -> Self {
        SegmentAccumulator::default()
    }

    /// Append a fragment of rendered text attributed to `ir_range`.
    pub fn push(&mut self, ir_range: Option<IrRange>, text: &str) {
        if text.is_empty() {
            return;
        }
        match ir_range {
            None => match self.segments.last_mut() {
                Some(last) => {
                    last.content.push_str(text);
                    last.end_index += text.len();
                    self.cursor += text.len();
                }
                None => {
                    self.leading.push_str(text);
                }
            },
            Some(range) => {
                if !self.leading.is_empty() {
                    // Attach held-back leading text to this first ranged segment.
                    let mut content = std::mem::take(&mut self.leading);
                    let start = self.cursor;
                    content.push_str(text);
                    self.cursor = start + content.len();
                    self.segments
                        .push(Segment::new(Some(range), start, self.cursor, content));
                    return;
                }
                match self.segments.last_mut() {
                    Some(last) if last.ir_range == Some(range) => {
                        last.content.push_str(text);
                        last.end_index += text.len();
                        self.cursor += text.len();
                    }
                    _ => {
                        let start = self.cursor;
                        self.cursor += text.len();
                        self.segments
                            .push(Segment::new(Some(range), start, self.cursor, text.to_string()));
                    }
                }
            }
        }
    }

    /// The output assembled so far.
    pub fn output(&self) -> String {
        let mut out: String = self.segments.iter().map(|s| s.content.as_str()).collect();
        out.push_str(&self.leading);
        out
    }

    /// Current end offset in the rendered output.
    pub fn cursor(&self) -> usize {
        self.cursor + self.leading.len()
    }

    pub fn finish(mut self) -> Vec<Segment<String>> {
        if !self.leading.is_empty() {
            // Output that never saw a ranged fragment still round-trips.
            let start = self.cursor;
            let content = std::mem::take(&mut self.leading);
            let end = start + content.len();
            self.segments.push(Segment::new(None, start, end, content));
        }
        self.segments
    }
}
