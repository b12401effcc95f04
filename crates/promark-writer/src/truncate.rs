/*
 * truncate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Budget enforcement over the box tree.
//!
//! Limits apply bottom-up: a child box enforces its own budget before its
//! parent measures it. Under a limit the engine first evicts whole
//! lower-priority children, then falls back to directional text truncation
//! of the remaining rendered text.

use crate::layout::{emit, plain_text, BoxKind, Fragment, LayoutBox, LimitSpec, Piece};
use crate::measure::{CharMeasure, Measure, TokenMeasure};
use crate::options::{TruncateDirection, DEFAULT_TRUNCATE_MARKER};
use promark_source_map::IrRange;

/// Enforce every `char-limit` and `token-limit` in the tree, in place.
pub fn apply_limits(bx: &mut LayoutBox) {
    if let BoxKind::Group { children, .. } = &mut bx.kind {
        for child in children {
            apply_limits(child);
        }
    }
    let Some(limit) = bx.limit.clone() else {
        return;
    };
    if let Some(budget) = limit.token_limit {
        enforce(bx, &TokenMeasure, budget, &limit);
    }
    if let Some(budget) = limit.char_limit {
        enforce(bx, &CharMeasure, budget, &limit);
    }
}

fn rendered_text(bx: &LayoutBox) -> String {
    plain_text(&emit(bx))
}

fn enforce(bx: &mut LayoutBox, measure: &dyn Measure, budget: usize, limit: &LimitSpec) {
    loop {
        if measure.count(&rendered_text(bx)) <= budget {
            return;
        }
        if !evict_one(bx) {
            break;
        }
    }
    let fragments = emit(bx);
    bx.kind = BoxKind::Leaf(truncate_fragments(fragments, bx.ir_range, budget, measure, limit));
}

/// Truncate the text runs of a rendered fragment list down to `budget`
/// units, keeping media parts in place. Parts measure zero, so every part
/// survives; the marker splices into the text at the cut.
fn truncate_fragments(
    fragments: Vec<Fragment>,
    range: Option<IrRange>,
    budget: usize,
    measure: &dyn Measure,
    limit: &LimitSpec,
) -> Vec<Fragment> {
    if !fragments
        .iter()
        .any(|f| matches!(f.piece, Piece::Part(_)))
    {
        let truncated = truncate_text(&plain_text(&fragments), budget, measure, limit);
        return vec![Fragment::text(range, truncated)];
    }

    let total: usize = fragments
        .iter()
        .map(|f| match &f.piece {
            Piece::Text(s) => measure.count(s),
            Piece::Part(_) => 0,
        })
        .sum();
    // The dropped span in text units; the marker replaces it.
    let (drop_start, drop_end, marker) = match limit.direction {
        TruncateDirection::End => (budget, total, limit.marker.clone()),
        TruncateDirection::Start => (0, total.saturating_sub(budget), limit.marker.clone()),
        TruncateDirection::Middle => {
            let head = budget.div_ceil(2);
            let tail = budget - head;
            let marker = if limit.marker == DEFAULT_TRUNCATE_MARKER {
                format!("{} ", limit.marker)
            } else {
                limit.marker.clone()
            };
            (head, total.saturating_sub(tail), marker)
        }
    };

    let mut out = Vec::new();
    let mut offset = 0usize;
    let mut marker_emitted = false;
    for frag in fragments {
        let Piece::Text(s) = &frag.piece else {
            out.push(frag);
            continue;
        };
        let count = measure.count(s);
        let (start, end) = (offset, offset + count);
        offset = end;
        if end <= drop_start || start >= drop_end {
            out.push(frag);
            continue;
        }
        let mut kept = String::new();
        if start < drop_start {
            kept.push_str(&measure.take_start(s, drop_start - start));
        }
        if !marker_emitted {
            kept.push_str(&marker);
            marker_emitted = true;
        }
        if end > drop_end {
            kept.push_str(&measure.take_end(s, end - drop_end));
        }
        out.push(Fragment::text(frag.ir_range, kept));
    }
    out
}

/// Remove the earliest lowest-priority child, provided at least two children
/// remain and not all of them share the maximum priority. Returns whether a
/// child was removed.
fn evict_one(bx: &mut LayoutBox) -> bool {
    let BoxKind::Group { children, .. } = &mut bx.kind else {
        return false;
    };
    if children.len() <= 1 {
        return false;
    }
    let Some(max_priority) = children.iter().map(|c| c.priority).max() else {
        return false;
    };
    let victim = children
        .iter()
        .enumerate()
        .filter(|(_, c)| c.priority < max_priority)
        .min_by_key(|(index, c)| (c.priority, *index))
        .map(|(index, _)| index);
    match victim {
        Some(index) => {
            children.remove(index);
            true
        }
        None => false,
    }
}

/// Cut `text` down to `budget` units and splice in the marker on the
/// truncated side. The default marker for middle truncation gains a trailing
/// space so the tail does not run into it; custom markers are used verbatim.
pub fn truncate_text(
    text: &str,
    budget: usize,
    measure: &dyn Measure,
    limit: &LimitSpec,
) -> String {
    match limit.direction {
        TruncateDirection::End => {
            format!("{}{}", measure.take_start(text, budget), limit.marker)
        }
        TruncateDirection::Start => {
            format!("{}{}", limit.marker, measure.take_end(text, budget))
        }
        TruncateDirection::Middle => {
            let head = budget.div_ceil(2);
            let tail = budget - head;
            let marker = if limit.marker == DEFAULT_TRUNCATE_MARKER {
                format!("{} ", limit.marker)
            } else {
                limit.marker.clone()
            };
            format!(
                "{}{}{}",
                measure.take_start(text, head),
                marker,
                measure.take_end(text, tail)
            )
        }
    }
}
