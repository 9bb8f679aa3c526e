//! Adjacency joins: sequences and repetitions.

use crate::span::{Span, normalize};

/// Every concatenation `(l.start, r.end)` of a left span `l` and a right span
/// `r` with `r.start == l.end`.
///
/// Both inputs are in canonical order; so is the result.
pub(crate) fn join(left: &[Span], right: &[Span]) -> Vec<Span> {
    let mut joined = Vec::new();
    for l in left {
        let from = right.partition_point(|r| r.start < l.end);
        joined.extend(
            right[from..]
                .iter()
                .take_while(|r| r.start == l.end)
                .map(|r| Span::new(l.start, r.end)),
        );
    }
    normalize(joined)
}

/// Concatenations of `k` adjacent `child` spans for every `k` in
/// `min..=max`.
///
/// `k == 0` contributes the empty span at every token boundary
/// `0..=token_count` of a non-empty document. An unbounded `max` stops once
/// another repetition can no longer change the result.
pub(crate) fn repeat(child: &[Span], min: u32, max: Option<u32>, token_count: u32) -> Vec<Span> {
    let mut spans = Vec::new();
    if min == 0 && token_count > 0 {
        spans.extend((0..=token_count).map(Span::boundary));
    }

    // Spans of non-zero length grow by at least one token per repetition, so
    // layers past the document length are empty.
    let cap = max.unwrap_or_else(|| token_count.max(min).max(1));
    let mut layer = child.to_vec();
    let mut k = 1;
    while k <= cap && !layer.is_empty() {
        if k >= min {
            spans.extend_from_slice(&layer);
        }
        if k == cap {
            break;
        }
        let next = join(&layer, child);
        if next == layer {
            // Every further layer repeats this one.
            if k < min {
                spans.extend_from_slice(&layer);
            }
            break;
        }
        layer = next;
        k += 1;
    }
    normalize(spans)
}
