//! Span extension and edge extraction.

use crate::{
    node::{Direction, EdgeSide},
    span::{Span, normalize},
};

/// Each child span extended by `n` tokens towards `direction`, for every `n`
/// in `min..=max` that stays within `[0, token_count]`. An unbounded `max`
/// extends up to the document edge.
pub(crate) fn expand(
    child: &[Span],
    direction: Direction,
    min: u32,
    max: Option<u32>,
    token_count: u32,
) -> Vec<Span> {
    let mut spans = Vec::new();
    for s in child {
        let room = match direction {
            Direction::Left => s.start,
            Direction::Right => token_count.saturating_sub(s.end),
        };
        let longest = max.map_or(room, |max| max.min(room));
        if min > longest {
            continue;
        }
        spans.extend((min..=longest).map(|n| match direction {
            Direction::Left => Span::new(s.start - n, s.end),
            Direction::Right => Span::new(s.start, s.end + n),
        }));
    }
    normalize(spans)
}

/// The zero-length span at the chosen edge of every child span.
pub(crate) fn edges(child: &[Span], side: EdgeSide) -> Vec<Span> {
    let edges = child
        .iter()
        .map(|s| match side {
            EdgeSide::Start => Span::boundary(s.start),
            EdgeSide::End => Span::boundary(s.end),
        })
        .collect();
    normalize(edges)
}
