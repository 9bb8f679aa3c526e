//! Element extents from start and end marker positions.

use concord_index_core::Position;

use crate::span::Span;

/// Pairs the start and end markers of one element name within a document and
/// returns the element extents, first token to last token inclusive.
///
/// Markers pair like brackets: an end marker closes the innermost open start
/// marker at or before it, so same-named elements may nest. A start and an
/// end marker on the same token belong to the same one-token element or to an
/// element that opened earlier.
///
/// # Errors
///
/// Describes the first end marker without an open element, or the first start
/// marker left open.
pub(crate) fn extents(starts: &[Position], ends: &[Position]) -> Result<Vec<Span>, String> {
    let mut open = Vec::new();
    let mut pending = starts.iter().copied().peekable();
    let mut spans = Vec::with_capacity(ends.len());
    for end in ends.iter().copied() {
        while let Some(start) = pending.next_if(|&start| start <= end) {
            open.push(start);
        }
        let Some(start) = open.pop() else {
            return Err(format!("end marker at {end} has no open element"));
        };
        spans.push(Span::new(start, end + 1));
    }
    if let Some(start) = open.first().copied().or_else(|| pending.next()) {
        return Err(format!("start marker at {start} is never closed"));
    }
    spans.sort_unstable();
    Ok(spans)
}
