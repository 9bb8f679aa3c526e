//! Token-level complement.

use concord_ranges::complement_ranges;

use crate::span::Span;

/// Unit spans at every token of `[0, token_count)` that no span in `covered`
/// overlaps. Zero-length spans cover nothing.
///
/// `covered` must be ordered by start, as every per-document span list is.
pub(crate) fn uncovered_tokens(token_count: u32, covered: &[Span]) -> Vec<Span> {
    complement_ranges(token_count, covered.iter().map(Span::as_range))
        .flat_map(|gap| gap.map(Span::unit))
        .collect()
}

/// Every token as a unit span.
pub(crate) fn all_tokens(token_count: u32) -> Vec<Span> {
    (0..token_count).map(Span::unit).collect()
}
