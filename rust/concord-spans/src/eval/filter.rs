//! Positional filters: keep producer spans by their relation to filter spans.

use crate::{node::FilterOp, span::Span};

/// The producer spans satisfying `op` against at least one filter span.
///
/// Both inputs are in canonical order. The result is a subsequence of
/// `producer`, so it stays canonical.
pub(crate) fn apply(op: FilterOp, producer: &[Span], filter: &[Span]) -> Vec<Span> {
    if producer.is_empty() || filter.is_empty() {
        return Vec::new();
    }
    match op {
        FilterOp::Containing => keep(producer, |p| contains_any(p, filter)),
        FilterOp::Within => {
            // Largest end among the filter spans starting at or before each
            // index.
            let reach: Vec<u32> = filter
                .iter()
                .scan(0, |max_end, f| {
                    *max_end = f.end.max(*max_end);
                    Some(*max_end)
                })
                .collect();
            keep(producer, |p| {
                let n = filter.partition_point(|f| f.start <= p.start);
                n > 0 && reach[n - 1] >= p.end
            })
        }
        FilterOp::StartsAt => keep(producer, |p| {
            filter.binary_search_by_key(&p.start, |f| f.start).is_ok()
        }),
        FilterOp::EndsAt => {
            let mut ends: Vec<u32> = filter.iter().map(|f| f.end).collect();
            ends.sort_unstable();
            ends.dedup();
            keep(producer, |p| ends.binary_search(&p.end).is_ok())
        }
    }
}

fn keep(producer: &[Span], pred: impl Fn(&Span) -> bool) -> Vec<Span> {
    producer.iter().copied().filter(|p| pred(p)).collect()
}

/// Some filter span lies inside `p`.
fn contains_any(p: &Span, filter: &[Span]) -> bool {
    let from = filter.partition_point(|f| f.start < p.start);
    filter[from..]
        .iter()
        .take_while(|f| f.start <= p.end)
        .any(|f| p.contains(f))
}
