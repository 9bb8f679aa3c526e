//! Token-position intervals and per-document span lists.

use std::fmt;
use std::ops::{Deref, Range};
use std::sync::Arc;

use concord_index_core::{DocId, Position};

/// A half-open interval `[start, end)` of token positions within one field of
/// one document.
///
/// Spans order by `start`, then `end`. Ordinary matches have `start < end`;
/// zero-length spans mark a boundary between tokens (edges, zero repetitions).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Span {
        debug_assert!(start <= end, "span {start}..{end} is reversed");
        Span { start, end }
    }

    /// The single token at `position`.
    pub fn unit(position: Position) -> Span {
        Span::new(position, position + 1)
    }

    /// The zero-length boundary just before the token at `position`.
    pub fn boundary(position: Position) -> Span {
        Span::new(position, position)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// `other` lies entirely inside `self`.
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    pub fn as_range(&self) -> Range<Position> {
        self.start..self.end
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// A span within a specific document: one match occurrence.
///
/// Hits order by document first, then by span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hit {
    pub doc: DocId,
    pub span: Span,
}

impl Hit {
    pub fn new(doc: DocId, span: Span) -> Hit {
        Hit { doc, span }
    }
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc, self.span)
    }
}

/// The spans of one node in one document: strictly ascending by
/// `(start, end)`, without duplicates.
///
/// Cloning shares the underlying buffer, and the list can be iterated any
/// number of times, which is what makes per-document results restartable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocSpans(Arc<[Span]>);

impl DocSpans {
    pub fn empty() -> DocSpans {
        DocSpans(Arc::from(Vec::new()))
    }

    /// Wraps spans that are already strictly ascending.
    pub fn from_sorted(spans: Vec<Span>) -> DocSpans {
        debug_assert!(
            spans.windows(2).all(|w| w[0] < w[1]),
            "spans are not strictly ascending"
        );
        DocSpans(Arc::from(spans))
    }

    /// Sorts and de-duplicates `spans`.
    pub fn from_unsorted(spans: Vec<Span>) -> DocSpans {
        DocSpans::from_sorted(normalize(spans))
    }

    pub fn as_slice(&self) -> &[Span] {
        &self.0
    }
}

impl Default for DocSpans {
    fn default() -> DocSpans {
        DocSpans::empty()
    }
}

impl Deref for DocSpans {
    type Target = [Span];

    fn deref(&self) -> &[Span] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a DocSpans {
    type Item = &'a Span;
    type IntoIter = std::slice::Iter<'a, Span>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Brings a list of spans into the canonical per-document order.
pub(crate) fn normalize(mut spans: Vec<Span>) -> Vec<Span> {
    spans.sort_unstable();
    spans.dedup();
    spans
}
