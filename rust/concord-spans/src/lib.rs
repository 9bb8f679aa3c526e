//! Span-matching algebra over a positional token index.
//!
//! A query is a DAG of operators ([`NodeKind`]) built with a
//! [`QueryBuilder`] and frozen into a [`QueryTree`]. Every operator maps a
//! document to the ordered set of [`Span`]s (half-open token intervals) where
//! it matches:
//!
//! - leaves read posting streams: terms, term patterns, element extents
//! - token-set operators: AND, OR, NOT, ANY
//! - document-level operators: DOC-AND, DOC-AND-NOT
//! - adjacency operators: sequence and bounded repetition
//! - positional filters: containing, within, starts-at, ends-at
//! - span reshaping: expansion and edges
//!
//! Evaluation is document-at-a-time. A [`SpanCursor`] leapfrogs the posting
//! cursors of the leaves to candidate documents, evaluates the whole tree in
//! each candidate and moves on; [`search`] drives cursors over a document
//! range and collects [`Hit`]s, optionally on a worker pool.
//!
//! Within a document every node's spans are strictly ascending by
//! `(start, end)` and free of duplicates, and hits are reported in
//! `(doc, start, end)` order.

mod builder;
mod cursor;
mod eval;
mod node;
mod search;
mod span;
mod tree;

pub use builder::QueryBuilder;
pub use cursor::{Hits, SpanCursor};
pub use node::{Direction, EdgeSide, FilterOp, NodeId, NodeKind, QueryNode};
pub use search::{SearchOptions, SearchResults, search};
pub use span::{DocSpans, Hit, Span};
pub use tree::QueryTree;

#[cfg(test)]
mod tests;
