//! Interfaces of the positional token index consumed by the span algebra.
//!
//! The span algebra never reads index storage directly. It consumes three
//! capabilities, each defined here as a trait so that any index
//! implementation can serve queries:
//!
//! - [`PostingReader`]: opens ascending `(document, position)` streams for a
//!   [`TermKey`] and reports per-document token counts of a field
//! - [`PostingCursor`]: the forward-only cursor over one such stream
//! - [`TermResolver`]: expands a [`TermPattern`] (wildcard, prefix, regex,
//!   fuzzy) into the concrete terms of one field property
//!
//! # Terms and streams
//!
//! A field is a token stream whose tokens carry several parallel layers: named
//! properties (word form, lemma, part-of-speech), markup markers for element
//! starts and ends, and element attributes. A [`TermKey`] addresses one value
//! within one of those layers. Attribute keys and values are kept apart in the
//! key, so no separator escaping is ever needed.

pub mod reader;
pub mod term;

pub use reader::{EmptyPostings, PostingCursor, PostingReader, TermResolver};
pub use term::{Stream, TermKey, TermPattern};

/// Identifier of a document within one index, dense and ascending.
pub type DocId = u32;

/// Token offset within one field of a document.
pub type Position = u32;
