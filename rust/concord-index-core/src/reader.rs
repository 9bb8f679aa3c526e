//! Posting access and term resolution capabilities.
//!
//! These traits are the only way the span algebra touches index data. All of
//! them are read-only; a single reader may serve any number of concurrently
//! evaluated queries.

use concord_common::Result;

use crate::{DocId, Position, TermKey, TermPattern};

/// Read access to the posting streams and token counts of an index.
///
/// # Thread Safety
///
/// Readers must be `Send + Sync`: the search layer evaluates disjoint document
/// ranges on worker threads, each opening its own cursors over the same
/// reader.
///
/// # Errors
///
/// Storage failures surface as errors from [`postings`](Self::postings),
/// [`token_count`](Self::token_count) or the returned cursors. The span
/// algebra treats them as fatal for the whole query and never retries.
pub trait PostingReader: Send + Sync {
    /// Opens the posting stream of `key`.
    ///
    /// A term that does not occur in the index yields an empty cursor, not an
    /// error.
    fn postings(&self, key: &TermKey) -> Result<Box<dyn PostingCursor + '_>>;

    /// Number of tokens of `field` in `doc`; zero when the document has no
    /// such field or `doc` is out of range.
    fn token_count(&self, field: &str, doc: DocId) -> Result<u32>;

    /// Exclusive upper bound of the document ids in the index.
    fn doc_id_limit(&self) -> DocId;

    /// Whether `field` exists in the index schema.
    fn has_field(&self, field: &str) -> bool;

    /// Whether `property` is an annotation layer of `field`.
    fn has_property(&self, field: &str, property: &str) -> bool;
}

/// A forward-only cursor over one ascending `(document, position)` stream.
///
/// The cursor starts before the first document. Seeking never moves
/// backwards: a target at or below the current document leaves the cursor
/// where it is.
pub trait PostingCursor {
    /// Moves to the first document `>= target` that has postings and returns
    /// it, or `None` once the stream is exhausted.
    fn seek(&mut self, target: DocId) -> Result<Option<DocId>>;

    /// The current document, if the cursor is positioned on one.
    fn doc(&self) -> Option<DocId>;

    /// Positions within the current document, strictly ascending.
    /// Empty when the cursor is not positioned on a document.
    fn positions(&self) -> &[Position];
}

/// Expands term patterns into concrete terms.
pub trait TermResolver: Send + Sync {
    /// Returns the distinct terms of `field`'s `property` matched by
    /// `pattern`, in ascending order. No match yields an empty list.
    fn resolve(&self, field: &str, property: &str, pattern: &TermPattern) -> Result<Vec<String>>;
}

/// Cursor over a stream with no postings.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyPostings;

impl PostingCursor for EmptyPostings {
    fn seek(&mut self, _target: DocId) -> Result<Option<DocId>> {
        Ok(None)
    }

    fn doc(&self) -> Option<DocId> {
        None
    }

    fn positions(&self) -> &[Position] {
        &[]
    }
}
