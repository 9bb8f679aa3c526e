//! Document-at-a-time iteration over the matches of a query.

use concord_common::{Result, try_or_ret_some_err};
use concord_index_core::{DocId, PostingReader};

use crate::{
    eval::Evaluator,
    span::{DocSpans, Hit},
    tree::QueryTree,
};

/// Forward-only iterator over the documents in which a query matches, and
/// over the spans of the root in each of them.
///
/// A cursor owns all evaluation state: the posting cursors of the query
/// leaves and the per-document results of every node. The state of a
/// document is released as soon as the cursor moves to the next one.
///
/// Cursors are not `Sync`, but any number of them may evaluate the same
/// [`QueryTree`] over the same reader concurrently.
pub struct SpanCursor<'t, 'r> {
    tree: &'t QueryTree,
    eval: Evaluator<'t, 'r>,
    doc: Option<DocId>,
    spans: DocSpans,
    exhausted: bool,
}

impl<'t, 'r> SpanCursor<'t, 'r> {
    pub fn open(tree: &'t QueryTree, reader: &'r dyn PostingReader) -> Result<SpanCursor<'t, 'r>> {
        log::debug!(
            "opening span cursor over {} documents: {tree}",
            reader.doc_id_limit()
        );
        Ok(SpanCursor {
            tree,
            eval: Evaluator::new(tree, reader),
            doc: None,
            spans: DocSpans::empty(),
            exhausted: false,
        })
    }

    /// The document the cursor is positioned on.
    pub fn doc(&self) -> Option<DocId> {
        self.doc
    }

    /// Moves to the first matching document `>= target` and returns it, or
    /// `None` once no matching document remains.
    ///
    /// A target at or below the current document leaves the cursor where it
    /// is. Documents skipped over are never revisited, and an exhausted
    /// cursor stays exhausted.
    pub fn advance_to_document(&mut self, target: DocId) -> Result<Option<DocId>> {
        if self.exhausted {
            return Ok(None);
        }
        if let Some(doc) = self.doc.filter(|&doc| target <= doc) {
            return Ok(Some(doc));
        }

        let root = self.tree.root();
        let mut target = target;
        self.doc = None;
        self.spans = DocSpans::empty();
        while let Some(doc) = self.eval.candidate(root, target)? {
            let spans = self.eval.spans(root, doc)?;
            if !spans.is_empty() {
                log::trace!("document {doc} matches with {} spans", spans.len());
                self.doc = Some(doc);
                self.spans = spans;
                return Ok(Some(doc));
            }
            let Some(next) = doc.checked_add(1) else {
                break;
            };
            target = next;
        }
        self.exhausted = true;
        Ok(None)
    }

    /// Moves to the next matching document after the current one.
    pub fn next_document(&mut self) -> Result<Option<DocId>> {
        let target = match self.doc {
            Some(doc) => match doc.checked_add(1) {
                Some(next) => next,
                None => return Ok(None),
            },
            None => 0,
        };
        self.advance_to_document(target)
    }

    /// Spans of the root in the current document, strictly ascending.
    /// Empty when the cursor is not positioned on a document.
    pub fn spans_in_current_document(&self) -> DocSpans {
        self.spans.clone()
    }

    /// Consumes the cursor, yielding every remaining hit in `(doc, span)`
    /// order, starting with the spans of the current document.
    pub fn hits(self) -> Hits<'t, 'r> {
        let doc = self.doc;
        let pending = self.spans.clone();
        Hits {
            cursor: self,
            doc,
            pending,
            next: 0,
            done: false,
        }
    }
}

/// Iterator returned by [`SpanCursor::hits`].
///
/// Stops after the first error.
pub struct Hits<'t, 'r> {
    cursor: SpanCursor<'t, 'r>,
    doc: Option<DocId>,
    pending: DocSpans,
    next: usize,
    done: bool,
}

impl Iterator for Hits<'_, '_> {
    type Item = Result<Hit>;

    fn next(&mut self) -> Option<Result<Hit>> {
        loop {
            if let (Some(doc), Some(&span)) = (self.doc, self.pending.get(self.next)) {
                self.next += 1;
                return Some(Ok(Hit::new(doc, span)));
            }
            if self.done {
                return None;
            }

            let next = self.cursor.next_document();
            self.done = next.is_err();
            let Some(doc) = try_or_ret_some_err!(next) else {
                self.done = true;
                return None;
            };
            self.doc = Some(doc);
            self.pending = self.cursor.spans_in_current_document();
            self.next = 0;
        }
    }
}
