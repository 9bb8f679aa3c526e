//! Read side of the in-memory index.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use concord_common::Result;
use concord_index_core::{
    DocId, EmptyPostings, Position, PostingCursor, PostingReader, Stream, TermKey,
};

/// Postings of one term within one document.
#[derive(Debug, Clone)]
pub(crate) struct DocPostings {
    pub doc: DocId,
    /// Strictly ascending token positions.
    pub positions: Vec<Position>,
}

/// Term dictionary of one stream: terms in ascending order, each with its
/// postings in ascending document order.
pub(crate) type TermDictionary = BTreeMap<Arc<str>, Vec<DocPostings>>;

/// Everything indexed for one field.
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldData {
    /// Declared property names, in token value order.
    pub properties: Vec<Arc<str>>,
    /// Token count per document, indexed by document id.
    pub token_counts: Vec<u32>,
    /// Term dictionaries keyed by stream.
    pub streams: AHashMap<Stream, TermDictionary>,
}

impl FieldData {
    pub fn has_property(&self, property: &str) -> bool {
        self.properties.iter().any(|p| p.as_ref() == property)
    }
}

/// A positional token index held entirely in memory.
///
/// Built with [`MemoryIndexBuilder`](crate::MemoryIndexBuilder); immutable
/// afterwards, so it can be shared across threads and queried concurrently.
#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    pub(crate) fields: AHashMap<Arc<str>, FieldData>,
    pub(crate) doc_count: DocId,
}

impl MemoryIndex {
    /// Number of documents in the index.
    pub fn doc_count(&self) -> DocId {
        self.doc_count
    }

    /// Names of the indexed fields, in no particular order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(|name| name.as_ref())
    }

    /// Number of distinct terms in one stream of a field.
    pub fn term_count(&self, field: &str, stream: &Stream) -> usize {
        self.dictionary(field, stream).map_or(0, BTreeMap::len)
    }

    pub(crate) fn field(&self, field: &str) -> Option<&FieldData> {
        self.fields.get(field)
    }

    pub(crate) fn dictionary(&self, field: &str, stream: &Stream) -> Option<&TermDictionary> {
        self.field(field)?.streams.get(stream)
    }

    fn posting_list(&self, key: &TermKey) -> Option<&[DocPostings]> {
        self.dictionary(&key.field, &key.stream)?
            .get(key.value.as_ref())
            .map(Vec::as_slice)
    }
}

impl PostingReader for MemoryIndex {
    fn postings(&self, key: &TermKey) -> Result<Box<dyn PostingCursor + '_>> {
        Ok(match self.posting_list(key) {
            Some(list) => Box::new(MemoryPostings::new(list)),
            None => Box::new(EmptyPostings),
        })
    }

    fn token_count(&self, field: &str, doc: DocId) -> Result<u32> {
        Ok(self
            .field(field)
            .and_then(|f| f.token_counts.get(doc as usize))
            .copied()
            .unwrap_or(0))
    }

    fn doc_id_limit(&self) -> DocId {
        self.doc_count
    }

    fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    fn has_property(&self, field: &str, property: &str) -> bool {
        self.field(field).is_some_and(|f| f.has_property(property))
    }
}

/// Cursor over one in-memory posting list.
pub struct MemoryPostings<'a> {
    list: &'a [DocPostings],
    /// Index of the current entry; meaningful only once `started` is set.
    idx: usize,
    started: bool,
}

impl<'a> MemoryPostings<'a> {
    pub(crate) fn new(list: &'a [DocPostings]) -> MemoryPostings<'a> {
        MemoryPostings {
            list,
            idx: 0,
            started: false,
        }
    }

    fn current(&self) -> Option<&'a DocPostings> {
        if self.started {
            self.list.get(self.idx)
        } else {
            None
        }
    }
}

impl PostingCursor for MemoryPostings<'_> {
    fn seek(&mut self, target: DocId) -> Result<Option<DocId>> {
        self.started = true;
        if self.idx < self.list.len() {
            self.idx += self.list[self.idx..].partition_point(|p| p.doc < target);
        }
        Ok(self.current().map(|p| p.doc))
    }

    fn doc(&self) -> Option<DocId> {
        self.current().map(|p| p.doc)
    }

    fn positions(&self) -> &[Position] {
        self.current().map_or(&[], |p| p.positions.as_slice())
    }
}
