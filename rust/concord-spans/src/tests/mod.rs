mod operator_tests;

use concord_index_core::DocId;
use concord_memory_index::{AnnotatedField, MemoryIndex, MemoryIndexBuilder};

use crate::{QueryTree, Span};

/// An index with a single-property `contents` field, one document per entry.
pub(crate) fn word_index(docs: &[&str]) -> MemoryIndex {
    let mut builder = MemoryIndexBuilder::new();
    builder.add_field("contents", &["word"]).unwrap();
    for text in docs {
        builder
            .add_document(vec![AnnotatedField::from_words("contents", text)])
            .unwrap();
    }
    builder.build()
}

pub(crate) fn collect_hits(tree: &QueryTree, index: &MemoryIndex) -> Vec<(DocId, Span)> {
    tree.cursor(index)
        .unwrap()
        .hits()
        .map(|hit| hit.map(|hit| (hit.doc, hit.span)))
        .collect::<concord_common::Result<Vec<_>>>()
        .unwrap()
}

pub(crate) fn hits(pairs: &[(DocId, u32, u32)]) -> Vec<(DocId, Span)> {
    pairs
        .iter()
        .map(|&(doc, start, end)| (doc, Span::new(start, end)))
        .collect()
}
