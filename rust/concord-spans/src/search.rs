//! Collecting hits over a document range, optionally in parallel.

use std::ops::Range;

use concord_common::{Result, error::Error, verify_arg};
use concord_index_core::{DocId, PostingReader};
use rayon::prelude::*;

use crate::{span::Hit, tree::QueryTree};

/// Bounds and execution settings of [`search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOptions {
    /// Stop after this many hits.
    pub max_hits: Option<usize>,
    /// Only documents in this range are searched; the whole index when unset.
    pub doc_range: Option<Range<DocId>>,
    /// Number of worker threads. `1` searches on the calling thread.
    pub parallelism: usize,
}

impl Default for SearchOptions {
    fn default() -> SearchOptions {
        SearchOptions {
            max_hits: None,
            doc_range: None,
            parallelism: 1,
        }
    }
}

impl SearchOptions {
    pub fn with_max_hits(mut self, max_hits: usize) -> SearchOptions {
        self.max_hits = Some(max_hits);
        self
    }

    pub fn with_doc_range(mut self, doc_range: Range<DocId>) -> SearchOptions {
        self.doc_range = Some(doc_range);
        self
    }

    pub fn with_parallelism(mut self, parallelism: usize) -> SearchOptions {
        self.parallelism = parallelism;
        self
    }
}

/// Hits of a search, in `(doc, span)` order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub hits: Vec<Hit>,
    /// Number of distinct documents among `hits`.
    pub docs_matched: usize,
    /// More hits exist beyond `max_hits`.
    pub truncated: bool,
}

/// Evaluates `tree` over `reader` and collects its hits.
///
/// With `parallelism > 1` the document range is split into contiguous chunks
/// that workers evaluate with cursors of their own; the chunk results are
/// concatenated in document order, so the outcome does not depend on the
/// number of workers.
pub fn search(
    tree: &QueryTree,
    reader: &dyn PostingReader,
    options: &SearchOptions,
) -> Result<SearchResults> {
    verify_arg!(parallelism, options.parallelism > 0);
    let limit = reader.doc_id_limit();
    let range = match &options.doc_range {
        Some(range) => range.start.min(limit)..range.end.min(limit),
        None => 0..limit,
    };

    let results = if options.parallelism == 1 || range.len() < 2 {
        search_range(tree, reader, range, options.max_hits)?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(options.parallelism)
            .build()
            .map_err(|e| Error::invalid_arg("parallelism", e.to_string()))?;
        let chunks = split(range, options.parallelism * 4);
        let parts = pool.install(|| {
            chunks
                .into_par_iter()
                .map(|chunk| search_range(tree, reader, chunk, options.max_hits))
                .collect::<Result<Vec<_>>>()
        })?;
        merge(parts, options.max_hits)
    };

    log::debug!(
        "search found {} hits in {} documents{}",
        results.hits.len(),
        results.docs_matched,
        if results.truncated { " (truncated)" } else { "" }
    );
    Ok(results)
}

fn search_range(
    tree: &QueryTree,
    reader: &dyn PostingReader,
    range: Range<DocId>,
    max_hits: Option<usize>,
) -> Result<SearchResults> {
    let mut results = SearchResults::default();
    if range.is_empty() {
        return Ok(results);
    }
    let max_hits = max_hits.unwrap_or(usize::MAX);
    let mut cursor = tree.cursor(reader)?;
    let mut next = cursor.advance_to_document(range.start)?;
    while let Some(doc) = next.filter(|&doc| doc < range.end) {
        let spans = cursor.spans_in_current_document();
        let room = max_hits - results.hits.len();
        if spans.len() > room {
            results.truncated = true;
        }
        if room > 0 {
            results.docs_matched += 1;
            results
                .hits
                .extend(spans.iter().take(room).map(|&span| Hit::new(doc, span)));
        }
        if results.truncated {
            break;
        }
        if results.hits.len() == max_hits {
            // Full: only look whether another hit exists.
            results.truncated = cursor.next_document()?.is_some_and(|doc| doc < range.end);
            break;
        }
        next = cursor.next_document()?;
    }
    Ok(results)
}

/// Splits `range` into at most `count` contiguous, non-empty chunks.
fn split(range: Range<DocId>, count: usize) -> Vec<Range<DocId>> {
    let len = range.len() as u64;
    let count = (count as u64).clamp(1, len.max(1));
    let size = len.div_ceil(count);
    (0..count)
        .map(|i| {
            let start = range.start as u64 + i * size;
            let end = (start + size).min(range.end as u64);
            start as DocId..end as DocId
        })
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

/// Concatenates chunk results in document order, re-applying `max_hits`.
fn merge(parts: Vec<SearchResults>, max_hits: Option<usize>) -> SearchResults {
    let max_hits = max_hits.unwrap_or(usize::MAX);
    let mut merged = SearchResults::default();
    for part in parts {
        if merged.hits.len() == max_hits {
            merged.truncated |= part.truncated || !part.hits.is_empty();
            continue;
        }
        let room = max_hits - merged.hits.len();
        if part.hits.len() > room {
            merged.truncated = true;
        } else {
            merged.truncated |= part.truncated;
        }
        for hit in part.hits.into_iter().take(room) {
            if merged.hits.last().map(|h| h.doc) != Some(hit.doc) {
                merged.docs_matched += 1;
            }
            merged.hits.push(hit);
        }
    }
    merged
}
