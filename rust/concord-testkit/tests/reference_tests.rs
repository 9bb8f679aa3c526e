use concord_index_core::DocId;
use concord_spans::{Hit, SearchOptions, search};
use concord_testkit::{
    data_gen::{Corpus, CorpusSpec},
    query_gen::QueryGen,
    reference,
};
use itertools::Itertools;

fn cursor_hits(
    tree: &concord_spans::QueryTree,
    index: &concord_memory_index::MemoryIndex,
) -> Vec<Hit> {
    tree.cursor(index)
        .unwrap()
        .hits()
        .collect::<concord_common::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_random_queries_match_reference() {
    let corpus = Corpus::generate(&CorpusSpec::default(), 0x00c0_ffee);
    let index = corpus.build_index().unwrap();
    let mut queries = QueryGen::new(17, 4);
    for i in 0..400 {
        let tree = queries.generate(&index).unwrap();
        let expected = reference::evaluate(&tree, &corpus);
        let actual = cursor_hits(&tree, &index);
        assert_eq!(actual, expected, "query {i}: {tree}");
    }
}

#[test]
fn test_random_queries_over_dense_markup() {
    let spec = CorpusSpec {
        doc_count: 25,
        max_tokens: 20,
        vocabulary: 2,
        markup_density: 0.9,
    };
    let corpus = Corpus::generate(&spec, 99);
    let index = corpus.build_index().unwrap();
    let mut queries = QueryGen::new(5, 3);
    for i in 0..300 {
        let tree = queries.generate(&index).unwrap();
        let expected = reference::evaluate(&tree, &corpus);
        let actual = cursor_hits(&tree, &index);
        assert_eq!(actual, expected, "query {i}: {tree}");
    }
}

#[test]
fn test_hits_are_strictly_ascending() {
    let corpus = Corpus::generate(&CorpusSpec::default(), 1234);
    let index = corpus.build_index().unwrap();
    let mut queries = QueryGen::new(1234, 4);
    for _ in 0..200 {
        let tree = queries.generate(&index).unwrap();
        let hits = cursor_hits(&tree, &index);
        for (a, b) in hits.iter().tuple_windows() {
            assert!((a.doc, a.span) < (b.doc, b.span), "{tree}: {a} before {b}");
        }
    }
}

#[test]
fn test_advance_skips_to_reference_documents() {
    let corpus = Corpus::generate(&CorpusSpec::default(), 77);
    let index = corpus.build_index().unwrap();
    let mut queries = QueryGen::new(77, 3);
    for _ in 0..100 {
        let tree = queries.generate(&index).unwrap();
        let matching = reference::evaluate(&tree, &corpus)
            .into_iter()
            .map(|hit| hit.doc)
            .dedup()
            .collect::<Vec<_>>();

        // Jump by a stride, landing on the first matching document at or past
        // each target.
        let mut cursor = tree.cursor(&index).unwrap();
        for target in (0..corpus.len() as DocId).step_by(3) {
            let expected = matching.iter().copied().find(|&doc| doc >= target);
            let found = cursor.advance_to_document(target).unwrap();
            assert_eq!(found, expected, "{tree}: target {target}");
            if let Some(doc) = found {
                assert_eq!(
                    cursor.spans_in_current_document().as_slice(),
                    reference::evaluate_document(&tree, &corpus, doc).as_slice()
                );
            } else {
                break;
            }
        }
    }
}

#[test]
fn test_search_matches_reference() {
    let corpus = Corpus::generate(
        &CorpusSpec {
            doc_count: 120,
            ..Default::default()
        },
        31,
    );
    let index = corpus.build_index().unwrap();
    let mut queries = QueryGen::new(31, 3);
    for _ in 0..50 {
        let tree = queries.generate(&index).unwrap();
        let expected = reference::evaluate(&tree, &corpus);
        let options = SearchOptions::default().with_parallelism(4);
        let results = search(&tree, &index, &options).unwrap();
        assert_eq!(results.hits, expected, "{tree}");
        assert_eq!(
            results.docs_matched,
            expected.iter().map(|hit| hit.doc).dedup().count()
        );
        assert!(!results.truncated);
    }
}
