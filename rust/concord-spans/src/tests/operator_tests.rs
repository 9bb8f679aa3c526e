use concord_common::error::ErrorKind;
use concord_index_core::{DocId, TermKey};
use concord_memory_index::{AnnotatedField, Element, MemoryIndex, MemoryIndexBuilder};

use super::{collect_hits, hits, scripted::ScriptedReader, word_index};
use crate::{Direction, EdgeSide, QueryBuilder, Span};

#[test]
fn test_term_produces_unit_spans() {
    let index = word_index(&["a b a", "b", "c a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let tree = q.build(a).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 1), (0, 2, 3), (2, 1, 2)])
    );
}

#[test]
fn test_terms_are_merged_in_position_order() {
    let index = word_index(&["b a c", "c"]);
    let mut q = QueryBuilder::new(&index);
    let ab = q.terms("contents", "word", ["a", "b", "zzz"]).unwrap();
    let tree = q.build(ab).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 1), (0, 1, 2)]));
}

fn or_of_words(index: &MemoryIndex, words: &[&str]) -> Vec<(DocId, Span)> {
    let mut q = QueryBuilder::new(index);
    let children = words
        .iter()
        .map(|word| q.term("contents", "word", word).unwrap())
        .collect();
    let or = q.or("contents", children).unwrap();
    collect_hits(&q.build(or).unwrap(), index)
}

#[test]
fn test_or_is_commutative_and_idempotent() {
    let index = word_index(&["a b a", "b c", "c a b"]);
    assert_eq!(or_of_words(&index, &["a", "b"]), or_of_words(&index, &["b", "a"]));
    assert_eq!(or_of_words(&index, &["a", "a"]), or_of_words(&index, &["a"]));
    assert_eq!(
        or_of_words(&index, &["a", "b"]),
        hits(&[(0, 0, 1), (0, 1, 2), (0, 2, 3), (1, 0, 1), (2, 1, 2), (2, 2, 3)])
    );
}

#[test]
fn test_empty_and_or_match_nothing() {
    let index = word_index(&["a b"]);
    let mut q = QueryBuilder::new(&index);
    let and = q.and("contents", vec![]).unwrap();
    let or = q.or("contents", vec![]).unwrap();
    let both = q.or("contents", vec![and, or]).unwrap();
    let tree = q.build(both).unwrap();
    assert!(collect_hits(&tree, &index).is_empty());
}

#[test]
fn test_and_requires_identical_spans() {
    let index = word_index(&["a b a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let ab = q.terms("contents", "word", ["a", "b"]).unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let same = q.and("contents", vec![a, ab]).unwrap();
    let disjoint = q.and("contents", vec![a, b]).unwrap();
    let root = q.or("contents", vec![same, disjoint]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 1), (0, 2, 3)]));
}

#[test]
fn test_not_complements_the_token_range() {
    let index = word_index(&["p q p q p", "p p", ""]);
    let mut q = QueryBuilder::new(&index);
    let qq = q.term("contents", "word", "q").unwrap();
    let not = q.not("contents", qq).unwrap();
    let tree = q.build(not).unwrap();
    // Documents without the child match everywhere; empty documents nowhere.
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 1), (0, 2, 3), (0, 4, 5), (1, 0, 1), (1, 1, 2)])
    );
}

#[test]
fn test_any_matches_every_token() {
    let index = word_index(&["x y", "", "z"]);
    let mut q = QueryBuilder::new(&index);
    let any = q.any("contents").unwrap();
    let tree = q.build(any).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 1), (0, 1, 2), (2, 0, 1)])
    );
}

#[test]
fn test_doc_and_keeps_first_child_spans() {
    let index = word_index(&["a b", "a c", "b", "b a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let root = q.doc_and("contents", vec![a, b]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 1), (3, 1, 2)]));
}

#[test]
fn test_doc_and_not_filters_whole_documents() {
    let index = word_index(&["a b", "a c", "b", "c a a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let root = q.doc_and_not(a, b).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(1, 0, 1), (3, 1, 2), (3, 2, 3)])
    );
}

#[test]
fn test_sequence_is_an_exact_concatenation() {
    let index = word_index(&["the big dog the dog", "dog the"]);
    let mut q = QueryBuilder::new(&index);
    let the = q.term("contents", "word", "the").unwrap();
    let dog = q.term("contents", "word", "dog").unwrap();
    let any = q.any("contents").unwrap();
    let adjacent = q.sequence("contents", vec![the, dog]).unwrap();
    let gapped = q.sequence("contents", vec![the, any, dog]).unwrap();
    let root = q.or("contents", vec![adjacent, gapped]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 3), (0, 3, 5)]));
}

#[test]
fn test_repetition_enumerates_every_count() {
    let index = word_index(&["w w w w", "w x w"]);
    let mut q = QueryBuilder::new(&index);
    let w = q.term("contents", "word", "w").unwrap();
    let rep = q.repetition(w, 2, Some(3)).unwrap();
    let tree = q.build(rep).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 2), (0, 0, 3), (0, 1, 3), (0, 1, 4), (0, 2, 4)])
    );
}

#[test]
fn test_optional_gap_inside_sequence() {
    let index = word_index(&["a b a c b", "a a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let any = q.any("contents").unwrap();
    let gap = q.repetition(any, 0, Some(1)).unwrap();
    let seq = q.sequence("contents", vec![a, gap, b]).unwrap();
    let tree = q.build(seq).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 2), (0, 2, 5)]));
}

#[test]
fn test_expansion_is_clipped_to_the_document() {
    let index = word_index(&["a x y", "x a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let right = q.expansion(a, Direction::Right, 1, Some(5)).unwrap();
    let tree = q.build(right).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 2), (0, 0, 3)]));

    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let left = q.expansion(a, Direction::Left, 0, None).unwrap();
    let tree = q.build(left).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 1), (1, 0, 2), (1, 1, 2)])
    );
}

#[test]
fn test_edges_anchor_sequences() {
    let index = word_index(&["a b", "a c", "b"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let b_start = q.edge(b, EdgeSide::Start).unwrap();
    // `a` directly followed by `b`, without including `b` in the span.
    let seq = q.sequence("contents", vec![a, b_start]).unwrap();
    let tree = q.build(seq).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 0, 1)]));

    let mut q = QueryBuilder::new(&index);
    let b = q.term("contents", "word", "b").unwrap();
    let end = q.edge(b, EdgeSide::End).unwrap();
    let tree = q.build(end).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 2, 2), (2, 1, 1)]));
}

fn annotated_index() -> MemoryIndex {
    let mut builder = MemoryIndexBuilder::new();
    builder.add_field("contents", &["word", "pos"]).unwrap();
    // [s [np The cat np] sat s] [s [np it np] [np me np] s]
    builder
        .add_document(vec![
            AnnotatedField::new("contents")
                .with_token(&["The", "DET"])
                .with_token(&["cat", "NOUN"])
                .with_token(&["sat", "VERB"])
                .with_token(&["it", "PRON"])
                .with_token(&["me", "PRON"])
                .with_element(Element::new("s", 0..3))
                .with_element(Element::new("s", 3..5).with_attribute("lang", "en"))
                .with_element(Element::new("np", 0..2).with_attribute("type", "full"))
                .with_element(
                    Element::new("np", 3..4)
                        .with_attribute("type", "pron")
                        .with_attribute("case", "nom"),
                )
                .with_element(
                    Element::new("np", 4..5)
                        .with_attribute("type", "pron")
                        .with_attribute("case", "acc"),
                ),
        ])
        .unwrap();
    // A document without markup.
    builder
        .add_document(vec![AnnotatedField::new("contents").with_token(&["cat", "NOUN"])])
        .unwrap();
    builder.build()
}

#[test]
fn test_tags_recover_element_extents() {
    let index = annotated_index();
    let mut q = QueryBuilder::new(&index);
    let s = q.tags("contents", "s", &[]).unwrap();
    let np = q.tags("contents", "np", &[]).unwrap();
    let root = q.or("contents", vec![s, np]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 2), (0, 0, 3), (0, 3, 4), (0, 3, 5), (0, 4, 5)])
    );
}

#[test]
fn test_tags_filtered_by_attributes() {
    let index = annotated_index();
    let mut q = QueryBuilder::new(&index);
    let pron = q.tags("contents", "np", &[("type", "pron")]).unwrap();
    let tree = q.build(pron).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 3, 4), (0, 4, 5)]));

    let mut q = QueryBuilder::new(&index);
    let acc = q.tags("contents", "np", &[("type", "pron"), ("case", "acc")]).unwrap();
    let tree = q.build(acc).unwrap();
    assert_eq!(collect_hits(&tree, &index), hits(&[(0, 4, 5)]));

    // An attribute of another element on the same token does not count.
    let mut q = QueryBuilder::new(&index);
    let s = q.tags("contents", "s", &[("type", "pron")]).unwrap();
    let tree = q.build(s).unwrap();
    assert!(collect_hits(&tree, &index).is_empty());
}

#[test]
fn test_containment_against_elements() {
    let index = annotated_index();
    let mut q = QueryBuilder::new(&index);
    let s = q.tags("contents", "s", &[]).unwrap();
    let noun = q.term("contents", "pos", "NOUN").unwrap();
    let pron = q.term("contents", "pos", "PRON").unwrap();
    let with_noun = q.containing(s, noun).unwrap();
    let pron_in_s = q.within(pron, s).unwrap();
    let root = q.or("contents", vec![with_noun, pron_in_s]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 3), (0, 3, 4), (0, 4, 5)])
    );
}

#[test]
fn test_shared_node_serves_several_parents() {
    let index = word_index(&["a b", "a c", "a a"]);
    let mut q = QueryBuilder::new(&index);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let c = q.term("contents", "word", "c").unwrap();
    let ac = q.sequence("contents", vec![a, c]).unwrap();
    let ab = q.sequence("contents", vec![a, b]).unwrap();
    let aa = q.sequence("contents", vec![a, a]).unwrap();
    let root = q.or("contents", vec![ac, ab, aa]).unwrap();
    let tree = q.build(root).unwrap();
    assert_eq!(
        collect_hits(&tree, &index),
        hits(&[(0, 0, 2), (1, 0, 2), (2, 0, 2)])
    );
}

#[test]
fn test_unbalanced_markup_is_an_index_consistency_error() {
    let reader = ScriptedReader {
        postings: vec![
            (TermKey::open_tag("contents", "s"), vec![(2, vec![0, 3])]),
            (TermKey::close_tag("contents", "s"), vec![(2, vec![1])]),
        ],
        token_counts: vec![5; 4],
        doc_limit: 4,
        fail_from: None,
    };
    let mut q = QueryBuilder::new(&reader);
    let s = q.tags("contents", "s", &[]).unwrap();
    let any = q.any("contents").unwrap();
    let seq = q.sequence("contents", vec![any, s]).unwrap();
    let tree = q.build(seq).unwrap();

    let mut cursor = tree.cursor(&reader).unwrap();
    let err = cursor.next_document().unwrap_err();
    assert!(
        matches!(
            err.kind(),
            ErrorKind::IndexConsistency {
                operator: "tags",
                doc: 2,
                ..
            }
        ),
        "{err}"
    );
    assert_eq!(err.node(), Some(s.as_u32()));
}

#[test]
fn test_index_failure_aborts_with_context() {
    let reader = ScriptedReader {
        postings: vec![(
            TermKey::property("contents", "word", "a"),
            (0..4).map(|doc| (doc, vec![0])).collect(),
        )],
        token_counts: vec![1; 4],
        doc_limit: 4,
        fail_from: Some(2),
    };
    let mut q = QueryBuilder::new(&reader);
    let a = q.term("contents", "word", "a").unwrap();
    let tree = q.build(a).unwrap();

    let results: Vec<_> = tree.cursor(&reader).unwrap().hits().collect();
    assert_eq!(results.len(), 3);
    assert!(results[..2].iter().all(|hit| hit.is_ok()));
    let err = results[2].as_ref().unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::Evaluation { operator: "term", .. }),
        "{err}"
    );
    assert_eq!(err.node(), Some(a.as_u32()));
    assert_eq!(err.doc(), Some(2));
}

#[test]
fn test_token_count_failure_names_the_failing_document() {
    let reader = ScriptedReader {
        postings: Vec::new(),
        token_counts: vec![2, 0, 0, 0, 3],
        doc_limit: 5,
        fail_from: Some(3),
    };
    let mut q = QueryBuilder::new(&reader);
    let any = q.any("contents").unwrap();
    let tree = q.build(any).unwrap();

    let mut cursor = tree.cursor(&reader).unwrap();
    assert_eq!(cursor.next_document().unwrap(), Some(0));
    let err = cursor.next_document().unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::Evaluation { operator: "any", .. }),
        "{err}"
    );
    assert_eq!(err.node(), Some(any.as_u32()));
    assert_eq!(err.doc(), Some(3));
}

#[test]
fn test_shared_operands_still_skip_documents() {
    // Reading any document from 50 on fails, so the query must jump from the
    // last match straight to exhaustion.
    let reader = ScriptedReader {
        postings: vec![
            (
                TermKey::property("contents", "word", "a"),
                vec![(1, vec![0]), (3, vec![1])],
            ),
            (
                TermKey::property("contents", "word", "b"),
                vec![(1, vec![1]), (3, vec![0])],
            ),
        ],
        token_counts: vec![2; 100],
        doc_limit: 100,
        fail_from: Some(50),
    };
    let mut q = QueryBuilder::new(&reader);
    let a = q.term("contents", "word", "a").unwrap();
    let b = q.term("contents", "word", "b").unwrap();
    let ab = q.sequence("contents", vec![a, b]).unwrap();
    let ba = q.sequence("contents", vec![b, a]).unwrap();
    let either = q.or("contents", vec![ab, ba]).unwrap();
    let tree = q.build(either).unwrap();

    let found = tree
        .cursor(&reader)
        .unwrap()
        .hits()
        .map(|hit| hit.map(|hit| (hit.doc, hit.span)))
        .collect::<concord_common::Result<Vec<_>>>()
        .unwrap();
    assert_eq!(found, hits(&[(1, 0, 2), (3, 0, 2)]));

    let mut cursor = tree.cursor(&reader).unwrap();
    assert_eq!(cursor.advance_to_document(2).unwrap(), Some(3));
    assert_eq!(cursor.next_document().unwrap(), None);
}
