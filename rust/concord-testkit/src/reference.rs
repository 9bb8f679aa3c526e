//! Brute-force query evaluation straight from a [`Corpus`].
//!
//! Every operator is evaluated by its definition over explicit span sets,
//! without posting cursors, candidate documents or any of the shortcuts of the
//! real evaluator. Results are only meant to be compared against cursor
//! output on small corpora.

use std::collections::BTreeSet;

use concord_index_core::{DocId, Stream, TermKey};
use concord_memory_index::AnnotatedField;
use concord_spans::{Direction, EdgeSide, FilterOp, Hit, NodeId, NodeKind, QueryTree, Span};

use crate::data_gen::Corpus;

/// All hits of `tree` in `corpus`, in `(doc, span)` order.
pub fn evaluate(tree: &QueryTree, corpus: &Corpus) -> Vec<Hit> {
    (0..corpus.len() as DocId)
        .flat_map(|doc| {
            evaluate_document(tree, corpus, doc)
                .into_iter()
                .map(move |span| Hit::new(doc, span))
        })
        .collect()
}

/// The spans of the root of `tree` in one document, ascending.
pub fn evaluate_document(tree: &QueryTree, corpus: &Corpus, doc: DocId) -> Vec<Span> {
    Reference {
        tree,
        doc: corpus.doc(doc),
    }
    .spans(tree.root())
    .into_iter()
    .collect()
}

struct Reference<'a> {
    tree: &'a QueryTree,
    doc: &'a AnnotatedField,
}

impl Reference<'_> {
    fn token_count(&self) -> u32 {
        self.doc.token_count()
    }

    fn spans(&self, id: NodeId) -> BTreeSet<Span> {
        let n = self.token_count();
        match &self.tree.node(id).kind {
            NodeKind::Term { keys } => keys
                .iter()
                .flat_map(|key| self.postings(key))
                .map(Span::unit)
                .collect(),
            NodeKind::Tags { element } => self
                .doc
                .elements
                .iter()
                .filter(|e| e.name == **element)
                .map(|e| Span::new(e.start, e.end))
                .collect(),
            NodeKind::And(children) => {
                let mut sets = children.iter().map(|&c| self.spans(c));
                let Some(first) = sets.next() else {
                    return BTreeSet::new();
                };
                sets.fold(first, |acc, set| acc.intersection(&set).copied().collect())
            }
            NodeKind::Or(children) => children.iter().flat_map(|&c| self.spans(c)).collect(),
            NodeKind::Not(child) => {
                let covered = self.spans(*child);
                (0..n)
                    .filter(|&t| !covered.iter().any(|s| s.start <= t && t < s.end))
                    .map(Span::unit)
                    .collect()
            }
            NodeKind::Any => (0..n).map(Span::unit).collect(),
            NodeKind::DocAnd(children) => {
                let sets = children.iter().map(|&c| self.spans(c)).collect::<Vec<_>>();
                if sets.iter().all(|set| !set.is_empty()) {
                    sets.into_iter().next().unwrap_or_default()
                } else {
                    BTreeSet::new()
                }
            }
            NodeKind::DocAndNot { include, exclude } => {
                if self.spans(*exclude).is_empty() {
                    self.spans(*include)
                } else {
                    BTreeSet::new()
                }
            }
            NodeKind::Sequence(children) => {
                let mut sets = children.iter().map(|&c| self.spans(c));
                let first = sets.next().unwrap_or_default();
                sets.fold(first, |acc, set| concatenate(&acc, &set))
            }
            NodeKind::Repetition { child, min, max } => {
                let child = self.spans(*child);
                // Beyond `max(n, min)` pieces every concatenation contains an
                // empty piece and is already a concatenation of one piece less.
                let limit = n.max(*min) + 1;
                let max = max.map_or(limit, |max| max.min(limit));
                let mut result = BTreeSet::new();
                if *min == 0 && n > 0 {
                    result.extend((0..=n).map(Span::boundary));
                }
                let mut layer = child.clone();
                for k in 1..=max {
                    if k >= *min {
                        result.extend(layer.iter().copied());
                    }
                    layer = concatenate(&layer, &child);
                }
                result
            }
            NodeKind::PositionFilter {
                producer,
                filter,
                op,
            } => {
                let filter = self.spans(*filter);
                self.spans(*producer)
                    .into_iter()
                    .filter(|p| filter.iter().any(|f| related(*op, p, f)))
                    .collect()
            }
            NodeKind::Expansion {
                child,
                direction,
                min,
                max,
            } => {
                let mut result = BTreeSet::new();
                for s in self.spans(*child) {
                    let mut k = *min;
                    while max.is_none_or(|max| k <= max) {
                        let expanded = match direction {
                            Direction::Left if k <= s.start => Span::new(s.start - k, s.end),
                            Direction::Right if s.end + k <= n => Span::new(s.start, s.end + k),
                            _ => break,
                        };
                        result.insert(expanded);
                        k += 1;
                    }
                }
                result
            }
            NodeKind::Edge { child, side } => self
                .spans(*child)
                .into_iter()
                .map(|s| match side {
                    EdgeSide::Start => Span::boundary(s.start),
                    EdgeSide::End => Span::boundary(s.end),
                })
                .collect(),
        }
    }

    /// Positions of the term in the document, read from the tokens and
    /// elements.
    fn postings(&self, key: &TermKey) -> Vec<u32> {
        if *key.field != self.doc.name {
            return Vec::new();
        }
        let value = &*key.value;
        let elements = self.doc.elements.iter();
        match &key.stream {
            Stream::Property(property) => {
                let Some(i) = Corpus::property_index(property) else {
                    return Vec::new();
                };
                (0..self.token_count())
                    .filter(|&t| self.doc.tokens[t as usize][i] == value)
                    .collect()
            }
            Stream::OpenTag => elements.filter(|e| e.name == value).map(|e| e.start).collect(),
            Stream::CloseTag => elements
                .filter(|e| e.name == value)
                .map(|e| e.last_token())
                .collect(),
            Stream::Attribute { element, key } => elements
                .filter(|e| e.name == **element && e.attribute(key) == Some(value))
                .map(|e| e.start)
                .collect(),
        }
    }
}

fn concatenate(left: &BTreeSet<Span>, right: &BTreeSet<Span>) -> BTreeSet<Span> {
    left.iter()
        .flat_map(|l| {
            right
                .iter()
                .filter(move |r| r.start == l.end)
                .map(move |r| Span::new(l.start, r.end))
        })
        .collect()
}

fn related(op: FilterOp, producer: &Span, filter: &Span) -> bool {
    match op {
        FilterOp::Containing => producer.start <= filter.start && filter.end <= producer.end,
        FilterOp::Within => filter.start <= producer.start && producer.end <= filter.end,
        FilterOp::StartsAt => producer.start == filter.start,
        FilterOp::EndsAt => producer.end == filter.end,
    }
}
