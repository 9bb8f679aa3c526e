//! Per-document evaluation of a query tree.
//!
//! Evaluation has two halves that share the leaf posting cursors:
//!
//! - **Candidates.** [`Evaluator::candidate`] returns, for any node, the
//!   smallest document `>= target` where the node might have spans. It may
//!   overshoot into documents where the node turns out empty, but never skips
//!   one where it has spans. Conjunctive nodes leapfrog their operands until
//!   all of them agree on a document.
//! - **Spans.** [`Evaluator::spans`] computes a node's complete, canonical
//!   span list in one document from the span lists of its children. Each
//!   node's list is computed at most once per document and then shared with
//!   every parent that asks, which keeps DAG-shaped queries linear.
//!
//! A node with several parents must not let one parent leapfrog its leaves
//! past a document another parent still has to see. Its candidates are
//! computed with a separate set of leaf cursors, used only for candidates
//! and only moved forward, and the last answer is remembered: a request at or
//! after the remembered target reuses or extends it, an earlier request is
//! answered with the target itself. Spans are always read from the leaf
//! cursors that follow the evaluated document.
//!
//! Documents must be visited in ascending order; posting cursors never move
//! backwards.

pub(crate) mod boolean;
pub(crate) mod expansion;
pub(crate) mod filter;
pub(crate) mod sequence;
pub(crate) mod tags;

use std::sync::Arc;

use ahash::AHashMap;
use concord_common::{Result, error::Error};
use concord_index_core::{DocId, Position, PostingCursor, PostingReader, TermKey};
use concord_ranges::{intersect_all, union_all};

use crate::{
    node::{NodeId, NodeKind},
    span::{DocSpans, Span},
    tree::QueryTree,
};

type Cursor<'r> = Box<dyn PostingCursor + 'r>;

pub(crate) struct Evaluator<'t, 'r> {
    tree: &'t QueryTree,
    reader: &'r dyn PostingReader,
    /// Posting cursors of leaf nodes, opened on first use: one per term key
    /// for term leaves, the start and end marker cursors for tag leaves.
    leaves: Vec<Option<Vec<Cursor<'r>>>>,
    /// Document the memoized results belong to.
    memo_doc: Option<DocId>,
    memo: Vec<Option<DocSpans>>,
    token_counts: AHashMap<Arc<str>, u32>,
    /// Leaf cursors used only for candidates of `detached` nodes.
    candidate_leaves: Vec<Option<Vec<Cursor<'r>>>>,
    /// Nodes reachable from the root through more than one parent.
    shared: Vec<bool>,
    /// Shared nodes and everything below them. Their candidates move
    /// `candidate_leaves`, not the cursors spans are read from.
    detached: Vec<bool>,
    /// Last candidate request of each shared node and its answer.
    shared_candidates: Vec<Option<(DocId, Option<DocId>)>>,
}

impl<'t, 'r> Evaluator<'t, 'r> {
    pub fn new(tree: &'t QueryTree, reader: &'r dyn PostingReader) -> Evaluator<'t, 'r> {
        let shared = tree.shared_nodes();
        let detached = detached_nodes(tree, &shared);
        Evaluator {
            tree,
            reader,
            leaves: (0..tree.len()).map(|_| None).collect(),
            memo_doc: None,
            memo: vec![None; tree.len()],
            token_counts: AHashMap::new(),
            candidate_leaves: (0..tree.len()).map(|_| None).collect(),
            shared,
            detached,
            shared_candidates: vec![None; tree.len()],
        }
    }

    /// The smallest document `>= target` in which `id` may have spans.
    pub fn candidate(&mut self, id: NodeId, target: DocId) -> Result<Option<DocId>> {
        if self.shared[id.index()] {
            match self.shared_candidates[id.index()] {
                Some((asked, answer)) if target >= asked => match answer {
                    None => return Ok(None),
                    Some(doc) if target <= doc => return Ok(Some(doc)),
                    Some(_) => {}
                },
                // The candidate cursors have already moved past `target`.
                Some(_) => return Ok((target < self.reader.doc_id_limit()).then_some(target)),
                None => {}
            }
        }

        let tree = self.tree;
        let node = tree.node(id);
        let answer = self
            .node_candidate(id, &node.kind, &node.field, target)
            .map_err(|e| Error::evaluation(node.kind.operator_name(), id.as_u32(), target, e))?;
        if self.shared[id.index()] {
            self.shared_candidates[id.index()] = Some((target, answer));
        }
        Ok(answer)
    }

    fn node_candidate(
        &mut self,
        id: NodeId,
        kind: &'t NodeKind,
        field: &'t Arc<str>,
        target: DocId,
    ) -> Result<Option<DocId>> {
        match kind {
            NodeKind::Term { .. } | NodeKind::Tags { .. } => {
                let mut first = None;
                let detached = self.detached[id.index()];
                for cursor in self.leaf_cursors(id, detached)?.iter_mut() {
                    if let Some(doc) = cursor.seek(target)? {
                        first = Some(first.map_or(doc, |first: DocId| first.min(doc)));
                    }
                }
                Ok(first)
            }
            NodeKind::Or(children) => {
                let mut first = None;
                for &child in children {
                    if let Some(doc) = self.candidate(child, target)? {
                        first = Some(first.map_or(doc, |first: DocId| first.min(doc)));
                    }
                }
                Ok(first)
            }
            NodeKind::And(children) | NodeKind::DocAnd(children) | NodeKind::Sequence(children) => {
                self.leapfrog(children, target)
            }
            NodeKind::PositionFilter {
                producer, filter, ..
            } => self.leapfrog(&[*producer, *filter], target),
            NodeKind::Not(_) | NodeKind::Any => self.next_with_tokens(id, field, target),
            NodeKind::Repetition { child, min, .. } => {
                if *min == 0 {
                    self.next_with_tokens(id, field, target)
                } else {
                    self.candidate(*child, target)
                }
            }
            NodeKind::DocAndNot { include, .. } => self.candidate(*include, target),
            NodeKind::Expansion { child, .. } | NodeKind::Edge { child, .. } => {
                self.candidate(*child, target)
            }
        }
    }

    /// Advances every operand to a document all of them may match.
    fn leapfrog(&mut self, children: &[NodeId], mut target: DocId) -> Result<Option<DocId>> {
        if children.is_empty() {
            return Ok(None);
        }
        loop {
            let mut agreed = true;
            for &child in children {
                let Some(doc) = self.candidate(child, target)? else {
                    return Ok(None);
                };
                if doc > target {
                    target = doc;
                    agreed = false;
                }
            }
            if agreed {
                return Ok(Some(target));
            }
        }
    }

    /// The first document `>= target` where `field` has at least one token.
    ///
    /// A failing token count is reported against the document it was read
    /// for.
    fn next_with_tokens(&self, id: NodeId, field: &str, target: DocId) -> Result<Option<DocId>> {
        let operator = self.tree.node(id).kind.operator_name();
        for doc in target..self.reader.doc_id_limit() {
            let count = self
                .reader
                .token_count(field, doc)
                .map_err(|e| Error::evaluation(operator, id.as_u32(), doc, e))?;
            if count > 0 {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// The canonical span list of `id` in `doc`.
    pub fn spans(&mut self, id: NodeId, doc: DocId) -> Result<DocSpans> {
        if self.memo_doc != Some(doc) {
            self.memo.fill(None);
            self.token_counts.clear();
            self.memo_doc = Some(doc);
        }
        if let Some(spans) = &self.memo[id.index()] {
            return Ok(spans.clone());
        }

        let tree = self.tree;
        let node = tree.node(id);
        let spans = self
            .node_spans(id, &node.kind, &node.field, doc)
            .map_err(|e| Error::evaluation(node.kind.operator_name(), id.as_u32(), doc, e))?;
        log::trace!(
            "node {id} ({}) has {} spans in document {doc}",
            node.kind.operator_name(),
            spans.len()
        );
        self.memo[id.index()] = Some(spans.clone());
        Ok(spans)
    }

    fn node_spans(
        &mut self,
        id: NodeId,
        kind: &'t NodeKind,
        field: &'t Arc<str>,
        doc: DocId,
    ) -> Result<DocSpans> {
        let spans = match kind {
            NodeKind::Term { .. } => {
                let cursors = self.positioned(id, doc)?;
                let positions = cursors
                    .iter()
                    .filter(|cursor| cursor.doc() == Some(doc))
                    .map(|cursor| cursor.positions().iter().copied());
                union_all(positions).map(Span::unit).collect()
            }
            NodeKind::Tags { .. } => {
                let cursors = self.positioned(id, doc)?;
                let [starts, ends] = [0, 1].map(|i| marker_positions(&cursors[i], doc));
                tags::extents(starts, ends).map_err(|message| {
                    Error::index_consistency(kind.operator_name(), id.as_u32(), doc, message)
                })?
            }
            NodeKind::And(children) => {
                let lists = self.children_spans(children, doc)?;
                intersect_all(lists.iter().map(|spans| spans.iter().copied())).collect()
            }
            NodeKind::Or(children) => {
                let lists = self.children_spans(children, doc)?;
                union_all(lists.iter().map(|spans| spans.iter().copied())).collect()
            }
            NodeKind::Not(child) => {
                let covered = self.spans(*child, doc)?;
                boolean::uncovered_tokens(self.token_count(field, doc)?, &covered)
            }
            NodeKind::Any => boolean::all_tokens(self.token_count(field, doc)?),
            NodeKind::DocAnd(children) => {
                let mut first = None;
                for &child in children {
                    let spans = self.spans(child, doc)?;
                    if spans.is_empty() {
                        return Ok(DocSpans::empty());
                    }
                    first.get_or_insert(spans);
                }
                return Ok(first.unwrap_or_default());
            }
            NodeKind::DocAndNot { include, exclude } => {
                let spans = self.spans(*include, doc)?;
                if spans.is_empty() || !self.spans(*exclude, doc)?.is_empty() {
                    return Ok(DocSpans::empty());
                }
                return Ok(spans);
            }
            NodeKind::Sequence(children) => {
                let Some((&first, rest)) = children.split_first() else {
                    return Ok(DocSpans::empty());
                };
                let mut joined = self.spans(first, doc)?.to_vec();
                for &child in rest {
                    if joined.is_empty() {
                        break;
                    }
                    joined = sequence::join(&joined, &self.spans(child, doc)?);
                }
                joined
            }
            NodeKind::Repetition { child, min, max } => {
                let spans = self.spans(*child, doc)?;
                let token_count = self.token_count(field, doc)?;
                sequence::repeat(&spans, *min, *max, token_count)
            }
            NodeKind::PositionFilter {
                producer,
                filter,
                op,
            } => {
                let produced = self.spans(*producer, doc)?;
                if produced.is_empty() {
                    return Ok(produced);
                }
                filter::apply(*op, &produced, &self.spans(*filter, doc)?)
            }
            NodeKind::Expansion {
                child,
                direction,
                min,
                max,
            } => {
                let spans = self.spans(*child, doc)?;
                let token_count = self.token_count(field, doc)?;
                expansion::expand(&spans, *direction, *min, *max, token_count)
            }
            NodeKind::Edge { child, side } => expansion::edges(&self.spans(*child, doc)?, *side),
        };
        Ok(DocSpans::from_sorted(spans))
    }

    fn children_spans(&mut self, children: &[NodeId], doc: DocId) -> Result<Vec<DocSpans>> {
        children.iter().map(|&child| self.spans(child, doc)).collect()
    }

    /// Opens the posting cursors of leaf `id` if needed: the set used for
    /// candidates of shared subtrees, or the set spans are read from.
    fn leaf_cursors(&mut self, id: NodeId, for_candidates: bool) -> Result<&mut Vec<Cursor<'r>>> {
        let tree = self.tree;
        let slot = if for_candidates {
            &mut self.candidate_leaves[id.index()]
        } else {
            &mut self.leaves[id.index()]
        };
        if slot.is_none() {
            let node = tree.node(id);
            let keys = match &node.kind {
                NodeKind::Term { keys } => keys.clone(),
                NodeKind::Tags { element } => vec![
                    TermKey::open_tag(node.field.clone(), element.clone()),
                    TermKey::close_tag(node.field.clone(), element.clone()),
                ],
                _ => Vec::new(),
            };
            let cursors = keys
                .iter()
                .map(|key| self.reader.postings(key))
                .collect::<Result<Vec<_>>>()?;
            *slot = Some(cursors);
        }
        Ok(slot.get_or_insert_with(Vec::new))
    }

    /// The cursors of leaf `id`, each sought to `doc`.
    fn positioned(&mut self, id: NodeId, doc: DocId) -> Result<&[Cursor<'r>]> {
        let cursors = self.leaf_cursors(id, false)?;
        for cursor in cursors.iter_mut() {
            cursor.seek(doc)?;
        }
        Ok(cursors.as_slice())
    }

    fn token_count(&mut self, field: &Arc<str>, doc: DocId) -> Result<u32> {
        if let Some(&count) = self.token_counts.get(field) {
            return Ok(count);
        }
        let count = self.reader.token_count(field, doc)?;
        self.token_counts.insert(field.clone(), count);
        Ok(count)
    }
}

/// Marks the shared nodes and every node below one of them.
fn detached_nodes(tree: &QueryTree, shared: &[bool]) -> Vec<bool> {
    let mut detached = shared.to_vec();
    // Parents follow their children in the arena.
    for index in (0..tree.len()).rev() {
        if detached[index] {
            for child in tree.node(NodeId(index as u32)).kind.children() {
                detached[child.index()] = true;
            }
        }
    }
    detached
}

fn marker_positions<'c>(cursor: &'c Cursor<'_>, doc: DocId) -> &'c [Position] {
    if cursor.doc() == Some(doc) {
        cursor.positions()
    } else {
        &[]
    }
}
