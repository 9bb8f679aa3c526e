//! Validated construction of query trees.
//!
//! Every method checks its operands against the index schema and the arena
//! before it adds a node, so a finished [`QueryTree`] never fails evaluation
//! for structural reasons. Methods return the new node's id, to be used as an
//! operand of later calls. Nothing stops a node from being used as the
//! operand of several parents; the tree is a DAG.

use std::sync::Arc;

use concord_common::{Result, error::Error, verify_arg};
use concord_index_core::{PostingReader, TermKey, TermPattern, TermResolver};

use crate::{
    node::{Direction, EdgeSide, FilterOp, NodeId, NodeKind, QueryNode},
    tree::QueryTree,
};

/// Builds a [`QueryTree`] against the schema of one index.
///
/// ```
/// use concord_memory_index::{AnnotatedField, MemoryIndexBuilder};
/// use concord_spans::{QueryBuilder, Span};
///
/// let mut index = MemoryIndexBuilder::new();
/// index.add_field("contents", &["word"]).unwrap();
/// index
///     .add_document(vec![AnnotatedField::from_words("contents", "the quick brown fox")])
///     .unwrap();
/// let index = index.build();
///
/// let mut q = QueryBuilder::new(&index);
/// let the = q.term("contents", "word", "the").unwrap();
/// let gap = q.any("contents").unwrap();
/// let gap = q.repetition(gap, 1, Some(2)).unwrap();
/// let seq = q.sequence("contents", vec![the, gap]).unwrap();
/// let tree = q.build(seq).unwrap();
///
/// let mut cursor = tree.cursor(&index).unwrap();
/// assert_eq!(cursor.next_document().unwrap(), Some(0));
/// assert_eq!(
///     cursor.spans_in_current_document().as_slice(),
///     &[Span::new(0, 2), Span::new(0, 3)]
/// );
/// ```
pub struct QueryBuilder<'a> {
    reader: &'a dyn PostingReader,
    resolver: Option<&'a dyn TermResolver>,
    nodes: Vec<QueryNode>,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(reader: &'a dyn PostingReader) -> QueryBuilder<'a> {
        QueryBuilder {
            reader,
            resolver: None,
            nodes: Vec::new(),
        }
    }

    /// Enables [`pattern`](Self::pattern) leaves, resolved through `resolver`.
    pub fn with_resolver(mut self, resolver: &'a dyn TermResolver) -> QueryBuilder<'a> {
        self.resolver = Some(resolver);
        self
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Finishes the tree with `root` as its root.
    pub fn build(self, root: NodeId) -> Result<QueryTree> {
        verify_arg!(root, root.index() < self.nodes.len());
        let tree = QueryTree {
            nodes: self.nodes,
            root,
        };
        log::debug!("built query over {} nodes: {tree}", tree.len());
        Ok(tree)
    }

    /// Tokens whose `property` equals `value`.
    pub fn term(&mut self, field: &str, property: &str, value: &str) -> Result<NodeId> {
        self.terms(field, property, [value])
    }

    /// Tokens whose `property` equals any of `values`.
    pub fn terms<I, S>(&mut self, field: &str, property: &str, values: I) -> Result<NodeId>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let field = self.check_property(field, property)?;
        let keys = values
            .into_iter()
            .map(|value| TermKey::property(field.clone(), property, value.as_ref()))
            .collect();
        Ok(self.push_terms(field, keys))
    }

    /// Tokens whose `property` matches `pattern`, expanded by the resolver.
    ///
    /// A pattern without matches produces a leaf that matches nothing.
    pub fn pattern(&mut self, field: &str, property: &str, pattern: &TermPattern) -> Result<NodeId> {
        let Some(resolver) = self.resolver else {
            return Err(Error::invalid_arg(
                "pattern",
                "term patterns need a builder with a term resolver",
            ));
        };
        self.check_property(field, property)?;
        let values = resolver.resolve(field, property, pattern)?;
        log::trace!("{pattern:?} on {field}.{property} resolved to {} terms", values.len());
        self.terms(field, property, values)
    }

    /// First tokens of the `element` elements carrying attribute `key` with
    /// `value`.
    pub fn attribute(&mut self, field: &str, element: &str, key: &str, value: &str) -> Result<NodeId> {
        let field = self.check_field(field)?;
        let keys = vec![TermKey::attribute(field.clone(), element, key, value)];
        Ok(self.push_terms(field, keys))
    }

    /// Every token of the field.
    pub fn any(&mut self, field: &str) -> Result<NodeId> {
        let field = self.check_field(field)?;
        Ok(self.push(field, NodeKind::Any))
    }

    /// Extents of the `element` elements whose attributes include every
    /// `(key, value)` pair in `attributes`.
    pub fn tags(&mut self, field: &str, element: &str, attributes: &[(&str, &str)]) -> Result<NodeId> {
        let field = self.check_field(field)?;
        verify_arg!(element, !element.is_empty());
        let extents = self.push(
            field.clone(),
            NodeKind::Tags {
                element: Arc::from(element),
            },
        );
        if attributes.is_empty() {
            return Ok(extents);
        }

        let mut required = Vec::with_capacity(attributes.len());
        for (key, value) in attributes {
            required.push(self.attribute(&field, element, key, value)?);
        }
        let starts = self.push(field.clone(), NodeKind::And(required));
        Ok(self.push(
            field,
            NodeKind::PositionFilter {
                producer: extents,
                filter: starts,
                op: FilterOp::StartsAt,
            },
        ))
    }

    /// Spans produced by every child. Without children, matches nothing.
    pub fn and(&mut self, field: &str, children: Vec<NodeId>) -> Result<NodeId> {
        let field = self.check_operands(field, &children)?;
        Ok(self.push(field, NodeKind::And(children)))
    }

    /// Spans produced by any child. Without children, matches nothing.
    pub fn or(&mut self, field: &str, children: Vec<NodeId>) -> Result<NodeId> {
        let field = self.check_operands(field, &children)?;
        Ok(self.push(field, NodeKind::Or(children)))
    }

    /// Unit spans at the tokens that no span of `child` covers.
    pub fn not(&mut self, field: &str, child: NodeId) -> Result<NodeId> {
        let field = self.check_operands(field, &[child])?;
        Ok(self.push(field, NodeKind::Not(child)))
    }

    /// The first child's spans in documents where every child matches.
    pub fn doc_and(&mut self, field: &str, children: Vec<NodeId>) -> Result<NodeId> {
        verify_arg!(children, !children.is_empty());
        let field = self.check_operands(field, &children)?;
        Ok(self.push(field, NodeKind::DocAnd(children)))
    }

    /// The spans of `include` in documents where `exclude` has no match.
    pub fn doc_and_not(&mut self, include: NodeId, exclude: NodeId) -> Result<NodeId> {
        let field = self.child_field(include)?;
        let field = self.check_operands(&field, &[include, exclude])?;
        Ok(self.push(field, NodeKind::DocAndNot { include, exclude }))
    }

    /// Concatenations of adjacent child spans, in order.
    pub fn sequence(&mut self, field: &str, children: Vec<NodeId>) -> Result<NodeId> {
        verify_arg!(children, !children.is_empty());
        let field = self.check_operands(field, &children)?;
        Ok(self.push(field, NodeKind::Sequence(children)))
    }

    /// Between `min` and `max` adjacent repetitions of `child`; `max: None`
    /// is unbounded. `min == 0` admits the empty span at every token
    /// boundary.
    pub fn repetition(&mut self, child: NodeId, min: u32, max: Option<u32>) -> Result<NodeId> {
        verify_arg!(max, max.is_none_or(|max| min <= max));
        let field = self.child_field(child)?;
        Ok(self.push(field, NodeKind::Repetition { child, min, max }))
    }

    /// `container` spans that contain at least one `search` span.
    pub fn containing(&mut self, container: NodeId, search: NodeId) -> Result<NodeId> {
        self.position_filter(container, search, FilterOp::Containing)
    }

    /// `search` spans that lie inside at least one `container` span.
    pub fn within(&mut self, search: NodeId, container: NodeId) -> Result<NodeId> {
        self.position_filter(search, container, FilterOp::Within)
    }

    /// `producer` spans starting where some `filter` span starts.
    pub fn starts_at(&mut self, producer: NodeId, filter: NodeId) -> Result<NodeId> {
        self.position_filter(producer, filter, FilterOp::StartsAt)
    }

    /// `producer` spans ending where some `filter` span ends.
    pub fn ends_at(&mut self, producer: NodeId, filter: NodeId) -> Result<NodeId> {
        self.position_filter(producer, filter, FilterOp::EndsAt)
    }

    pub fn position_filter(&mut self, producer: NodeId, filter: NodeId, op: FilterOp) -> Result<NodeId> {
        let field = self.child_field(producer)?;
        let field = self.check_operands(&field, &[producer, filter])?;
        Ok(self.push(
            field,
            NodeKind::PositionFilter {
                producer,
                filter,
                op,
            },
        ))
    }

    /// `child` spans extended by `min..=max` tokens towards `direction`,
    /// never past the document edges; `max: None` extends up to the edge.
    pub fn expansion(
        &mut self,
        child: NodeId,
        direction: Direction,
        min: u32,
        max: Option<u32>,
    ) -> Result<NodeId> {
        verify_arg!(max, max.is_none_or(|max| min <= max));
        let field = self.child_field(child)?;
        Ok(self.push(
            field,
            NodeKind::Expansion {
                child,
                direction,
                min,
                max,
            },
        ))
    }

    /// The zero-length span at the start or end of every `child` span.
    pub fn edge(&mut self, child: NodeId, side: EdgeSide) -> Result<NodeId> {
        let field = self.child_field(child)?;
        Ok(self.push(field, NodeKind::Edge { child, side }))
    }

    fn push(&mut self, field: Arc<str>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(QueryNode { field, kind });
        id
    }

    fn push_terms(&mut self, field: Arc<str>, mut keys: Vec<TermKey>) -> NodeId {
        keys.sort_unstable();
        keys.dedup();
        self.push(field, NodeKind::Term { keys })
    }

    /// Returns the shared name of `field`, reusing the arena's copy when one
    /// exists.
    fn check_field(&self, field: &str) -> Result<Arc<str>> {
        if !self.reader.has_field(field) {
            return Err(Error::unknown_field(field, None));
        }
        Ok(self
            .nodes
            .iter()
            .find(|node| node.field.as_ref() == field)
            .map_or_else(|| Arc::from(field), |node| node.field.clone()))
    }

    fn check_property(&self, field: &str, property: &str) -> Result<Arc<str>> {
        let field = self.check_field(field)?;
        if !self.reader.has_property(&field, property) {
            return Err(Error::unknown_field(&*field, Some(property)));
        }
        Ok(field)
    }

    fn child_field(&self, child: NodeId) -> Result<Arc<str>> {
        match self.nodes.get(child.index()) {
            Some(node) => Ok(node.field.clone()),
            None => Err(Error::invalid_arg(
                "child",
                format!("node {child} does not belong to this builder"),
            )),
        }
    }

    /// Checks that every operand exists and shares `field`.
    fn check_operands(&self, field: &str, children: &[NodeId]) -> Result<Arc<str>> {
        let field = self.check_field(field)?;
        for &child in children {
            let child_field = self.child_field(child)?;
            if child_field != field {
                return Err(Error::invalid_arg(
                    "children",
                    format!("node {child} searches field '{child_field}', expected '{field}'"),
                ));
            }
        }
        Ok(field)
    }
}

#[cfg(test)]
mod tests {
    use concord_common::error::ErrorKind;
    use concord_memory_index::{AnnotatedField, MemoryIndex, MemoryIndexBuilder};

    use super::*;

    fn index() -> MemoryIndex {
        let mut builder = MemoryIndexBuilder::new();
        builder.add_field("contents", &["word", "lemma"]).unwrap();
        builder.add_field("title", &["word"]).unwrap();
        builder
            .add_document(vec![
                AnnotatedField::new("contents")
                    .with_token(&["cats", "cat"])
                    .with_token(&["sleep", "sleep"]),
            ])
            .unwrap();
        builder.build()
    }

    fn is_invalid_arg(err: &Error) -> bool {
        matches!(err.kind(), ErrorKind::InvalidArgument { .. })
    }

    #[test]
    fn unknown_field_and_property_are_rejected() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let err = q.term("body", "word", "x").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownField { property: None, .. }));
        let err = q.term("contents", "pos", "NOUN").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::UnknownField { property: Some(_), .. }));
        assert!(q.is_empty());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let any = q.any("contents").unwrap();
        assert!(is_invalid_arg(&q.repetition(any, 3, Some(2)).unwrap_err()));
        assert!(is_invalid_arg(
            &q.expansion(any, Direction::Right, 2, Some(1)).unwrap_err()
        ));
        assert!(q.repetition(any, 3, None).is_ok());
        assert!(q.repetition(any, 0, Some(0)).is_ok());
    }

    #[test]
    fn empty_sequence_and_doc_and_are_rejected() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        assert!(is_invalid_arg(&q.sequence("contents", vec![]).unwrap_err()));
        assert!(is_invalid_arg(&q.doc_and("contents", vec![]).unwrap_err()));
        // Empty AND/OR are legal and match nothing.
        assert!(q.and("contents", vec![]).is_ok());
        assert!(q.or("contents", vec![]).is_ok());
    }

    #[test]
    fn operands_must_share_the_field() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let cats = q.term("contents", "word", "cats").unwrap();
        let title = q.any("title").unwrap();
        assert!(is_invalid_arg(&q.or("contents", vec![cats, title]).unwrap_err()));
        assert!(is_invalid_arg(&q.containing(cats, title).unwrap_err()));
    }

    #[test]
    fn foreign_node_ids_are_rejected() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let any = q.any("contents").unwrap();
        let foreign = NodeId(any.0 + 10);
        assert!(is_invalid_arg(&q.edge(foreign, EdgeSide::Start).unwrap_err()));
        assert!(is_invalid_arg(&q.or("contents", vec![any, foreign]).unwrap_err()));
        assert!(is_invalid_arg(&QueryBuilder::new(&index).build(any).unwrap_err()));
    }

    #[test]
    fn patterns_need_a_resolver() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let err = q
            .pattern("contents", "word", &TermPattern::Prefix("ca".into()))
            .unwrap_err();
        assert!(is_invalid_arg(&err));

        let mut q = QueryBuilder::new(&index).with_resolver(&index);
        let id = q
            .pattern("contents", "word", &TermPattern::Prefix("ca".into()))
            .unwrap();
        let tree = q.build(id).unwrap();
        assert_eq!(tree.to_string(), r#"term(contents.word:"cats")"#);
    }

    #[test]
    fn tags_with_attributes_filter_on_start_tokens() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let s = q.tags("contents", "s", &[("lang", "en"), ("id", "1")]).unwrap();
        let tree = q.build(s).unwrap();
        assert_eq!(
            tree.to_string(),
            r#"starts_at(tags(contents:s), and(term(contents.s@lang:"en"), term(contents.s@id:"1")))"#
        );
    }

    #[test]
    fn renders_the_reachable_query() {
        let index = index();
        let mut q = QueryBuilder::new(&index);
        let _unused = q.any("contents").unwrap();
        let a = q.terms("contents", "lemma", ["sleep", "cat", "cat"]).unwrap();
        let any = q.any("contents").unwrap();
        let gap = q.repetition(any, 0, None).unwrap();
        let end = q.edge(a, EdgeSide::End).unwrap();
        let seq = q.sequence("contents", vec![a, gap, end]).unwrap();
        let tree = q.build(seq).unwrap();
        assert_eq!(
            tree.to_string(),
            r#"seq(#1=terms(contents.lemma:"cat" | contents.lemma:"sleep"), rep(any(contents), 0..), end_edge(#1))"#
        );
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.field(), "contents");
    }

    #[test]
    fn shared_nodes_render_once() {
        let index = index();
        let doubled = |levels: usize| {
            let mut q = QueryBuilder::new(&index);
            let mut top = q.term("contents", "word", "cats").unwrap();
            for _ in 0..levels {
                top = q.or("contents", vec![top, top]).unwrap();
            }
            q.build(top).unwrap().to_string()
        };
        assert_eq!(
            doubled(2),
            r#"or(#1=or(#0=term(contents.word:"cats"), #0), #1)"#
        );
        assert!(doubled(60).len() < 60 * 20);

        let mut q = QueryBuilder::new(&index);
        let cats = q.term("contents", "word", "cats").unwrap();
        let left = q.edge(cats, EdgeSide::Start).unwrap();
        let right = q.edge(cats, EdgeSide::End).unwrap();
        let or = q.or("contents", vec![left, right]).unwrap();
        let not = q.not("contents", or).unwrap();
        let and = q.and("contents", vec![or, not]).unwrap();
        let tree = q.build(and).unwrap();
        assert_eq!(
            tree.to_string(),
            r#"and(#3=or(start_edge(#0=term(contents.word:"cats")), end_edge(#0)), not(#3))"#
        );
    }
}
