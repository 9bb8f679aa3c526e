//! Query nodes stored in a [`QueryTree`](crate::QueryTree) arena.

use std::fmt;
use std::sync::Arc;

use concord_index_core::TermKey;

/// Index of a node within its query tree arena.
///
/// Ids are only meaningful for the builder or tree that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One node of a query: an operator scoped to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNode {
    pub field: Arc<str>,
    pub kind: NodeKind,
}

/// The closed set of span operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Unit spans at every posting of any of the terms.
    ///
    /// Keys are distinct and ascending; all address the node's field. An empty
    /// key list is legal (a pattern that resolved to nothing) and matches
    /// nothing.
    Term { keys: Vec<TermKey> },
    /// Full extents of the elements named `element`, from the start and end
    /// markers of the field.
    Tags { element: Arc<str> },
    /// Spans produced by every child.
    And(Vec<NodeId>),
    /// Spans produced by any child.
    Or(Vec<NodeId>),
    /// Unit spans at the token positions no child span covers.
    Not(NodeId),
    /// Every token as a unit span.
    Any,
    /// The first child's spans, in documents where every child matches.
    DocAnd(Vec<NodeId>),
    /// The include spans, in documents where exclude has no match.
    DocAndNot { include: NodeId, exclude: NodeId },
    /// Concatenations of adjacent child spans, in child order.
    Sequence(Vec<NodeId>),
    /// Concatenations of `min..=max` adjacent child spans; `max: None` means
    /// unbounded.
    Repetition {
        child: NodeId,
        min: u32,
        max: Option<u32>,
    },
    /// Producer spans that satisfy `op` against at least one filter span.
    PositionFilter {
        producer: NodeId,
        filter: NodeId,
        op: FilterOp,
    },
    /// Child spans extended by `min..=max` tokens on one side. Extensions
    /// past either end of the field are dropped.
    Expansion {
        child: NodeId,
        direction: Direction,
        min: u32,
        max: Option<u32>,
    },
    /// Zero-length spans at one edge of every child span.
    Edge { child: NodeId, side: EdgeSide },
}

impl NodeKind {
    /// Short operator name used in logs and error contexts.
    pub fn operator_name(&self) -> &'static str {
        match self {
            NodeKind::Term { .. } => "term",
            NodeKind::Tags { .. } => "tags",
            NodeKind::And(_) => "and",
            NodeKind::Or(_) => "or",
            NodeKind::Not(_) => "not",
            NodeKind::Any => "any",
            NodeKind::DocAnd(_) => "doc_and",
            NodeKind::DocAndNot { .. } => "doc_and_not",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Repetition { .. } => "repetition",
            NodeKind::PositionFilter { op, .. } => op.name(),
            NodeKind::Expansion { .. } => "expansion",
            NodeKind::Edge { .. } => "edge",
        }
    }

    /// Direct children, in operand order.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Term { .. } | NodeKind::Tags { .. } | NodeKind::Any => Vec::new(),
            NodeKind::And(children)
            | NodeKind::Or(children)
            | NodeKind::DocAnd(children)
            | NodeKind::Sequence(children) => children.clone(),
            NodeKind::Not(child)
            | NodeKind::Repetition { child, .. }
            | NodeKind::Expansion { child, .. }
            | NodeKind::Edge { child, .. } => vec![*child],
            NodeKind::DocAndNot { include, exclude } => vec![*include, *exclude],
            NodeKind::PositionFilter {
                producer, filter, ..
            } => vec![*producer, *filter],
        }
    }
}

/// Relation a producer span must have with some filter span to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOp {
    /// The producer span contains a filter span.
    Containing,
    /// The producer span lies inside a filter span.
    Within,
    /// A filter span starts where the producer span starts.
    StartsAt,
    /// A filter span ends where the producer span ends.
    EndsAt,
}

impl FilterOp {
    pub fn name(self) -> &'static str {
        match self {
            FilterOp::Containing => "containing",
            FilterOp::Within => "within",
            FilterOp::StartsAt => "starts_at",
            FilterOp::EndsAt => "ends_at",
        }
    }
}

/// Side on which an expansion adds tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

/// Which boundary of a span an edge node keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeSide {
    Start,
    End,
}
