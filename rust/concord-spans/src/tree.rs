//! The immutable query arena.

use std::fmt;

use concord_common::Result;
use concord_index_core::PostingReader;

use crate::{
    cursor::SpanCursor,
    node::{Direction, EdgeSide, NodeId, NodeKind, QueryNode},
};

/// A finished query: an arena of nodes and the id of the root.
///
/// Children always precede their parents in the arena, so the node graph is
/// acyclic. A node may be the child of several parents; its result per
/// document is then computed once per cursor and shared.
///
/// Trees are immutable and `Send + Sync`. Evaluation state lives in the
/// [`SpanCursor`]s opened over them, so one tree can be evaluated by many
/// cursors at once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTree {
    pub(crate) nodes: Vec<QueryNode>,
    pub(crate) root: NodeId,
}

impl QueryTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    ///
    /// If `id` was not issued for this tree.
    pub fn node(&self, id: NodeId) -> &QueryNode {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&QueryNode> {
        self.nodes.get(id.index())
    }

    /// Number of nodes in the arena, including nodes the root does not reach.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The field all spans of the query refer to.
    pub fn field(&self) -> &str {
        &self.node(self.root).field
    }

    /// Opens an evaluation cursor over `reader`.
    pub fn cursor<'t, 'r>(&'t self, reader: &'r dyn PostingReader) -> Result<SpanCursor<'t, 'r>> {
        SpanCursor::open(self, reader)
    }

    /// Marks the nodes the root reaches more than once, through several
    /// parents or through one parent listing them several times.
    pub(crate) fn shared_nodes(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.len()];
        let mut references = vec![0u32; self.len()];
        reachable[self.root.index()] = true;
        // Every parent of a node comes after it in the arena.
        for index in (0..self.len()).rev() {
            if !reachable[index] {
                continue;
            }
            for child in self.nodes[index].kind.children() {
                reachable[child.index()] = true;
                references[child.index()] += 1;
            }
        }
        references.into_iter().map(|count| count > 1).collect()
    }

    fn render(&self, id: NodeId, r: &mut Rendering, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if r.shared[id.index()] {
            if r.printed[id.index()] {
                return write!(f, "{id}");
            }
            r.printed[id.index()] = true;
            write!(f, "{id}=")?;
        }
        let node = self.node(id);
        match &node.kind {
            NodeKind::Term { keys } => match keys.as_slice() {
                [key] => write!(f, "term({key})"),
                _ => {
                    write!(f, "terms(")?;
                    for (i, key) in keys.iter().enumerate() {
                        if i > 0 {
                            write!(f, " | ")?;
                        }
                        write!(f, "{key}")?;
                    }
                    write!(f, ")")
                }
            },
            NodeKind::Tags { element } => write!(f, "tags({}:{element})", node.field),
            NodeKind::Any => write!(f, "any({})", node.field),
            NodeKind::And(children) => self.render_list("and", children, r, f),
            NodeKind::Or(children) => self.render_list("or", children, r, f),
            NodeKind::DocAnd(children) => self.render_list("doc_and", children, r, f),
            NodeKind::Sequence(children) => self.render_list("seq", children, r, f),
            NodeKind::Not(child) => self.render_list("not", &[*child], r, f),
            NodeKind::DocAndNot { include, exclude } => {
                self.render_list("doc_and_not", &[*include, *exclude], r, f)
            }
            NodeKind::PositionFilter {
                producer,
                filter,
                op,
            } => self.render_list(op.name(), &[*producer, *filter], r, f),
            NodeKind::Repetition { child, min, max } => {
                write!(f, "rep(")?;
                self.render(*child, r, f)?;
                write!(f, ", ")?;
                write_bounds(*min, *max, f)?;
                write!(f, ")")
            }
            NodeKind::Expansion {
                child,
                direction,
                min,
                max,
            } => {
                let name = match direction {
                    Direction::Left => "expand_left",
                    Direction::Right => "expand_right",
                };
                write!(f, "{name}(")?;
                self.render(*child, r, f)?;
                write!(f, ", ")?;
                write_bounds(*min, *max, f)?;
                write!(f, ")")
            }
            NodeKind::Edge { child, side } => {
                let name = match side {
                    EdgeSide::Start => "start_edge",
                    EdgeSide::End => "end_edge",
                };
                self.render_list(name, &[*child], r, f)
            }
        }
    }

    fn render_list(
        &self,
        name: &str,
        children: &[NodeId],
        r: &mut Rendering,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{name}(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            self.render(*child, r, f)?;
        }
        write!(f, ")")
    }
}

/// Shared nodes, and which of them were already written out.
struct Rendering {
    shared: Vec<bool>,
    printed: Vec<bool>,
}

fn write_bounds(min: u32, max: Option<u32>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match max {
        Some(max) => write!(f, "{min}..={max}"),
        None => write!(f, "{min}.."),
    }
}

/// Renders the query reachable from the root in functional notation, e.g.
/// `seq(term(contents.word:"the"), rep(any(contents), 1..=2))`.
///
/// A node with several parents is written out once, prefixed with its id as
/// in `#3=term(...)`, and referred to as `#3` afterwards.
impl fmt::Display for QueryTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendering = Rendering {
            shared: self.shared_nodes(),
            printed: vec![false; self.len()],
        };
        self.render(self.root, &mut rendering, f)
    }
}
