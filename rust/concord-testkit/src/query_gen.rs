//! Seeded generation of random span queries over a generated corpus.
//!
//! Queries use every operator, draw their leaves from the vocabularies of
//! [`data_gen`](crate::data_gen) and occasionally reuse an already built
//! subquery as the operand of another operator, so that query graphs with
//! shared nodes are produced as well.

use concord_index_core::TermPattern;
use concord_memory_index::MemoryIndex;
use concord_spans::{Direction, EdgeSide, FilterOp, NodeId, QueryBuilder, QueryTree};

use crate::data_gen::{ELEMENTS, FIELD, POS_TAGS, WORDS};

/// Random query generator.
pub struct QueryGen {
    rng: fastrand::Rng,
    max_depth: u32,
}

impl QueryGen {
    pub fn new(seed: u64, max_depth: u32) -> QueryGen {
        QueryGen {
            rng: fastrand::Rng::with_seed(seed),
            max_depth,
        }
    }

    /// Builds the next random query over `index`.
    pub fn generate(&mut self, index: &MemoryIndex) -> anyhow::Result<QueryTree> {
        let mut builder = QueryBuilder::new(index).with_resolver(index);
        let mut built = Vec::new();
        let depth = self.rng.u32(0..=self.max_depth);
        let root = self.node(&mut builder, &mut built, depth)?;
        Ok(builder.build(root)?)
    }

    fn node(
        &mut self,
        builder: &mut QueryBuilder<'_>,
        built: &mut Vec<NodeId>,
        depth: u32,
    ) -> anyhow::Result<NodeId> {
        if !built.is_empty() && self.rng.u8(..10) == 0 {
            return Ok(built[self.rng.usize(..built.len())]);
        }
        let id = if depth == 0 {
            self.leaf(builder)?
        } else {
            self.operator(builder, built, depth - 1)?
        };
        built.push(id);
        Ok(id)
    }

    fn leaf(&mut self, builder: &mut QueryBuilder<'_>) -> anyhow::Result<NodeId> {
        let id = match self.rng.u8(..8) {
            0 | 1 => builder.term(FIELD, "word", self.pick(&WORDS))?,
            2 => {
                let words = [self.pick(&WORDS), self.pick(&WORDS)];
                builder.terms(FIELD, "word", words)?
            }
            3 => builder.term(FIELD, "pos", self.pick(&POS_TAGS))?,
            4 => {
                let class = format!("[{}{}]", self.pick(&WORDS), self.pick(&WORDS));
                builder.pattern(FIELD, "word", &TermPattern::Regex(class))?
            }
            5 => builder.any(FIELD)?,
            _ => {
                let (element, key, values) = ELEMENTS[self.rng.usize(..ELEMENTS.len())];
                if self.rng.bool() {
                    builder.tags(FIELD, element, &[])?
                } else {
                    builder.tags(FIELD, element, &[(key, self.pick(&values))])?
                }
            }
        };
        Ok(id)
    }

    fn operator(
        &mut self,
        builder: &mut QueryBuilder<'_>,
        built: &mut Vec<NodeId>,
        depth: u32,
    ) -> anyhow::Result<NodeId> {
        let id = match self.rng.u8(..13) {
            0 => {
                let children = self.children(builder, built, depth, 0..=3)?;
                builder.and(FIELD, children)?
            }
            1 => {
                let children = self.children(builder, built, depth, 0..=3)?;
                builder.or(FIELD, children)?
            }
            2 => {
                let child = self.node(builder, built, depth)?;
                builder.not(FIELD, child)?
            }
            3 => {
                let children = self.children(builder, built, depth, 1..=2)?;
                builder.doc_and(FIELD, children)?
            }
            4 => {
                let include = self.node(builder, built, depth)?;
                let exclude = self.node(builder, built, depth)?;
                builder.doc_and_not(include, exclude)?
            }
            5 | 6 => {
                let children = self.children(builder, built, depth, 1..=3)?;
                builder.sequence(FIELD, children)?
            }
            7 => {
                let child = self.node(builder, built, depth)?;
                let (min, max) = self.bounds();
                builder.repetition(child, min, max)?
            }
            8 | 9 => {
                let producer = self.node(builder, built, depth)?;
                let filter = self.node(builder, built, depth)?;
                let op = [
                    FilterOp::Containing,
                    FilterOp::Within,
                    FilterOp::StartsAt,
                    FilterOp::EndsAt,
                ][self.rng.usize(..4)];
                builder.position_filter(producer, filter, op)?
            }
            10 => {
                let child = self.node(builder, built, depth)?;
                let direction = if self.rng.bool() {
                    Direction::Left
                } else {
                    Direction::Right
                };
                let (min, max) = self.bounds();
                builder.expansion(child, direction, min, max)?
            }
            11 => {
                let child = self.node(builder, built, depth)?;
                let side = if self.rng.bool() {
                    EdgeSide::Start
                } else {
                    EdgeSide::End
                };
                builder.edge(child, side)?
            }
            _ => self.leaf(builder)?,
        };
        Ok(id)
    }

    fn children(
        &mut self,
        builder: &mut QueryBuilder<'_>,
        built: &mut Vec<NodeId>,
        depth: u32,
        count: std::ops::RangeInclusive<usize>,
    ) -> anyhow::Result<Vec<NodeId>> {
        let count = self.rng.usize(count);
        (0..count).map(|_| self.node(builder, built, depth)).collect()
    }

    /// Small repetition or expansion bounds, unbounded a quarter of the time.
    fn bounds(&mut self) -> (u32, Option<u32>) {
        let min = self.rng.u32(0..=2);
        let max = (self.rng.u8(..4) != 0).then(|| min + self.rng.u32(0..=2));
        (min, max)
    }

    fn pick<'a>(&mut self, values: &[&'a str]) -> &'a str {
        values[self.rng.usize(..values.len())]
    }
}
