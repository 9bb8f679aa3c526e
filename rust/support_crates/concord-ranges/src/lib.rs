//! Streaming set operations over ordered sequences.
//!
//! The span algebra keeps every per-document result as a strictly ascending,
//! de-duplicated sequence. Combining such sequences never needs hashing or
//! re-sorting: the adapters in [`set_ops`] merge them in a single pass.
//!
//! - [`union_all`] - k-way union, equal items collapsed
//! - [`intersect_all`] - k-way intersection by exact equality
//! - [`complement_ranges`] - gaps left by a start-ordered stream of ranges
//!   within `[0, size)`

pub mod set_ops;

pub use set_ops::{
    complement::{ComplementRanges, complement_ranges},
    intersection::{IntersectAll, intersect_all},
    union::{UnionAll, union_all},
};
