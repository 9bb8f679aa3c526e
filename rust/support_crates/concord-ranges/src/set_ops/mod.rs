//! Single-pass merges of ascending streams.
//!
//! Every adapter here assumes its inputs are sorted (and, for the point
//! variants, free of duplicates); none of them buffers more than one item per
//! input.

pub mod complement;
pub mod intersection;
pub mod union;
