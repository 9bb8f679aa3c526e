//! Core definitions (error types, result alias, helper macros), relied upon by all concord-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
