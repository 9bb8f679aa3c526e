//! Test utilities and helpers for the Concord project.
//!
//! This crate provides:
//! - Generation of seeded, randomly annotated corpora and their indexes
//! - Generation of random span queries over such corpora
//! - A brute-force reference evaluator that computes query results straight
//!   from the corpus, for checking the cursor-based evaluation
//!
//! # Usage
//!
//! This crate is primarily intended for use within the Concord project's test
//! suites.

pub mod data_gen;
pub mod query_gen;
pub mod reference;
